use anyhow::{Context, Result};
use clap::Parser;
use homeloc::{
    assign::infer_homes,
    cli::{Cli, OutputFormat},
    config::HomelocConfig,
    csv_input::CsvTable,
    csv_output::CsvHomeOutput,
    json_output::JsonHomeSummary,
};
use std::fs;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(args: &Cli) -> Result<HomelocConfig> {
    let base = match &args.config {
        Some(path) => HomelocConfig::from_toml(path)?,
        None => HomelocConfig::default(),
    };
    Ok(args.apply_overrides(base))
}

fn run(args: &Cli) -> Result<String> {
    let config = load_config(args)?;

    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file: {}", args.input.display()))?;
    let table = CsvTable::parse(&content)
        .with_context(|| format!("Failed to parse CSV: {}", args.input.display()))?;
    let records = table
        .to_records(&config.columns)
        .with_context(|| format!("Failed to map columns of {}", args.input.display()))?;

    let assignment = infer_homes(&records, &config.thresholds)?;

    match args.format {
        OutputFormat::Csv => {
            let homes = assignment.label(&records);
            CsvHomeOutput::new(config.home_column.as_str()).to_csv(&table, &homes)
        }
        OutputFormat::Json => JsonHomeSummary::from_assignment(&assignment, &config.thresholds)
            .to_json()
            .context("Failed to serialize JSON summary"),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let rendered = run(&args)?;

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}
