//! CSV output: the input table with an appended home zone column

use anyhow::{ensure, Result};

use crate::csv_input::CsvTable;

/// Writes the original table plus one home column
#[derive(Debug)]
pub struct CsvHomeOutput {
    home_column: String,
}

impl CsvHomeOutput {
    pub fn new(home_column: impl Into<String>) -> Self {
        Self {
            home_column: home_column.into(),
        }
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
        {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row<'a>(fields: impl Iterator<Item = &'a str>) -> String {
        fields.map(Self::escape_field).collect::<Vec<_>>().join(",")
    }

    /// Render `table` with `homes[i]` appended to row `i`
    ///
    /// Unknown homes are written as empty fields.
    pub fn to_csv(&self, table: &CsvTable, homes: &[Option<String>]) -> Result<String> {
        ensure!(
            homes.len() == table.len(),
            "{} home labels for {} rows",
            homes.len(),
            table.len()
        );

        let mut output = String::new();

        let header = table
            .headers()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.home_column.as_str()));
        output.push_str(&Self::format_row(header));
        output.push('\n');

        for (row, home) in table.rows().iter().zip(homes) {
            let fields = row
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(home.as_deref().unwrap_or("")));
            output.push_str(&Self::format_row(fields));
            output.push('\n');
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_home_column() {
        let table = CsvTable::parse("u_id,OBJECTID\nu1,7\nu2,8\n").unwrap();
        let homes = vec![Some("7".to_string()), None];

        let csv = CsvHomeOutput::new("home_zone").to_csv(&table, &homes).unwrap();
        assert_eq!(csv, "u_id,OBJECTID,home_zone\nu1,7,7\nu2,8,\n");
    }

    #[test]
    fn test_reescapes_fields() {
        let table = CsvTable::parse("name,zone\n\"Doe, J\",\"a\"\"b\"\n").unwrap();
        let homes = vec![Some("x,y".to_string())];

        let csv = CsvHomeOutput::new("home").to_csv(&table, &homes).unwrap();
        assert_eq!(csv, "name,zone,home\n\"Doe, J\",\"a\"\"b\",\"x,y\"\n");

        let reparsed = CsvTable::parse(&csv).unwrap();
        assert_eq!(reparsed.rows()[0], ["Doe, J", "a\"b", "x,y"]);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let table = CsvTable::parse("a\n1\n2\n").unwrap();
        let result = CsvHomeOutput::new("home").to_csv(&table, &[None]);
        assert!(result.is_err());
    }
}
