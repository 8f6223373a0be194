#![no_main]

use homeloc::{csv_input::CsvTable, ColumnMapping};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and column mapping must never panic
        if let Ok(table) = CsvTable::parse(input) {
            let _ = table.to_records(&ColumnMapping::default());
        }
    }
});
