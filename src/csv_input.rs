//! CSV input adapter
//!
//! Reads a comma-separated table and maps its named columns onto
//! [`ActivityRow`] fields via [`ColumnMapping`]. Supports the common RFC 4180
//! subset: double-quoted fields, `""` escapes, quoted newlines and CRLF line
//! endings. Blank lines are skipped.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::config::ColumnMapping;
use crate::record::ActivityRow;

/// CSV parsing and column mapping errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvInputError {
    #[error("CSV input is empty (no header row)")]
    Empty,

    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("Line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Column `{0}` not found in CSV header")]
    MissingColumn(String),

    #[error("Line {line}: invalid date `{value}` (expected format `{format}`)")]
    InvalidDate {
        line: usize,
        value: String,
        format: String,
    },

    #[error("Line {line}: invalid hour `{value}`")]
    InvalidHour { line: usize, value: String },
}

/// Parsed CSV table: a header row plus data rows of equal width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Source line on which each data row starts
    lines: Vec<usize>,
}

impl CsvTable {
    /// Parse CSV text
    pub fn parse(input: &str) -> Result<Self, CsvInputError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);

        let mut records: Vec<(usize, Vec<String>)> = Vec::new();
        let mut fields: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut quote_line = 0;
        let mut line = 1;
        let mut record_line = 1;

        let mut chars = input.chars().peekable();
        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    '\n' => {
                        line += 1;
                        field.push(c);
                    }
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' if field.is_empty() => {
                    in_quotes = true;
                    quote_line = line;
                }
                ',' => fields.push(std::mem::take(&mut field)),
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    if !fields.is_empty() || !field.is_empty() {
                        fields.push(std::mem::take(&mut field));
                        records.push((record_line, std::mem::take(&mut fields)));
                    }
                    line += 1;
                    record_line = line;
                }
                _ => field.push(c),
            }
        }

        if in_quotes {
            return Err(CsvInputError::UnterminatedQuote { line: quote_line });
        }
        if !fields.is_empty() || !field.is_empty() {
            fields.push(field);
            records.push((record_line, fields));
        }

        let mut records = records.into_iter();
        let (_, headers) = records.next().ok_or(CsvInputError::Empty)?;
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        let mut lines = Vec::new();
        for (line, row) in records {
            if row.len() != headers.len() {
                return Err(CsvInputError::RaggedRow {
                    line,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            rows.push(row);
            lines.push(line);
        }

        debug!(columns = headers.len(), rows = rows.len(), "parsed CSV table");
        Ok(Self {
            headers,
            rows,
            lines,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Source line of data row `index`
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }

    fn column(&self, name: &str) -> Result<usize, CsvInputError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CsvInputError::MissingColumn(name.to_string()))
    }

    /// Map every data row to an [`ActivityRow`]
    ///
    /// Empty cells become absent fields. Non-empty dates and hours that do
    /// not parse are reported with their source line.
    pub fn to_records(&self, columns: &ColumnMapping) -> Result<Vec<ActivityRow>, CsvInputError> {
        let user_idx = self.column(&columns.user)?;
        let zone_idx = self.column(&columns.zone)?;
        let date_idx = self.column(&columns.date)?;
        let hour_idx = self.column(&columns.hour)?;

        self.rows
            .iter()
            .zip(&self.lines)
            .map(|(row, &line)| -> Result<ActivityRow, CsvInputError> {
                let date = non_empty(&row[date_idx])
                    .map(|value| parse_date(value, &columns.date_format, line))
                    .transpose()?;
                let hour = non_empty(&row[hour_idx])
                    .map(|value| parse_hour(value, line))
                    .transpose()?;

                Ok(ActivityRow {
                    user_id: non_empty(&row[user_idx]).map(str::to_string),
                    zone_id: non_empty(&row[zone_idx]).map(str::to_string),
                    date,
                    hour,
                })
            })
            .collect()
    }
}

fn non_empty(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_date(value: &str, format: &str, line: usize) -> Result<NaiveDate, CsvInputError> {
    NaiveDate::parse_from_str(value, format).map_err(|_| CsvInputError::InvalidDate {
        line,
        value: value.to_string(),
        format: format.to_string(),
    })
}

/// Accepts plain integers and integral floats such as `8.0`
fn parse_hour(value: &str, line: usize) -> Result<u32, CsvInputError> {
    let invalid = || CsvInputError::InvalidHour {
        line,
        value: value.to_string(),
    };

    if let Ok(hour) = value.parse::<u32>() {
        return Ok(hour);
    }
    match value.parse::<f64>() {
        Ok(hour) if hour.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&hour) => {
            Ok(hour as u32)
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_simple_table() {
        let table = CsvTable::parse("u_id,OBJECTID,date,hour\nu1,42,2020-01-02,7\n").unwrap();
        assert_eq!(table.headers(), ["u_id", "OBJECTID", "date", "hour"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0], ["u1", "42", "2020-01-02", "7"]);
        assert_eq!(table.line_of(0), Some(2));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let input = "a,b\n\"x,y\",\"say \"\"hi\"\"\"\r\n\"multi\nline\",z\n";
        let table = CsvTable::parse(input).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], ["x,y", "say \"hi\""]);
        assert_eq!(table.rows()[1], ["multi\nline", "z"]);
        assert_eq!(table.line_of(1), Some(3));
    }

    #[test]
    fn test_parse_without_trailing_newline_and_blank_lines() {
        let table = CsvTable::parse("\u{feff}a,b\n\n1,2\n\n3,4").unwrap();
        assert_eq!(table.headers(), ["a", "b"]);
        assert_eq!(table.rows(), [vec!["1", "2"], vec!["3", "4"]]);
        assert_eq!(table.line_of(1), Some(5));
    }

    #[test]
    fn test_parse_trailing_empty_field() {
        let table = CsvTable::parse("a,b\n1,\n").unwrap();
        assert_eq!(table.rows()[0], ["1", ""]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(CsvTable::parse("").unwrap_err(), CsvInputError::Empty);
        assert_eq!(
            CsvTable::parse("a,b\n\"open,2\n").unwrap_err(),
            CsvInputError::UnterminatedQuote { line: 2 }
        );
        assert_eq!(
            CsvTable::parse("a,b\n1,2,3\n").unwrap_err(),
            CsvInputError::RaggedRow {
                line: 2,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let table = CsvTable::parse("u_id,OBJECTID,date,hour\n").unwrap();
        assert!(table.is_empty());
        assert!(table.to_records(&ColumnMapping::default()).unwrap().is_empty());
    }

    #[test]
    fn test_to_records_maps_columns_by_name() {
        let csv = "hour,extra,date,OBJECTID,u_id\n7,x,2020-01-02,42,u1\n23.0,y,2020-01-03,,u2\n";
        let table = CsvTable::parse(csv).unwrap();
        let records = table.to_records(&ColumnMapping::default()).unwrap();

        assert_eq!(
            records,
            vec![
                ActivityRow::new("u1", Some("42"), date(2020, 1, 2), 7),
                ActivityRow::new("u2", None, date(2020, 1, 3), 23),
            ]
        );
    }

    #[test]
    fn test_to_records_custom_mapping_and_format() {
        let columns = ColumnMapping {
            user: "user".to_string(),
            zone: "tract".to_string(),
            date: "day".to_string(),
            hour: "h".to_string(),
            date_format: "%d/%m/%Y".to_string(),
        };
        let table = CsvTable::parse("user,tract,day,h\nu1,T1,31/12/2019,0\n").unwrap();
        let records = table.to_records(&columns).unwrap();
        assert_eq!(records[0].date, Some(date(2019, 12, 31)));
        assert_eq!(records[0].zone_id.as_deref(), Some("T1"));
    }

    #[test]
    fn test_to_records_empty_cells_are_absent() {
        let table = CsvTable::parse("u_id,OBJECTID,date,hour\n ,1,,\n").unwrap();
        let records = table.to_records(&ColumnMapping::default()).unwrap();
        assert_eq!(records[0].user_id, None);
        assert_eq!(records[0].date, None);
        assert_eq!(records[0].hour, None);
        assert_eq!(records[0].zone_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_to_records_missing_column() {
        let table = CsvTable::parse("u_id,GEOID,date,hour\n").unwrap();
        assert_eq!(
            table.to_records(&ColumnMapping::default()).unwrap_err(),
            CsvInputError::MissingColumn("OBJECTID".to_string())
        );
    }

    #[test]
    fn test_to_records_invalid_values() {
        let bad_date = CsvTable::parse("u_id,OBJECTID,date,hour\nu1,1,yesterday,3\n").unwrap();
        assert!(matches!(
            bad_date.to_records(&ColumnMapping::default()),
            Err(CsvInputError::InvalidDate { line: 2, .. })
        ));

        let bad_hour = CsvTable::parse("u_id,OBJECTID,date,hour\nu1,1,2020-01-01,-3\n").unwrap();
        assert_eq!(
            bad_hour.to_records(&ColumnMapping::default()).unwrap_err(),
            CsvInputError::InvalidHour {
                line: 2,
                value: "-3".to_string()
            }
        );

        let fractional = CsvTable::parse("u_id,OBJECTID,date,hour\nu1,1,2020-01-01,7.5\n").unwrap();
        assert!(fractional.to_records(&ColumnMapping::default()).is_err());
    }
}
