//! Uploaded record parsing
//!
//! The input is a headered CSV with at least a `name` and a `number`
//! column; extra columns are ignored and surrounding whitespace is
//! trimmed. Column problems surface before any rendering starts.

use serde::{Deserialize, Serialize};

use crate::error::SheetError;

/// One uploaded row: a display name and its assigned number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub number: i64,
}

/// Parse uploaded CSV bytes into records.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let name_col = column_index(&headers, "name")?;
    let number_col = column_index(&headers, "number")?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let name = row.get(name_col).unwrap_or("").to_string();
        let raw = row.get(number_col).unwrap_or("");
        let number = parse_number(raw).ok_or_else(|| SheetError::InvalidNumber {
            // 1-based line number, counting the header line.
            row: i + 2,
            value: raw.to_string(),
        })?;
        records.push(Record { name, number });
    }
    Ok(records)
}

fn column_index(headers: &csv::StringRecord, wanted: &str) -> Result<usize, SheetError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| SheetError::MissingColumn(wanted.to_string()))
}

/// Accepts plain integers and float-formatted integers ("7.0"), the two
/// shapes spreadsheet exports produce for a numeric column.
fn parse_number(raw: &str) -> Option<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let csv = "name,number\nalice,1\nbob,2\n";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![
                Record {
                    name: "alice".to_string(),
                    number: 1
                },
                Record {
                    name: "bob".to_string(),
                    number: 2
                },
            ]
        );
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "club,name,number\nRiver City,carol,3\n";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].name, "carol");
        assert_eq!(records[0].number, 3);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let csv = "Name,Number\ndave,4\n";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].number, 4);
    }

    #[test]
    fn test_quoted_fields_survive() {
        let csv = "name,number\n\"St. James, Eve\",5\n";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].name, "St. James, Eve");
    }

    #[test]
    fn test_float_formatted_numbers_are_accepted() {
        let csv = "name,number\nalice,7.0\n";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].number, 7);
    }

    #[test]
    fn test_missing_name_column_is_rejected() {
        let csv = "title,number\nalice,1\n";
        match parse_records(csv.as_bytes()) {
            Err(SheetError::MissingColumn(col)) => assert_eq!(col, "name"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_number_column_is_rejected() {
        let csv = "name\nalice\n";
        match parse_records(csv.as_bytes()) {
            Err(SheetError::MissingColumn(col)) => assert_eq!(col, "number"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_number_names_the_row() {
        let csv = "name,number\nalice,1\nbob,twelve\n";
        match parse_records(csv.as_bytes()) {
            Err(SheetError::InvalidNumber { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "twelve");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_missing_columns() {
        assert!(matches!(
            parse_records(b""),
            Err(SheetError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_header_only_input_yields_no_records() {
        let records = parse_records(b"name,number\n").unwrap();
        assert!(records.is_empty());
    }
}
