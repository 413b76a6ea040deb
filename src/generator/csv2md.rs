use csv::ReaderBuilder;
use std::io::Cursor;

use crate::error::{ConvertError, Result};
use crate::generator::pipe_table;

pub fn run(bytes: &[u8]) -> Result<String> {
    let cursor = Cursor::new(bytes);
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(cursor);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|cell| cell.trim().to_string()).collect();
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ConvertError::EmptyOutput("CSV"));
    }

    Ok(pipe_table(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_then_rows() {
        let md = run(b"name, qty\napple,3\npear , 10\n").unwrap();
        assert_eq!(
            md,
            "| name | qty |\n| --- | --- |\n| apple | 3 |\n| pear | 10 |\n"
        );
    }

    #[test]
    fn quoted_cells_and_blank_lines() {
        let md = run(b"a,b\n\"x, y\",\"p|q\"\n,\n").unwrap();
        assert!(md.contains("| x, y | p\\|q |"));
        assert_eq!(md.lines().count(), 3);
    }

    #[test]
    fn empty_csv_is_an_error() {
        assert!(matches!(run(b""), Err(ConvertError::EmptyOutput("CSV"))));
    }
}
