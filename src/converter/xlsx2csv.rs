use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx, XlsxError};

use crate::error::{ConvertError, Result};

/// Result of xlsx to csv conversion
pub struct Xlsx2CsvResult {
    /// Sheet names in workbook order
    pub sheet_names: Vec<String>,
    /// CSV content for each sheet
    pub csv_data: Vec<String>,
}

impl Xlsx2CsvResult {
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sheet_names
            .iter()
            .map(String::as_str)
            .zip(self.csv_data.iter().map(String::as_str))
    }
}

/// Convert xlsx byte data to one CSV string per sheet
pub fn xlsx_to_csv(data: &[u8]) -> Result<Xlsx2CsvResult> {
    let mut workbook: Xlsx<Cursor<&[u8]>> = open_workbook_from_rs(Cursor::new(data))
        .map_err(|e: XlsxError| ConvertError::Spreadsheet(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ConvertError::Spreadsheet("No sheets found in xlsx file".to_string()));
    }

    let mut csv_data = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| ConvertError::Spreadsheet(format!("sheet '{}': {}", sheet_name, e)))?;
        csv_data.push(range_to_csv_string(&range)?);
    }

    Ok(Xlsx2CsvResult {
        sheet_names,
        csv_data,
    })
}

/// Convert a single worksheet range to CSV. Rows keep their own width.
fn range_to_csv_string(range: &Range<Data>) -> Result<String> {
    let mut output = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(&mut output);

        for row in range.rows() {
            writer.write_record(row.iter().map(cell_text))?;
        }

        writer.flush()?;
    } // writer is dropped here, releasing the borrow on output

    String::from_utf8(output).map_err(|e| ConvertError::Spreadsheet(e.to_string()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("item".to_string()));
        range.set_value((0, 1), Data::String("price".to_string()));
        range.set_value((1, 0), Data::String("tea".to_string()));
        range.set_value((1, 1), Data::Float(4.0));
        range.set_value((1, 2), Data::String("extra".to_string()));
        range.set_value((2, 0), Data::String("cake".to_string()));
        range.set_value((2, 1), Data::Float(2.5));
        range
    }

    #[test]
    fn whole_numbers_drop_the_fraction() {
        let csv = range_to_csv_string(&sample_range()).unwrap();
        assert_eq!(csv, "item,price,\ntea,4,extra\ncake,2.5,\n");
    }

    #[test]
    fn garbage_is_a_spreadsheet_error() {
        let err = xlsx_to_csv(b"not a workbook").err().unwrap();
        assert!(matches!(err, ConvertError::Spreadsheet(_)));
    }
}
