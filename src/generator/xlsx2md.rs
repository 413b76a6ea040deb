use tracing::debug;

use crate::converter::xlsx2csv;
use crate::error::{ConvertError, Result};
use crate::generator::csv2md;

/// Every non-empty sheet becomes a `## name` section holding a pipe table.
pub fn run(file_stream: &[u8]) -> Result<String> {
    let csvs = xlsx2csv::xlsx_to_csv(file_stream)?;

    let mut markdown = String::new();
    for (name, csv) in csvs.sheets() {
        let table = match csv2md::run(csv.as_bytes()) {
            Ok(table) => table,
            Err(ConvertError::EmptyOutput(_)) => {
                debug!(sheet = name, "skipping empty sheet");
                continue;
            }
            Err(e) => return Err(e),
        };
        markdown.push_str(&format!("## {}\n\n", name));
        markdown.push_str(&table);
        markdown.push('\n');
    }

    if markdown.is_empty() {
        return Err(ConvertError::Spreadsheet("No sheets with data found".to_string()));
    }
    Ok(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::{SimpleFileOptions, ZipWriter};

    const NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Minimal workbook: one worksheet part per `(name, sheetData rows)`.
    fn build_xlsx(sheets: &[(&str, &str)]) -> Vec<u8> {
        let mut workbook = format!(r#"<workbook xmlns="{}" xmlns:r="{}"><sheets>"#, NS, REL_NS);
        let mut rels = String::from(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        let mut parts = Vec::new();
        for (i, (name, rows)) in sheets.iter().enumerate() {
            let n = i + 1;
            workbook.push_str(&format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, name, n, n));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                n, REL_NS, n
            ));
            parts.push((
                format!("xl/worksheets/sheet{}.xml", n),
                format!(r#"<worksheet xmlns="{}"><sheetData>{}</sheetData></worksheet>"#, NS, rows),
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");
        parts.push(("xl/workbook.xml".to_string(), workbook));
        parts.push(("xl/_rels/workbook.xml.rels".to_string(), rels));

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn text_cell(reference: &str, text: &str) -> String {
        format!(r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#, reference, text)
    }

    fn number_cell(reference: &str, value: &str) -> String {
        format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value)
    }

    #[test]
    fn each_sheet_gets_a_section() {
        let prices = format!(
            r#"<row r="1">{}{}</row><row r="2">{}{}</row>"#,
            text_cell("A1", "item"),
            text_cell("B1", "price"),
            text_cell("A2", "tea"),
            number_cell("B2", "4")
        );
        let stock = format!(
            r#"<row r="1">{}</row><row r="2">{}</row>"#,
            text_cell("A1", "warehouse"),
            text_cell("A2", "north")
        );
        let bytes = build_xlsx(&[("Prices", prices.as_str()), ("Blank", ""), ("Stock", stock.as_str())]);

        let md = run(&bytes).unwrap();
        assert!(md.contains("## Prices\n\n| item | price |\n| --- | --- |\n| tea | 4 |"));
        assert!(md.contains("## Stock\n\n| warehouse |"));
        assert!(!md.contains("## Blank"));
        assert!(md.find("## Prices").unwrap() < md.find("## Stock").unwrap());
    }

    #[test]
    fn workbook_without_data_is_an_error() {
        let bytes = build_xlsx(&[("Empty", ""), ("AlsoEmpty", "")]);
        assert!(matches!(run(&bytes), Err(ConvertError::Spreadsheet(_))));
    }
}
