use std::io::Cursor;

use docx_rust::{
    DocxFile,
    document::{BodyContent, Paragraph, ParagraphContent, RunContent, Table, TableCellContent, TableRowContent},
};

use crate::error::{ConvertError, Result};
use crate::generator::pipe_table;

pub fn run(file_stream: &[u8]) -> Result<String> {
    let docx_file = DocxFile::from_reader(Cursor::new(file_stream))
        .map_err(|e| ConvertError::Docx(format!("{:?}", e)))?;
    let doc = docx_file
        .parse()
        .map_err(|e| ConvertError::Docx(format!("{:?}", e)))?;

    let mut markdown = String::new();
    for content in &doc.document.body.content {
        let block = match content {
            BodyContent::Paragraph(paragraph) => process_paragraph(paragraph),
            BodyContent::Table(table) => process_table(table),
            _ => continue,
        };
        if !block.trim().is_empty() {
            markdown.push_str(block.trim_end());
            markdown.push_str("\n\n");
        }
    }

    Ok(markdown)
}

fn process_paragraph(paragraph: &Paragraph) -> String {
    let mut style_heading = None;
    if let Some(property) = &paragraph.property {
        if let Some(style_id) = &property.style_id {
            style_heading = check_style_for_heading(&style_id.value);
        }
    }

    let mut text_content = String::new();
    let mut has_bold = false;
    let mut font_size: Option<f32> = None;

    for content in &paragraph.content {
        if let ParagraphContent::Run(run) = content {
            if let Some(props) = &run.property {
                if props.bold.is_some() {
                    has_bold = true;
                }
                if let Some(size) = &props.size {
                    // half-points to points
                    font_size = Some(size.value as f32 / 2.0);
                }
            }

            for run_content in &run.content {
                match run_content {
                    RunContent::Text(text) => text_content.push_str(&text.text),
                    RunContent::Tab(_) => text_content.push('\t'),
                    RunContent::Break(_) => text_content.push('\n'),
                    _ => {}
                }
            }
        }
    }

    match heading_level(style_heading, has_bold, font_size, &text_content) {
        Some(level) if !text_content.trim().is_empty() => {
            format!("{} {}", "#".repeat(level.clamp(1, 6)), text_content.trim())
        }
        _ => text_content,
    }
}

/// Heading level implied by a paragraph style name such as `Heading2`.
fn check_style_for_heading(style_name: &str) -> Option<usize> {
    let style_lower = style_name.to_lowercase();
    let digits = || {
        style_name
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse::<usize>()
            .ok()
    };

    if style_lower.contains("subtitle") {
        return Some(2);
    }
    if style_lower.starts_with("heading") || style_lower.starts_with("title") {
        return Some(digits().unwrap_or(1));
    }
    if style_lower.contains("header") {
        return Some(digits().unwrap_or(3));
    }

    None
}

fn heading_level(
    style_level: Option<usize>,
    has_bold: bool,
    font_size: Option<f32>,
    content: &str,
) -> Option<usize> {
    if style_level.is_some() {
        return style_level;
    }

    let trimmed = content.trim();

    if let Some(size) = font_size {
        let level = match size as u32 {
            s if s >= 18 => Some(1),
            s if s >= 16 => Some(2),
            s if s >= 14 => Some(3),
            _ => None,
        };
        if level.is_some() && trimmed.len() < 100 && !trimmed.ends_with('.') {
            return level;
        }
    }

    // short, bold lines without sentence punctuation
    if has_bold
        && !trimmed.is_empty()
        && trimmed.len() < 80
        && !trimmed.ends_with(['.', '!', '?', ':'])
        && !trimmed.contains('\n')
        && trimmed.chars().any(|c| c.is_alphabetic())
    {
        return Some(if trimmed.len() < 30 {
            2
        } else if trimmed.len() < 50 {
            3
        } else {
            4
        });
    }

    None
}

fn process_table(table: &Table) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| match cell {
                    TableRowContent::TableCell(tc) => extract_cell_text(tc),
                    #[allow(unreachable_patterns)]
                    _ => String::new(),
                })
                .collect()
        })
        .collect();

    pipe_table(&rows)
}

fn extract_cell_text(cell: &docx_rust::document::TableCell) -> String {
    let mut text = String::new();

    for content in &cell.content {
        let paragraph = match content {
            TableCellContent::Paragraph(paragraph) => paragraph,
            #[allow(unreachable_patterns)]
            _ => continue,
        };
        for para_content in &paragraph.content {
            if let ParagraphContent::Run(run) = para_content {
                for run_content in &run.content {
                    if let RunContent::Text(text_elem) = run_content {
                        text.push_str(&text_elem.text);
                    }
                }
            }
        }
        if !text.is_empty() && !text.ends_with(' ') {
            text.push(' ');
        }
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rust::{
        Docx,
        document::{Run, TableRow},
        formatting::{CharacterProperty, ParagraphProperty},
    };

    fn cell(text: &str) -> Paragraph<'_> {
        Paragraph::default().push_text(text)
    }

    fn sample_docx() -> Vec<u8> {
        let mut docx = Docx::default();
        docx.document.push(
            Paragraph::default()
                .property(ParagraphProperty::default().style_id("Heading1"))
                .push_text("Annual report"),
        );
        docx.document
            .push(Paragraph::default().push_text("Revenue grew in every region."));
        docx.document.push(
            Table::default()
                .push_row(TableRow::default().push_cell(cell("Region")).push_cell(cell("Sales")))
                .push_row(TableRow::default().push_cell(cell("North")).push_cell(cell("12"))),
        );
        docx.document.push(
            Paragraph::default().push(
                Run::default()
                    .property(CharacterProperty::default().bold(true))
                    .push_text("Key findings"),
            ),
        );
        docx.document
            .push(Paragraph::default().push_text("Figures are unaudited."));

        docx.write(Cursor::new(Vec::new())).unwrap().into_inner()
    }

    #[test]
    fn converts_a_document_in_body_order() {
        let md = run(&sample_docx()).unwrap();

        assert!(md.starts_with("# Annual report\n\n"));
        assert!(md.contains("| Region | Sales |\n| --- | --- |\n| North | 12 |"));
        assert!(md.contains("## Key findings\n\n"));

        let order: Vec<usize> = ["# Annual report", "Revenue grew", "| Region", "## Key findings", "Figures are"]
            .iter()
            .map(|needle| md.find(needle).unwrap())
            .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn heading_styles() {
        assert_eq!(check_style_for_heading("Heading1"), Some(1));
        assert_eq!(check_style_for_heading("heading 3"), Some(3));
        assert_eq!(check_style_for_heading("Title"), Some(1));
        assert_eq!(check_style_for_heading("Subtitle"), Some(2));
        assert_eq!(check_style_for_heading("PageHeader"), Some(3));
        assert_eq!(check_style_for_heading("Normal"), None);
    }

    #[test]
    fn style_beats_formatting() {
        assert_eq!(heading_level(Some(2), false, Some(30.0), "Intro"), Some(2));
    }

    #[test]
    fn large_font_short_line_is_heading() {
        assert_eq!(heading_level(None, false, Some(20.0), "Overview"), Some(1));
        assert_eq!(heading_level(None, false, Some(14.0), "Details"), Some(3));
        assert_eq!(heading_level(None, false, Some(20.0), "A full sentence."), None);
        assert_eq!(heading_level(None, false, Some(11.0), "Body text"), None);
    }

    #[test]
    fn bold_short_line_is_heading() {
        assert_eq!(heading_level(None, true, None, "Key findings"), Some(2));
        assert_eq!(heading_level(None, true, None, "Note:"), None);
        assert_eq!(heading_level(None, true, None, "2024"), None);
        assert_eq!(heading_level(None, false, None, "Key findings"), None);
    }

    #[test]
    fn garbage_is_a_docx_error() {
        assert!(matches!(run(b"not a docx"), Err(ConvertError::Docx(_))));
    }
}
