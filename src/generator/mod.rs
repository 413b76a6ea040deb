//! Format-specific Markdown generators. Each exposes `run(bytes)`.

pub mod csv2md;
pub mod docx2md;
pub mod html2md;
pub mod pdf2md;
pub mod pptx2md;
pub mod text2md;
pub mod xlsx2md;
pub mod zip2md;

/// Escape characters that would break a pipe-table cell.
pub(crate) fn table_cell(text: &str) -> String {
    text.trim()
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace('\n', " ")
}

/// Render rows as a pipe table, first row as header. Short rows are padded.
pub(crate) fn pipe_table(rows: &[Vec<String>]) -> String {
    let Some(header) = rows.first() else {
        return String::new();
    };
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut markdown = String::new();
    let render_row = |row: &Vec<String>, out: &mut String| {
        out.push('|');
        for i in 0..width {
            let cell = row.get(i).map(|c| table_cell(c)).unwrap_or_default();
            out.push_str(&format!(" {} |", cell));
        }
        out.push('\n');
    };

    render_row(header, &mut markdown);
    markdown.push('|');
    for _ in 0..width {
        markdown.push_str(" --- |");
    }
    markdown.push('\n');
    for row in rows.iter().skip(1) {
        render_row(row, &mut markdown);
    }
    markdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn pads_ragged_rows() {
        let table = pipe_table(&[row(&["a", "b"]), row(&["1"])]);
        assert_eq!(table, "| a | b |\n| --- | --- |\n| 1 |  |\n");
    }

    #[test]
    fn escapes_pipes_and_newlines() {
        assert_eq!(table_cell(" x|y\nz "), "x\\|y z");
    }

    #[test]
    fn empty_rows_render_nothing() {
        assert!(pipe_table(&[]).is_empty());
        assert!(pipe_table(&[Vec::new()]).is_empty());
    }
}
