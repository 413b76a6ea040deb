use lopdf::Document;
use tracing::warn;

use crate::error::{ConvertError, Result};

/// Extract the text layer page by page. Scanned pages without text come out
/// empty; there is no OCR.
pub fn run(file_stream: &[u8]) -> Result<String> {
    let document = Document::load_mem(file_stream).map_err(|e| ConvertError::Pdf(e.to_string()))?;

    if document.is_encrypted() {
        return Err(ConvertError::Pdf("document is encrypted".to_string()));
    }

    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => pages.push(normalize_page(&text)),
            Err(e) => warn!(page = page_number, error = %e, "failed to extract page text"),
        }
    }

    Ok(join_pages(&pages))
}

/// Trim each line and drop blank ones inside a page.
fn normalize_page(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|page| !page.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}
