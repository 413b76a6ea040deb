use std::fmt;
use std::path::Path;

/// Document formats the converter knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Xlsx,
    Pptx,
    Pdf,
    Html,
    Zip,
    Csv,
    PlainText,
}

impl DocumentKind {
    /// Map a file extension (without the dot) to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "pptx" => Some(Self::Pptx),
            "pdf" => Some(Self::Pdf),
            "html" | "htm" => Some(Self::Html),
            "zip" => Some(Self::Zip),
            "csv" => Some(Self::Csv),
            "txt" | "text" | "md" | "markdown" | "json" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Guess the kind from the leading bytes of the content.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if let Some(kind) = infer::get(bytes) {
            let by_mime = match kind.mime_type() {
                "application/pdf" => Some(Self::Pdf),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    Some(Self::Docx)
                }
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                    Some(Self::Xlsx)
                }
                "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                    Some(Self::Pptx)
                }
                "application/zip" => Some(Self::Zip),
                "text/html" => Some(Self::Html),
                _ => None,
            };
            if by_mime.is_some() {
                return by_mime;
            }
        }

        if looks_like_html(bytes) {
            return Some(Self::Html);
        }
        None
    }

    /// Extension hint first, content second.
    pub fn detect(file_name: Option<&str>, bytes: &[u8]) -> Option<Self> {
        file_name
            .and_then(Self::from_file_name)
            .or_else(|| Self::sniff(bytes))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Docx => "DOCX",
            Self::Xlsx => "XLSX",
            Self::Pptx => "PPTX",
            Self::Pdf => "PDF",
            Self::Html => "HTML",
            Self::Zip => "ZIP",
            Self::Csv => "CSV",
            Self::PlainText => "text",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn looks_like_html(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<body")
}
