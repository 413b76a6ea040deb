//! Convert office documents, PDFs and HTML into Markdown, and serve a small
//! upload form around the converter.

use std::path::Path;

use tracing::debug;

pub mod config;
pub mod converter;
pub mod error;
pub mod export;
pub mod generator;
pub mod kind;
pub mod stats;
pub mod web;

pub use error::{ConvertError, Result};
pub use export::ExportFormat;
pub use kind::DocumentKind;
pub use stats::ConversionStats;

pub struct ConverterFile {
    /// Original file name, used as the format hint
    pub file_name: Option<String>,
    pub file_stream: Vec<u8>,
}

/// Limits applied while converting.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// How many ZIP archives may be nested inside each other
    pub max_zip_depth: usize,
    /// Entries beyond this count are ignored
    pub max_zip_entries: usize,
    /// Budget for the bytes unpacked from one archive
    pub max_unpacked_bytes: u64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_zip_depth: 2,
            max_zip_entries: 200,
            max_unpacked_bytes: 50 * 1024 * 1024,
        }
    }
}

// byte_stream -> String
pub fn convert(file: ConverterFile) -> Result<String> {
    convert_with(&file, &ConvertOptions::default())
}

pub fn convert_with(file: &ConverterFile, options: &ConvertOptions) -> Result<String> {
    convert_at_depth(file, options, 0)
}

pub(crate) fn convert_at_depth(
    file: &ConverterFile,
    options: &ConvertOptions,
    depth: usize,
) -> Result<String> {
    if file.file_stream.is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    let kind = DocumentKind::detect(file.file_name.as_deref(), &file.file_stream).ok_or_else(
        || {
            ConvertError::UnsupportedFormat(
                file.file_name
                    .clone()
                    .unwrap_or_else(|| "unknown content".to_string()),
            )
        },
    )?;

    debug!(
        file_name = file.file_name.as_deref().unwrap_or("-"),
        %kind,
        bytes = file.file_stream.len(),
        "converting document"
    );

    let bytes = &file.file_stream;
    let markdown = match kind {
        DocumentKind::Docx => generator::docx2md::run(bytes)?,
        DocumentKind::Pptx => generator::pptx2md::run(bytes)?,
        DocumentKind::Xlsx => generator::xlsx2md::run(bytes)?,
        DocumentKind::Csv => generator::csv2md::run(bytes)?,
        DocumentKind::Html => generator::html2md::run(bytes)?,
        DocumentKind::Pdf => generator::pdf2md::run(bytes)?,
        DocumentKind::Zip => generator::zip2md::run(bytes, options, depth)?,
        DocumentKind::PlainText => generator::text2md::run(bytes)?,
    };

    if markdown.trim().is_empty() {
        return Err(ConvertError::EmptyOutput(kind.label()));
    }
    Ok(markdown)
}

pub fn convert_from_path(file_path: impl AsRef<Path>) -> Result<String> {
    convert_from_path_with(file_path, &ConvertOptions::default())
}

pub fn convert_from_path_with(file_path: impl AsRef<Path>, options: &ConvertOptions) -> Result<String> {
    let file_path = file_path.as_ref();
    let file_stream = std::fs::read(file_path)?;

    let file = ConverterFile {
        file_name: file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        file_stream,
    };

    convert_with(&file, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_input_is_rejected() {
        let file = ConverterFile {
            file_name: Some("empty.pdf".to_string()),
            file_stream: Vec::new(),
        };
        assert!(matches!(convert(file), Err(ConvertError::EmptyInput)));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let file = ConverterFile {
            file_name: Some("photo.raw".to_string()),
            file_stream: vec![0x00, 0x01, 0x02, 0x03],
        };
        assert!(matches!(convert(file), Err(ConvertError::UnsupportedFormat(_))));
    }

    #[test]
    fn blank_document_is_an_error() {
        let file = ConverterFile {
            file_name: Some("blank.txt".to_string()),
            file_stream: b"   \n\n ".to_vec(),
        };
        assert!(matches!(convert(file), Err(ConvertError::EmptyOutput(_))));
    }

    #[test]
    fn converts_from_path_using_the_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "name,qty\napple,3").unwrap();
        drop(f);

        let markdown = convert_from_path(&path).unwrap();
        assert!(markdown.contains("| name | qty |"));
        assert!(markdown.contains("| apple | 3 |"));
    }

    #[test]
    fn missing_path_is_io_error() {
        let err = convert_from_path("/definitely/not/here.docx").unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
