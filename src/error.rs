//! Error types for document conversion.

use thiserror::Error;

/// Everything that can go wrong while turning a document into Markdown.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input stream was empty
    #[error("Input stream is empty")]
    EmptyInput,

    /// Neither the file name nor the content identified a supported format
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The document parsed but produced no text
    #[error("No text could be extracted from {0}")]
    EmptyOutput(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Error parsing XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to read DOCX file: {0}")]
    Docx(String),

    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    /// ZIP archives nested deeper than the configured limit
    #[error("Archive nesting exceeds {0} levels")]
    NestingTooDeep(usize),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
