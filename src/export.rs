use std::path::Path;

use serde::Serialize;

/// Download flavours offered for a converted document. Both carry the same
/// text; they differ in file name and MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    PlainText,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Markdown, ExportFormat::PlainText];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::PlainText => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::PlainText => "text/plain",
        }
    }

    /// `report.final.docx` becomes `report.final_converted.md`.
    pub fn file_name(&self, original: &str) -> String {
        format!("{}_converted.{}", base_name(original), self.extension())
    }

    pub fn descriptor(&self, original: &str) -> ExportDescriptor {
        ExportDescriptor {
            label: format!("Download .{}", self.extension()),
            file_name: self.file_name(original),
            mime_type: self.mime_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportDescriptor {
    pub label: String,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// File name without directories and without its last extension.
pub fn base_name(original: &str) -> String {
    let path = Path::new(original);
    match path.file_stem() {
        Some(stem) if !stem.is_empty() => stem.to_string_lossy().into_owned(),
        _ => "document".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_upload() {
        assert_eq!(ExportFormat::Markdown.file_name("report.docx"), "report_converted.md");
        assert_eq!(ExportFormat::PlainText.file_name("a.b.pdf"), "a.b_converted.txt");
        assert_eq!(ExportFormat::Markdown.file_name("README"), "README_converted.md");
    }

    #[test]
    fn directories_are_dropped() {
        assert_eq!(base_name("nested/dir/slides.pptx"), "slides");
        assert_eq!(base_name(""), "document");
    }

    #[test]
    fn descriptors_carry_mime_types() {
        let d = ExportFormat::PlainText.descriptor("sheet.xlsx");
        assert_eq!(d.label, "Download .txt");
        assert_eq!(d.mime_type, "text/plain");
        assert_eq!(d.file_name, "sheet_converted.txt");
    }
}
