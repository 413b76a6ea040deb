use std::collections::HashMap;

use html2md::{Handle, StructuredPrinter, TagHandler, TagHandlerFactory, parse_html_custom};

use crate::error::Result;

/// Elements whose text never belongs in the document body.
const DROPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Swallows an element together with everything inside it.
#[derive(Default)]
struct DropHandler;

impl TagHandler for DropHandler {
    fn handle(&mut self, _tag: &Handle, _printer: &mut StructuredPrinter) {}

    fn after_handle(&mut self, _printer: &mut StructuredPrinter) {}

    fn skip_descendants(&self) -> bool {
        true
    }
}

pub fn run(bytes: &[u8]) -> Result<String> {
    // Pages in legacy encodings still convert, with replacement characters.
    let html_content = String::from_utf8_lossy(bytes);
    let html_content = html_content.trim_start_matches('\u{feff}');

    let mut handlers: HashMap<String, Box<dyn TagHandlerFactory>> = HashMap::new();
    for tag in DROPPED_TAGS {
        handlers.insert(tag.to_string(), Box::new(DropHandler::default));
    }

    let markdown = parse_html_custom(html_content, &handlers);
    Ok(tidy(&markdown))
}

/// Collapse runs of blank lines left behind by layout markup.
fn tidy(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut blank_run = 0;
    for line in markdown.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs_survive() {
        let md = run(b"<html><body><h1>Quarterly</h1><p>Revenue grew.</p></body></html>").unwrap();
        assert!(md.contains("Quarterly"));
        assert!(md.contains("Revenue grew."));
        assert!(!md.contains("<p>"));
    }

    #[test]
    fn script_and_style_are_dropped() {
        let md = run(
            b"<html><head><style>.x{color:red}</style><script>var secret=1;</script></head>\
              <body><p>Body</p><noscript>enable js</noscript></body></html>",
        )
        .unwrap();
        assert!(md.contains("Body"));
        assert!(!md.contains("color"));
        assert!(!md.contains("secret"));
        assert!(!md.contains("enable js"));
    }

    #[test]
    fn blank_runs_collapse() {
        assert_eq!(tidy("a\n\n\n\nb  \n"), "a\n\nb");
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let md = run(b"<p>caf\xe9</p>").unwrap();
        assert!(md.starts_with("caf"));
    }
}
