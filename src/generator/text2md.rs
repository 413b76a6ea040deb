use crate::error::Result;

/// Plain text and Markdown pass through unchanged apart from line endings.
pub fn run(bytes: &[u8]) -> Result<String> {
    let text = String::from_utf8_lossy(bytes);
    Ok(text.trim_start_matches('\u{feff}').replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings_and_bom() {
        assert_eq!(run("\u{feff}a\r\nb".as_bytes()).unwrap(), "a\nb");
    }
}
