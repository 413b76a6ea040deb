use std::io::{Cursor, Read};

use tracing::debug;
use zip::ZipArchive;

use crate::error::{ConvertError, Result};
use crate::{ConvertOptions, ConverterFile, convert_at_depth};

/// Convert every supported entry of an archive, each under its own heading.
/// Entries that fail are listed at the end instead of failing the archive.
pub fn run(file_stream: &[u8], options: &ConvertOptions, depth: usize) -> Result<String> {
    if depth >= options.max_zip_depth {
        return Err(ConvertError::NestingTooDeep(options.max_zip_depth));
    }

    let mut archive = ZipArchive::new(Cursor::new(file_stream))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/') && !is_hidden(name))
        .map(str::to_string)
        .collect();
    names.sort();

    let mut markdown = String::new();
    let mut skipped = Vec::new();
    let mut remaining = options.max_unpacked_bytes;

    for name in names.iter().take(options.max_zip_entries) {
        let file_stream = match read_entry(&mut archive, name, remaining) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(entry = %name, limit = remaining, "archive entry exceeds unpack limit");
                skipped.push(name.as_str());
                continue;
            }
            Err(e) => {
                debug!(entry = %name, error = %e, "unreadable archive entry");
                skipped.push(name.as_str());
                continue;
            }
        };
        remaining -= file_stream.len() as u64;

        let entry = ConverterFile {
            file_name: Some(name.clone()),
            file_stream,
        };
        // a nested archive only gets what is left of this one's budget
        let nested = ConvertOptions {
            max_unpacked_bytes: remaining,
            ..options.clone()
        };
        match convert_at_depth(&entry, &nested, depth + 1) {
            Ok(content) => {
                markdown.push_str(&format!("## File: {}\n\n", name));
                markdown.push_str(content.trim_end());
                markdown.push_str("\n\n");
            }
            Err(e) => {
                debug!(entry = %name, error = %e, "skipping archive entry");
                skipped.push(name.as_str());
            }
        }
    }

    if markdown.is_empty() {
        return Err(ConvertError::EmptyOutput("ZIP"));
    }

    if names.len() > options.max_zip_entries {
        markdown.push_str(&format!(
            "_{} more entries not converted._\n\n",
            names.len() - options.max_zip_entries
        ));
    }
    if !skipped.is_empty() {
        markdown.push_str("Skipped entries:\n\n");
        for name in skipped {
            markdown.push_str(&format!("- {}\n", name));
        }
    }

    Ok(markdown)
}

/// Entry contents, or `None` when they would exceed `limit` bytes. The
/// declared size is checked first, then the stream itself is capped.
fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str, limit: u64) -> Result<Option<Vec<u8>>> {
    let file = archive.by_name(name)?;
    if file.size() > limit {
        return Ok(None);
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    Ok((bytes.len() as u64 <= limit).then_some(bytes))
}

/// macOS resource forks and dotfiles.
fn is_hidden(name: &str) -> bool {
    name.starts_with("__MACOSX/")
        || name
            .rsplit('/')
            .next()
            .is_some_and(|base| base.starts_with('.'))
}
