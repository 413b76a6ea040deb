use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::Result;
use crate::generator::pipe_table;

pub fn run(file_stream: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(file_stream))?;

    // slide number -> archive path, so slide10 sorts after slide9
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort();

    let mut markdown = String::new();
    for (index, (_, path)) in slides.iter().enumerate() {
        let content = read_entry(&mut archive, path)?;
        if index > 0 {
            markdown.push_str("---\n\n");
        }
        markdown.push_str(&format!("## Slide {}\n\n", index + 1));
        markdown.push_str(&parse_slide_content(&content)?);
    }

    Ok(markdown)
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn attribute(element: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

fn parse_slide_content(xml_content: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml_content);
    let mut markdown = String::new();
    let mut buf = Vec::new();
    let mut title_shape = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => match element.name().as_ref() {
                b"p:sp" => title_shape = false,
                b"p:txBody" => {
                    let text_content = extract_text_body(&mut reader, title_shape)?;
                    if !text_content.trim().is_empty() {
                        markdown.push_str(&text_content);
                        markdown.push('\n');
                    }
                }
                b"a:tbl" => {
                    let table_content = extract_table(&mut reader)?;
                    if !table_content.is_empty() {
                        markdown.push_str(&table_content);
                        markdown.push('\n');
                    }
                }
                b"a:blip" => push_image(&element, &mut markdown)?,
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"p:ph" => {
                    let kind = attribute(&element, b"type")?;
                    title_shape = matches!(kind.as_deref(), Some("title" | "ctrTitle"));
                }
                b"a:blip" => push_image(&element, &mut markdown)?,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(markdown)
}

/// Pictures are referenced by their relationship id, e.g. `![image](rId2)`.
fn push_image(element: &BytesStart, markdown: &mut String) -> Result<()> {
    if let Some(embed_id) = attribute(element, b"r:embed")? {
        markdown.push_str(&format!("![image]({})\n\n", embed_id));
    }
    Ok(())
}

fn extract_text_body(reader: &mut Reader<&[u8]>, title_shape: bool) -> Result<String> {
    let mut text_content = String::new();
    let mut buf = Vec::new();
    let mut current_paragraph = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) if element.name().as_ref() == b"a:t" => {
                current_paragraph.push_str(&extract_text_run(reader)?);
            }
            Event::End(element) => match element.name().as_ref() {
                b"a:p" => {
                    let line = current_paragraph.trim();
                    if !line.is_empty() {
                        if title_shape || is_title_text(line) {
                            text_content.push_str(&format!("### {}\n", line));
                        } else {
                            text_content.push_str(&format!("- {}\n", line));
                        }
                    }
                    current_paragraph.clear();
                }
                b"p:txBody" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text_content)
}

/// Short lines without closing punctuation read as slide titles.
fn is_title_text(line: &str) -> bool {
    line.len() < 100 && !line.ends_with(['.', '!', '?']) && !line.contains('\n')
}

fn extract_text_run(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::End(element) if element.name().as_ref() == b"a:t" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn extract_table(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => match element.name().as_ref() {
                b"a:tr" => rows.push(Vec::new()),
                b"a:tc" => {
                    let cell_content = extract_table_cell(reader)?;
                    if let Some(row) = rows.last_mut() {
                        row.push(cell_content);
                    }
                }
                _ => {}
            },
            Event::End(element) if element.name().as_ref() == b"a:tbl" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(pipe_table(&rows))
}

fn extract_table_cell(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut cell_content = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => cell_content.push_str(&e.unescape()?),
            Event::End(element) => match element.name().as_ref() {
                b"a:p" if !cell_content.ends_with(' ') => cell_content.push(' '),
                b"a:tc" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(cell_content.trim().to_string())
}
