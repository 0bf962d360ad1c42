//! HWPX (OWPML) package parsing.
//!
//! HWPX is the zip/XML sibling of binary HWP: body sections live in
//! `Contents/section{n}.xml` and package metadata in a `.hpf` manifest.
//! The parser pulls those into the same document model the binary pipeline
//! produces, so both formats share the renderers. Character-level styling
//! stays at defaults here; HWPX styling lives in a separate header part
//! and is out of this parser's structural scope.

use std::borrow::Cow;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::{Document, Metadata, Paragraph, Section, Table, TableCell, TableRow};

/// HWPX package parser.
pub struct HwpxParser {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl HwpxParser {
    /// Open an HWPX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse an HWPX package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data.to_vec()))?;
        Ok(Self { archive })
    }

    /// Parse the package and return a document model.
    pub fn parse(&mut self) -> Result<Document> {
        let mut document = Document::new();
        document.metadata = self.extract_metadata();

        let section_names = self.section_names();
        if section_names.is_empty() {
            return Err(Error::MissingStream("Contents/section0.xml".to_string()));
        }

        for (index, name) in section_names.iter().enumerate() {
            let xml = self.read_entry(name)?;
            let section = parse_section_xml(&xml, index as u32)?;
            document.add_section(section);
        }
        document.metadata.section_count = document.section_count();

        Ok(document)
    }

    /// Body section entries, sorted. Falls back to any `*section*.xml`
    /// when the standard `Contents/` layout is absent.
    fn section_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|n| n.starts_with("Contents/section") && n.ends_with(".xml"))
            .map(String::from)
            .collect();

        if names.is_empty() {
            names = self
                .archive
                .file_names()
                .filter(|n| n.to_lowercase().contains("section") && n.ends_with(".xml"))
                .map(String::from)
                .collect();
        }

        names.sort();
        names
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self
            .archive
            .by_name(name)
            .map_err(|_| Error::MissingStream(name.to_string()))?;
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read package metadata from the `.hpf` manifest. Failures are logged
    /// and never fail the parse.
    fn extract_metadata(&mut self) -> Metadata {
        let mut metadata = Metadata::with_version("HWPX");

        let manifest = self
            .archive
            .file_names()
            .find(|n| n.to_lowercase().ends_with(".hpf"))
            .map(String::from);

        if let Some(name) = manifest {
            match self.read_entry(&name) {
                Ok(xml) => apply_manifest_metadata(&mut metadata, &xml),
                Err(e) => log::debug!("manifest {name} unreadable: {e}"),
            }
        }

        metadata
    }
}

/// Pull title/creator/subject/description out of the package manifest.
fn apply_manifest_metadata(metadata: &mut Metadata, xml: &[u8]) {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut current: Option<&'static str> = None;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                current = match e.local_name().as_ref() {
                    b"title" => Some("title"),
                    b"creator" => Some("creator"),
                    b"subject" => Some("subject"),
                    b"description" => Some("description"),
                    _ => None,
                };
                value.clear();
            }
            Ok(Event::Text(t)) => {
                if current.is_some() {
                    value.push_str(&decode_text(&t));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current.is_some() {
                    if let Some(resolved) = resolve_entity(&e) {
                        value.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let Some(field) = current.take() {
                    if !value.trim().is_empty() {
                        let text = Some(value.trim().to_string());
                        match field {
                            "title" => metadata.title = text,
                            "creator" => metadata.author = text,
                            "subject" => metadata.subject = text,
                            _ => metadata.keywords = text,
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::debug!("manifest XML unreadable: {e}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }
}

/// Parse one `section{n}.xml` body part.
fn parse_section_xml(xml: &[u8], index: u32) -> Result<Section> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut section = Section::new(index);
    let mut para_stack: Vec<Paragraph> = Vec::new();
    let mut table_stack: Vec<Table> = Vec::new();
    let mut row_stack: Vec<TableRow> = Vec::new();
    let mut cell_stack: Vec<TableCell> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => para_stack.push(Paragraph::new()),
                b"t" => in_text = true,
                b"tbl" => table_stack.push(Table::new()),
                b"tr" => row_stack.push(TableRow::new(Vec::new())),
                b"tc" => cell_stack.push(TableCell::empty()),
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"lineBreak" {
                    if let Some(p) = para_stack.last_mut() {
                        p.add_line_break();
                    }
                }
            }
            Event::Text(t) => {
                if in_text {
                    let text = decode_text(&t);
                    if !text.is_empty() {
                        if let Some(p) = para_stack.last_mut() {
                            p.add_text(text.into_owned());
                        }
                    }
                }
            }
            Event::GeneralRef(e) => {
                if in_text {
                    if let Some(resolved) = resolve_entity(&e) {
                        if let Some(p) = para_stack.last_mut() {
                            p.add_text(resolved);
                        }
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(p) = para_stack.pop() {
                        match cell_stack.last_mut() {
                            Some(cell) => cell.content.push(p),
                            None => {
                                if !p.is_empty() {
                                    section.add_paragraph(p);
                                }
                            }
                        }
                    }
                }
                b"t" => in_text = false,
                b"tc" => {
                    if let (Some(cell), Some(row)) = (cell_stack.pop(), row_stack.last_mut()) {
                        row.cells.push(cell);
                    }
                }
                b"tr" => {
                    if let (Some(row), Some(table)) = (row_stack.pop(), table_stack.last_mut()) {
                        table.add_row(row);
                    }
                }
                b"tbl" => {
                    if let Some(table) = table_stack.pop() {
                        match cell_stack.last_mut() {
                            // nested tables are flattened to their text content
                            Some(cell) => {
                                cell.content.push(Paragraph::with_text(table.plain_text()))
                            }
                            None => section.add_table(table),
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(section)
}

/// Unescape XML text, falling back to the raw bytes on bad escapes.
fn decode_text<'a>(t: &'a quick_xml::events::BytesText<'a>) -> Cow<'a, str> {
    match t.xml_content() {
        Ok(text) => text,
        Err(_) => Cow::Owned(String::from_utf8_lossy(t).into_owned()),
    }
}

/// Resolve a general entity reference: the predefined XML entities plus
/// numeric character references.
fn resolve_entity(name: &[u8]) -> Option<String> {
    match name {
        b"lt" => Some("<".to_string()),
        b"gt" => Some(">".to_string()),
        b"amp" => Some("&".to_string()),
        b"apos" => Some("'".to_string()),
        b"quot" => Some("\"".to_string()),
        _ => {
            let s = std::str::from_utf8(name).ok()?;
            let code = if let Some(hex) = s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = s.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code).map(|c| c.to_string())
        }
    }
}
