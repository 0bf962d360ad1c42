//! # unhwp
//!
//! HWP/HWPX content extraction library for Rust.
//!
//! This library parses HWP (binary) and HWPX (zip/XML) word-processor
//! documents into a structured model and converts it to Markdown, plain
//! text, and JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unhwp::{parse_file, render};
//!
//! fn main() -> unhwp::Result<()> {
//!     // Parse an HWP file
//!     let doc = parse_file("document.hwp")?;
//!
//!     // Convert to Markdown
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&doc, &options)?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Both container flavors**: binary HWP 5.x compound files and HWPX
//!   zip packages
//! - **Structure preservation**: headings, paragraphs, tables, lists,
//!   character formatting
//! - **Multiple output formats**: Markdown, plain text, JSON
//! - **Forward compatible**: unknown record tags are preserved, never
//!   errors

pub mod cfb;
pub mod detect;
pub mod error;
pub mod hwpx;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use cfb::CompoundFile;
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_hwp, HwpFormat, HwpKind};
pub use error::{Error, Result};
pub use hwpx::HwpxParser;
pub use model::{
    Alignment, Block, Document, InlineContent, ListInfo, Metadata, Paragraph, ParagraphStyle,
    Section, Table, TableCell, TableRow, TextRun, TextStyle,
};
pub use parser::{ErrorMode, ExtractMode, HwpParser, ParseOptions};
pub use render::{JsonFormat, RenderOptions, TableFallback};

use std::io::Read;
use std::path::Path;

/// Parse an HWP or HWPX file and return a structured document.
///
/// The container flavor is detected from the leading magic bytes.
///
/// # Example
///
/// ```no_run
/// use unhwp::parse_file;
///
/// let doc = parse_file("document.hwp").unwrap();
/// println!("Sections: {}", doc.section_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Parse an HWP or HWPX file with custom options.
///
/// # Example
///
/// ```no_run
/// use unhwp::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().text_only();
/// let doc = parse_file_with_options("document.hwp", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let data = std::fs::read(path)?;
    parse_bytes_with_options(&data, options)
}

/// Parse a document from bytes.
///
/// # Example
///
/// ```no_run
/// use unhwp::parse_bytes;
///
/// let data = std::fs::read("document.hwp").unwrap();
/// let doc = parse_bytes(&data).unwrap();
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    parse_bytes_with_options(data, ParseOptions::default())
}

/// Parse a document from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    match detect_format_from_bytes(data)?.kind {
        HwpKind::Binary => HwpParser::from_bytes_with_options(data, options)?.parse(),
        HwpKind::Hwpx => HwpxParser::from_bytes(data)?.parse(),
    }
}

/// Parse a document from a reader.
///
/// # Example
///
/// ```no_run
/// use unhwp::parse_reader;
/// use std::fs::File;
///
/// let file = File::open("document.hwp").unwrap();
/// let doc = parse_reader(file).unwrap();
/// ```
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    parse_reader_with_options(reader, ParseOptions::default())
}

/// Parse a document from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Document> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    parse_bytes_with_options(&data, options)
}

/// Extract plain text from a document file.
///
/// # Example
///
/// ```no_run
/// use unhwp::extract_text;
///
/// let text = extract_text("document.hwp").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(doc.plain_text())
}

/// Convert a document to Markdown.
///
/// # Example
///
/// ```no_run
/// use unhwp::to_markdown;
///
/// let markdown = to_markdown("document.hwp").unwrap();
/// std::fs::write("output.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    let options = RenderOptions::default();
    render::to_markdown(&doc, &options)
}

/// Convert a document to Markdown with custom options.
///
/// # Example
///
/// ```no_run
/// use unhwp::{to_markdown_with_options, RenderOptions};
///
/// let options = RenderOptions::new().with_frontmatter(true);
/// let markdown = to_markdown_with_options("document.hwp", &options).unwrap();
/// ```
pub fn to_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_markdown(&doc, options)
}

/// Convert a document to JSON.
///
/// # Example
///
/// ```no_run
/// use unhwp::{to_json, JsonFormat};
///
/// let json = to_json("document.hwp", JsonFormat::Pretty).unwrap();
/// std::fs::write("output.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for parsing and converting HWP documents.
///
/// # Example
///
/// ```no_run
/// use unhwp::Unhwp;
///
/// let markdown = Unhwp::new()
///     .with_frontmatter()
///     .lenient()
///     .parse("document.hwp")?
///     .to_markdown()?;
/// # Ok::<(), unhwp::Error>(())
/// ```
pub struct Unhwp {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Unhwp {
    /// Create a new Unhwp builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Extract text content only (no opaque pass-through records).
    pub fn text_only(mut self) -> Self {
        self.parse_options = self.parse_options.text_only();
        self
    }

    /// Enable or disable summary-information metadata.
    pub fn with_metadata(mut self, extract: bool) -> Self {
        self.parse_options = self.parse_options.with_metadata(extract);
        self
    }

    /// Enable frontmatter in output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Set table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.render_options = self.render_options.with_table_fallback(fallback);
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.render_options = self.render_options.with_max_heading(level);
        self
    }

    /// Parse a document file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<UnhwpResult> {
        let document = parse_file_with_options(path, self.parse_options)?;
        Ok(UnhwpResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Parse a document from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<UnhwpResult> {
        let document = parse_bytes_with_options(data, self.parse_options)?;
        Ok(UnhwpResult {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Unhwp {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a document.
pub struct UnhwpResult {
    /// The parsed document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl UnhwpResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get plain text without rendering.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
