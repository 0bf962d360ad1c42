//! Binary HWP document parser.
//!
//! Runs the sequential pipeline: container → decompress → records → model →
//! normalize. Every stage either hands a complete artifact to the next one
//! or fails the document; there are no partial results between stages.

use std::io::Read;
use std::path::Path;

use crate::cfb::{property_set, CompoundFile};
use crate::detect::{detect_format_from_bytes, HwpKind};
use crate::error::{Error, Result};
use crate::model::{Block, Document, Metadata, Section};

use super::body::build_section;
use super::decompress::decompress_stream;
use super::doc_info::DocInfo;
use super::file_header::FileHeader;
use super::normalize::normalize;
use super::options::{ErrorMode, ExtractMode, ParseOptions};

/// Stream name of the file header.
const FILE_HEADER_STREAM: &str = "FileHeader";

/// Stream name of the formatting tables.
const DOC_INFO_STREAM: &str = "DocInfo";

/// Stream name of the summary information property set.
const SUMMARY_STREAM: &str = "\u{5}HwpSummaryInformation";

/// Binary HWP document parser.
pub struct HwpParser {
    container: CompoundFile,
    header: FileHeader,
    options: ParseOptions,
}

impl HwpParser {
    /// Open an HWP file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open an HWP file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse an HWP document from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse an HWP document from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let format = detect_format_from_bytes(data)?;
        if format.kind != HwpKind::Binary {
            return Err(Error::UnknownFormat);
        }

        let container = CompoundFile::open(data.to_vec())?;

        let header_stream = container.read_stream(FILE_HEADER_STREAM)?;
        let header = FileHeader::parse(&header_stream)?;
        header.ensure_supported()?;
        if header.password || header.distribution {
            return Err(Error::Encrypted);
        }

        Ok(Self {
            container,
            header,
            options,
        })
    }

    /// Parse an HWP document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse an HWP document from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// The parsed file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Parse the document and return a normalized model.
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new();
        document.metadata = self.extract_metadata();

        let doc_info = self.parse_doc_info()?;

        let mut index = 0u32;
        loop {
            let stream = format!("BodyText/Section{index}");
            if !self.container.exists(&stream) {
                break;
            }
            match self.parse_section(&stream, index) {
                Ok(section) => document.add_section(section),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("skipping section {index}: {e}");
                    document.add_section(Section::new(index));
                }
            }
            index += 1;
        }
        document.metadata.section_count = document.section_count();

        normalize(&mut document, &doc_info);

        if self.options.extract_mode == ExtractMode::TextOnly {
            for section in &mut document.sections {
                section.blocks.retain(|b| !matches!(b, Block::Opaque { .. }));
            }
        }

        Ok(document)
    }

    /// Build the DocInfo formatting tables.
    fn parse_doc_info(&self) -> Result<DocInfo> {
        let raw = self.container.read_stream(DOC_INFO_STREAM)?;
        let data = decompress_stream(DOC_INFO_STREAM, &raw, self.header.compressed)?;
        DocInfo::from_stream(&data)
    }

    /// Parse one body section stream.
    fn parse_section(&self, stream: &str, index: u32) -> Result<Section> {
        let raw = self.container.read_stream(stream)?;
        let data = decompress_stream(stream, &raw, self.header.compressed)?;
        build_section(&data, stream, index)
    }

    /// Extract document metadata. Summary-information failures are logged
    /// and never fail the parse.
    fn extract_metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.header.version.to_string());
        metadata.compressed = self.header.compressed;
        metadata.encrypted = self.header.password;

        if self.options.extract_metadata {
            match self.container.read_stream(SUMMARY_STREAM) {
                Ok(stream) => {
                    if let Err(e) = property_set::apply_summary_info(&mut metadata, &stream) {
                        log::debug!("summary information unreadable: {e}");
                    }
                }
                Err(_) => log::debug!("no summary information stream"),
            }
        }

        metadata
    }
}
