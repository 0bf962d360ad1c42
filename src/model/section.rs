//! Section-level types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A single body section of the document.
///
/// Binary HWP stores one `BodyText/Section{n}` stream per section; HWPX
/// stores one `Contents/section{n}.xml`. An empty stream yields an empty
/// section rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section index (0-indexed, file order)
    pub index: u32,

    /// Content blocks in the section
    pub blocks: Vec<Block>,
}

impl Section {
    /// Create a new empty section.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            blocks: Vec::new(),
        }
    }

    /// Add a block to the section.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Add a paragraph to the section.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Add a table to the section.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Get plain text content of the section.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(p.plain_text()),
                Block::Table(t) => Some(t.plain_text()),
                Block::Opaque { .. } => None,
            })
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the section has no content blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of blocks in the section.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// A content block within a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// A record whose tag id the builder does not interpret.
    ///
    /// The raw payload is preserved so no information is silently dropped;
    /// renderers skip these.
    Opaque {
        /// Record tag id as stored in the stream
        tag_id: u16,
        /// Raw record payload
        data: Vec<u8>,
    },
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Check if this block is an uninterpreted record.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Block::Opaque { .. })
    }
}
