//! DocInfo stream parsing.
//!
//! The DocInfo stream carries the document-global formatting tables that
//! body content references by id. Shape records appear in file order and
//! their position in that order is the id body runs refer to. The tables
//! are built once per document, read by the normalizer, and droppable
//! afterwards — resolved attributes are copied into the tree.

use crate::error::Result;
use crate::model::{Alignment, TextStyle};
use crate::parser::record::{RecordCursor, HWPTAG_CHAR_SHAPE, HWPTAG_PARA_SHAPE};

/// A character shape definition (tag 21).
#[derive(Debug, Clone, PartialEq)]
pub struct CharShape {
    /// Base font size in points
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    pub subscript: bool,
    /// Text color as "#RRGGBB", if not default black
    pub color: Option<String>,
}

impl Default for CharShape {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            superscript: false,
            subscript: false,
            color: None,
        }
    }
}

impl CharShape {
    /// Parse a character shape record payload.
    ///
    /// Layout: 7 u16 face ids, 7x4 per-language metric bytes, then i32 base
    /// size (1/100 pt), u32 property bits, shadow gap, and color words.
    fn parse(payload: &[u8]) -> Self {
        let mut shape = CharShape::default();

        if payload.len() >= 46 {
            let base_size = i32::from_le_bytes([
                payload[42],
                payload[43],
                payload[44],
                payload[45],
            ]);
            if base_size > 0 {
                shape.font_size = base_size as f32 / 100.0;
            }
        }

        if payload.len() >= 50 {
            let property = u32::from_le_bytes([
                payload[46],
                payload[47],
                payload[48],
                payload[49],
            ]);
            shape.italic = property & 0x1 != 0;
            shape.bold = property & 0x2 != 0;
            shape.underline = (property >> 2) & 0x3 != 0;
            shape.superscript = (property >> 15) & 0x1 != 0;
            shape.subscript = (property >> 16) & 0x1 != 0;
            shape.strikethrough = (property >> 18) & 0x7 != 0;
        } else {
            log::debug!("char shape record is {} bytes, using defaults", payload.len());
        }

        if payload.len() >= 56 {
            // COLORREF: 0x00BBGGRR
            let colorref = u32::from_le_bytes([
                payload[52],
                payload[53],
                payload[54],
                payload[55],
            ]);
            if colorref & 0x00FF_FFFF != 0 {
                let r = colorref & 0xFF;
                let g = (colorref >> 8) & 0xFF;
                let b = (colorref >> 16) & 0xFF;
                shape.color = Some(format!("#{r:02X}{g:02X}{b:02X}"));
            }
        }

        shape
    }

    /// Copy this shape into a self-contained run style.
    pub fn to_text_style(&self) -> TextStyle {
        TextStyle {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            strikethrough: self.strikethrough,
            superscript: self.superscript,
            subscript: self.subscript,
            font_size: Some(self.font_size),
            color: self.color.clone(),
        }
    }
}

/// Paragraph numbering kind carried by a paragraph shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeadingKind {
    #[default]
    None,
    /// Outline-numbered paragraph; maps to a Markdown heading
    Outline,
    /// Numbered list paragraph
    Number,
    /// Bulleted list paragraph
    Bullet,
}

/// A paragraph shape definition (tag 25).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParaShape {
    pub alignment: Alignment,
    pub heading: HeadingKind,
    /// Outline/list depth, 0-based
    pub heading_level: u8,
}

impl ParaShape {
    /// Parse a paragraph shape record payload (first property word).
    fn parse(payload: &[u8]) -> Self {
        if payload.len() < 4 {
            log::debug!("para shape record is {} bytes, using defaults", payload.len());
            return ParaShape::default();
        }

        let property = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);

        let alignment = match (property >> 2) & 0x7 {
            1 => Alignment::Left,
            2 => Alignment::Right,
            3 => Alignment::Center,
            _ => Alignment::Justify,
        };

        let heading = match (property >> 23) & 0x3 {
            1 => HeadingKind::Outline,
            2 => HeadingKind::Number,
            3 => HeadingKind::Bullet,
            _ => HeadingKind::None,
        };

        ParaShape {
            alignment,
            heading,
            heading_level: ((property >> 25) & 0x7) as u8,
        }
    }
}

/// The document-global formatting tables.
#[derive(Debug, Clone, Default)]
pub struct DocInfo {
    char_shapes: Vec<CharShape>,
    para_shapes: Vec<ParaShape>,
}

impl DocInfo {
    /// Build the tables from a decompressed DocInfo stream.
    ///
    /// Shape records are collected in file order; all other tags are
    /// ignored here. Record-level corruption (truncation) is fatal.
    pub fn from_stream(data: &[u8]) -> Result<Self> {
        let mut info = DocInfo::default();

        for record in RecordCursor::new(data, "DocInfo") {
            let record = record?;
            match record.tag_id {
                HWPTAG_CHAR_SHAPE => info.char_shapes.push(CharShape::parse(record.payload)),
                HWPTAG_PARA_SHAPE => info.para_shapes.push(ParaShape::parse(record.payload)),
                _ => {}
            }
        }

        log::debug!(
            "DocInfo: {} char shapes, {} para shapes",
            info.char_shapes.len(),
            info.para_shapes.len()
        );
        Ok(info)
    }

    /// Look up a character shape by id.
    pub fn char_shape(&self, id: u32) -> Option<&CharShape> {
        self.char_shapes.get(id as usize)
    }

    /// Look up a paragraph shape by id.
    pub fn para_shape(&self, id: u32) -> Option<&ParaShape> {
        self.para_shapes.get(id as usize)
    }

    /// Number of character shapes in the table.
    pub fn char_shape_count(&self) -> usize {
        self.char_shapes.len()
    }

    /// Number of paragraph shapes in the table.
    pub fn para_shape_count(&self) -> usize {
        self.para_shapes.len()
    }
}
