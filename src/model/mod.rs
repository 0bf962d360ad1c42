//! Document model types for HWP content representation.
//!
//! This module defines the intermediate representation (IR) that bridges
//! HWP/HWPX parsing and content rendering. The model is format-agnostic:
//! once built and normalized it carries no references back into the source
//! container or the DocInfo tables.

mod document;
mod paragraph;
mod section;
mod table;

pub use document::{Document, Metadata};
pub use paragraph::{
    Alignment, InlineContent, ListInfo, ListStyle, NumberStyle, Paragraph, ParagraphStyle, TextRun,
    TextStyle,
};
pub use section::{Block, Section};
pub use table::{Table, TableCell, TableRow, VerticalAlignment};
