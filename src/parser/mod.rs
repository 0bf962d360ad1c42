//! Binary HWP parsing module.
//!
//! The pipeline stages live here: stream decompression, record decoding,
//! DocInfo tables, section building, and normalization, wired together by
//! [`HwpParser`].

mod body;
mod decompress;
mod doc_info;
mod file_header;
mod hwp_parser;
mod normalize;
mod options;
pub mod record;

pub use body::build_section;
pub use decompress::decompress_stream;
pub use doc_info::{CharShape, DocInfo, HeadingKind, ParaShape};
pub use file_header::{FileHeader, HwpVersion};
pub use hwp_parser::HwpParser;
pub use normalize::normalize;
pub use options::{ErrorMode, ExtractMode, ParseOptions};
pub use record::{Record, RecordCursor};
