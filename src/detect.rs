//! HWP container format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Container flavor of an HWP document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwpKind {
    /// Binary HWP 5.x inside an OLE compound file
    Binary,
    /// HWPX (OWPML) inside a zip package
    Hwpx,
}

/// Detected HWP format information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwpFormat {
    /// Which container flavor the bytes carry
    pub kind: HwpKind,
}

impl std::fmt::Display for HwpFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            HwpKind::Binary => write!(f, "HWP (binary)"),
            HwpKind::Hwpx => write!(f, "HWPX"),
        }
    }
}

/// OLE compound-file magic bytes.
const CFB_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Zip local-file-header magic bytes (HWPX packages).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the HWP container format from a file path.
///
/// # Arguments
/// * `path` - Path to the document
///
/// # Returns
/// * `Ok(HwpFormat)` if the file starts with a known container signature
/// * `Err(Error::UnknownFormat)` otherwise
///
/// # Example
/// ```no_run
/// use unhwp::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("document.hwp").unwrap();
/// println!("format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<HwpFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the HWP container format from bytes.
///
/// # Arguments
/// * `data` - Byte slice containing at least the first 8 bytes of the file
///
/// # Returns
/// * `Ok(HwpFormat)` for an OLE compound file or a zip package
/// * `Err(Error::UnknownFormat)` for anything else
pub fn detect_format_from_bytes(data: &[u8]) -> Result<HwpFormat> {
    if data.starts_with(CFB_MAGIC) {
        return Ok(HwpFormat {
            kind: HwpKind::Binary,
        });
    }
    if data.starts_with(ZIP_MAGIC) {
        return Ok(HwpFormat { kind: HwpKind::Hwpx });
    }
    Err(Error::UnknownFormat)
}

/// Check if a file is a recognized HWP/HWPX container.
pub fn is_hwp<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start with a recognized HWP/HWPX container signature.
pub fn is_hwp_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
