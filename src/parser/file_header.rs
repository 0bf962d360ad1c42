//! FileHeader stream parsing.

use crate::error::{Error, Result};

/// Signature at the start of the FileHeader stream.
const SIGNATURE: &[u8] = b"HWP Document File";

/// Size of the FileHeader stream.
const HEADER_STREAM_SIZE: usize = 256;

/// Binary sub-version, stored major.minor.build.revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwpVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub revision: u8,
}

impl std::fmt::Display for HwpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Parsed FileHeader stream contents.
#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
    /// Declared binary sub-version
    pub version: HwpVersion,
    /// Body streams are deflate-compressed
    pub compressed: bool,
    /// Document is password-protected
    pub password: bool,
    /// Document is a distribution (view-only) document
    pub distribution: bool,
}

impl FileHeader {
    /// Parse the 256-byte FileHeader stream.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_STREAM_SIZE {
            return Err(Error::InvalidContainer(format!(
                "FileHeader stream is {} bytes, expected {}",
                data.len(),
                HEADER_STREAM_SIZE
            )));
        }
        if !data.starts_with(SIGNATURE) {
            return Err(Error::InvalidContainer(
                "FileHeader signature mismatch".to_string(),
            ));
        }

        // version dword: revision, build, minor, major (little-endian)
        let version = HwpVersion {
            revision: data[32],
            build: data[33],
            minor: data[34],
            major: data[35],
        };

        let properties = u32::from_le_bytes([data[36], data[37], data[38], data[39]]);

        Ok(Self {
            version,
            compressed: properties & 0x1 != 0,
            password: properties & 0x2 != 0,
            distribution: properties & 0x4 != 0,
        })
    }

    /// Reject sub-versions outside the supported 5.x range.
    ///
    /// Called before any record decoding so unsupported files fail fast.
    pub fn ensure_supported(&self) -> Result<()> {
        if self.version.major != 5 {
            return Err(Error::UnsupportedVersion(self.version.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_header(major: u8, properties: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_STREAM_SIZE];
        data[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
        data[32] = 0; // revision
        data[33] = 3; // build
        data[34] = 0; // minor
        data[35] = major;
        data[36..40].copy_from_slice(&properties.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_header() {
        let header = FileHeader::parse(&build_header(5, 0b001)).unwrap();
        assert_eq!(header.version.to_string(), "5.0.3.0");
        assert!(header.compressed);
        assert!(!header.password);
        assert!(!header.distribution);
        assert!(header.ensure_supported().is_ok());
    }

    #[test]
    fn test_flags() {
        let header = FileHeader::parse(&build_header(5, 0b110)).unwrap();
        assert!(!header.compressed);
        assert!(header.password);
        assert!(header.distribution);
    }

    #[test]
    fn test_unsupported_version() {
        let header = FileHeader::parse(&build_header(3, 0)).unwrap();
        let err = header.ensure_supported().unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(v) if v == "3.0.3.0"));
    }

    #[test]
    fn test_bad_signature() {
        let mut data = build_header(5, 0);
        data[0] = b'X';
        assert!(matches!(
            FileHeader::parse(&data),
            Err(Error::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_short_stream() {
        assert!(matches!(
            FileHeader::parse(&[0u8; 64]),
            Err(Error::InvalidContainer(_))
        ));
    }
}
