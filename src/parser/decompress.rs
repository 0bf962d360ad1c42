//! Body-stream decompression.

use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::error::{Error, Result};

/// Decompress one body stream according to the document-level flag.
///
/// HWP stores compressed streams as raw deflate with no zlib wrapper. The
/// transform is applied uniformly: the FileHeader flag decides once for the
/// whole document, and this function is called with that decision for every
/// DocInfo/BodyText stream. Malformed compressed input is surfaced as
/// [`Error::Decompression`] and never retried.
pub fn decompress_stream(stream: &str, raw: &[u8], compressed: bool) -> Result<Vec<u8>> {
    if !compressed {
        return Ok(raw.to_vec());
    }

    let mut decoder = DeflateDecoder::new(raw);
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .map_err(|e| Error::Decompression {
            stream: stream.to_string(),
            reason: e.to_string(),
        })?;
    Ok(data)
}
