//! Decompression for compressed signature bodies and gzip containers

use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use log::debug;

use super::error::{FlirtError, Result};

/// Inflate a compressed signature body.
///
/// Versions 5 and 6 store a raw DEFLATE stream; version 7 and later wrap
/// it in a zlib envelope.
pub fn inflate_body(compressed: &[u8], version: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let read = if version <= 6 {
        DeflateDecoder::new(compressed).read_to_end(&mut out)
    } else {
        ZlibDecoder::new(compressed).read_to_end(&mut out)
    };
    match read {
        Ok(_) if !out.is_empty() => {
            debug!("inflated body: {} -> {} bytes", compressed.len(), out.len());
            Ok(out)
        }
        _ => Err(FlirtError::Decompression),
    }
}

/// Decompress a gzip container (`.sig.gz`).
///
/// Returns an empty vector when the input lacks the gzip magic or the
/// stream is damaged; loaders probe with this before parsing.
pub fn decompress_gzip(data: &[u8]) -> Vec<u8> {
    if data.len() < 2 || data[0] != 0x1f || data[1] != 0x8b {
        return Vec::new();
    }
    let mut out = Vec::new();
    match GzDecoder::new(data).read_to_end(&mut out) {
        Ok(_) => out,
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn raw_deflate_for_v5_and_v6() {
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"signature body").unwrap();
        let compressed = enc.finish().unwrap();
        assert_eq!(inflate_body(&compressed, 5).unwrap(), b"signature body");
        assert_eq!(inflate_body(&compressed, 6).unwrap(), b"signature body");
    }

    #[test]
    fn zlib_wrapper_for_v7_and_later() {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"signature body").unwrap();
        let compressed = enc.finish().unwrap();
        assert_eq!(inflate_body(&compressed, 7).unwrap(), b"signature body");
        assert_eq!(inflate_body(&compressed, 10).unwrap(), b"signature body");
    }

    #[test]
    fn garbage_body_reports_decompression_failure() {
        assert_eq!(
            inflate_body(&[0x00, 0x01, 0x02], 7),
            Err(FlirtError::Decompression)
        );
    }

    #[test]
    fn gzip_helper_requires_magic_and_survives_damage() {
        assert!(decompress_gzip(b"not gzip").is_empty());
        assert!(decompress_gzip(&[]).is_empty());

        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"hello").unwrap();
        let gz = enc.finish().unwrap();
        assert_eq!(decompress_gzip(&gz), b"hello");

        // Valid magic, truncated stream.
        assert!(decompress_gzip(&gz[..gz.len() / 2]).is_empty());
    }
}
