//! Dimension analyzer — reads dimensions and format from an image buffer.
//!
//! [`analyze`] only parses header metadata; no pixel data is decoded. It is
//! the leaf dependency of every other pipeline component and the first thing
//! a pipeline run does after the size ceiling check.

use super::params::Dimensions;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

/// Malformed or unsupported image bytes. Fatal: there is no fallback path
/// for input the decoders cannot read.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unrecognized image format: {0}")]
    UnknownFormat(String),
    #[error("failed to read image header: {0}")]
    Header(String),
    #[error("failed to decode image: {0}")]
    Pixels(String),
}

/// What the analyzer learned from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub dimensions: Dimensions,
    pub format: ImageFormat,
}

/// Read dimensions and format from a buffer without decoding pixel data.
///
/// Supports every decoder compiled into the `image` crate — at minimum JPEG,
/// PNG, and WebP. No side effects.
pub fn analyze(bytes: &[u8]) -> Result<Probe, DecodeError> {
    let format =
        image::guess_format(bytes).map_err(|e| DecodeError::UnknownFormat(e.to_string()))?;

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::UnknownFormat(e.to_string()))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::Header(e.to_string()))?;

    Ok(Probe {
        // Decoders never report a zero axis for a well-formed header.
        dimensions: Dimensions { width, height },
        format,
    })
}

/// Fully decode a buffer. Shared by the local transform paths.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    image::load_from_memory(bytes).map_err(|e| DecodeError::Pixels(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::test_fixtures::{png_bytes, solid_jpeg};

    #[test]
    fn analyze_reads_jpeg_dimensions() {
        let bytes = solid_jpeg(200, 150);
        let probe = analyze(&bytes).unwrap();
        assert_eq!(probe.dimensions, Dimensions::new(200, 150).unwrap());
        assert_eq!(probe.format, ImageFormat::Jpeg);
    }

    #[test]
    fn analyze_reads_png_dimensions() {
        let bytes = png_bytes(64, 48);
        let probe = analyze(&bytes).unwrap();
        assert_eq!(probe.dimensions.width, 64);
        assert_eq!(probe.dimensions.height, 48);
        assert_eq!(probe.format, ImageFormat::Png);
    }

    #[test]
    fn analyze_rejects_garbage() {
        let result = analyze(b"definitely not an image");
        assert!(matches!(result, Err(DecodeError::UnknownFormat(_))));
    }

    #[test]
    fn analyze_rejects_truncated_header() {
        // Valid PNG magic but nothing after it
        let result = analyze(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
        assert!(result.is_err());
    }

    #[test]
    fn decode_roundtrips_dimensions() {
        let bytes = png_bytes(30, 20);
        let img = decode(&bytes).unwrap();
        assert_eq!(img.width(), 30);
        assert_eq!(img.height(), 20);
    }
}
