//! Output encoders for the format/quality normalizer.
//!
//! ## Crate mapping
//!
//! | Format | Encoder |
//! |---|---|
//! | JPEG | `image::codecs::jpeg::JpegEncoder` (native quality knob) |
//! | PNG | `image` PNG encoder (lossless, quality ignored) |
//! | WebP | `image::codecs::webp::WebPEncoder` (pure Rust, lossless only) |
//! | SVG | raster wrapper: PNG payload embedded as a `data:` URI `<image>` |
//!
//! The pure-Rust WebP encoder has no lossy mode, so the quality knob only
//! affects WebP when the external compression backend recompresses the
//! result. SVG output for raster input is a dimension-preserving wrapper
//! document, the same shape browser-facing converters emit for this pairing.

use super::params::{OutputFormat, Quality};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("{format} encode failed: {message}")]
    Codec { format: OutputFormat, message: String },
}

fn codec_err(format: OutputFormat) -> impl FnOnce(image::ImageError) -> EncodeError {
    move |e| EncodeError::Codec {
        format,
        message: e.to_string(),
    }
}

/// Re-encode decoded pixels to the requested format at the requested quality.
pub fn encode(img: &DynamicImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            rgb.write_with_encoder(encoder)
                .map_err(codec_err(format))?;
        }
        OutputFormat::Png => {
            img.write_to(&mut buf, ImageFormat::Png)
                .map_err(codec_err(format))?;
        }
        OutputFormat::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut buf);
            img.write_with_encoder(encoder)
                .map_err(codec_err(format))?;
        }
        OutputFormat::Svg => {
            let mut png = Cursor::new(Vec::new());
            img.write_to(&mut png, ImageFormat::Png)
                .map_err(codec_err(format))?;
            let svg = wrap_svg(img.width(), img.height(), &png.into_inner());
            return Ok(svg.into_bytes());
        }
    }

    Ok(buf.into_inner())
}

/// Wrap PNG bytes in an SVG document at 1:1 pixel dimensions.
fn wrap_svg(width: u32, height: u32, png: &[u8]) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" "#,
            r#"width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<image width="{w}" height="{h}" href="data:image/png;base64,{data}"/>"#,
            "</svg>",
        ),
        w = width,
        h = height,
        data = BASE64.encode(png),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::analyze::analyze;
    use crate::imaging::test_fixtures::gradient_image;
    use image::ImageFormat;

    #[test]
    fn jpeg_preserves_dimensions() {
        let img = gradient_image(320, 240);
        let bytes = encode(&img, OutputFormat::Jpeg, Quality::default()).unwrap();
        let probe = analyze(&bytes).unwrap();
        assert_eq!(probe.format, ImageFormat::Jpeg);
        assert_eq!(probe.dimensions.width, 320);
        assert_eq!(probe.dimensions.height, 240);
    }

    #[test]
    fn png_preserves_dimensions() {
        let img = gradient_image(64, 64);
        let bytes = encode(&img, OutputFormat::Png, Quality::default()).unwrap();
        let probe = analyze(&bytes).unwrap();
        assert_eq!(probe.format, ImageFormat::Png);
        assert_eq!(probe.dimensions.width, 64);
    }

    #[test]
    fn webp_preserves_dimensions() {
        let img = gradient_image(50, 70);
        let bytes = encode(&img, OutputFormat::WebP, Quality::default()).unwrap();
        let probe = analyze(&bytes).unwrap();
        assert_eq!(probe.format, ImageFormat::WebP);
        assert_eq!(probe.dimensions.height, 70);
    }

    #[test]
    fn jpeg_quality_changes_size() {
        let img = gradient_image(200, 200);
        let high = encode(&img, OutputFormat::Jpeg, Quality::new(95).unwrap()).unwrap();
        let low = encode(&img, OutputFormat::Jpeg, Quality::new(20).unwrap()).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn svg_wraps_png_payload() {
        let img = gradient_image(10, 12);
        let bytes = encode(&img, OutputFormat::Svg, Quality::default()).unwrap();
        let doc = String::from_utf8(bytes).unwrap();
        assert!(doc.starts_with("<svg"));
        assert!(doc.contains(r#"width="10""#));
        assert!(doc.contains(r#"height="12""#));
        assert!(doc.contains("data:image/png;base64,"));
    }
}
