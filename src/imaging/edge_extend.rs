//! Deterministic edge-extend fallback.
//!
//! Fills a target canvas by replicating the outermost row/column of the
//! (cropped) original outward. Fully local, no network, no randomness:
//! identical input bytes and plan always produce identical output bytes.
//! This is the terminal fallback — the pipeline relies on it completing
//! whenever the input decodes at all.
//!
//! Crop-only plans take the same path; with zero padding the clamp-to-edge
//! sampling degenerates into a pure centered crop.

use super::analyze::{DecodeError, decode};
use super::geometry::TransformPlan;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Apply the plan's crop and padding to decoded pixels.
///
/// Every output pixel samples the kept region of the source, with
/// coordinates clamped to its edges — the border-replication fill.
fn remap(src: &RgbaImage, plan: &TransformPlan) -> RgbaImage {
    let h = &plan.horizontal;
    let v = &plan.vertical;

    RgbaImage::from_fn(plan.target.width, plan.target.height, |x, y| {
        let sx = x
            .saturating_sub(h.pad_before)
            .min(h.keep - 1)
            + h.offset;
        let sy = y
            .saturating_sub(v.pad_before)
            .min(v.keep - 1)
            + v.offset;
        *src.get_pixel(sx, sy)
    })
}

/// Execute a plan locally: decode, crop, replicate borders, re-encode.
///
/// Output is PNG so the intermediate stays lossless and byte-reproducible;
/// the normalizer owns the final output format. Fails only on malformed
/// input bytes.
pub fn extend(bytes: &[u8], plan: &TransformPlan) -> Result<Vec<u8>, DecodeError> {
    let src = decode(bytes)?.to_rgba8();
    let out = remap(&src, plan);

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(out)
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| DecodeError::Pixels(format!("PNG encode failed: {}", e)))?;
    Ok(buf.into_inner())
}
