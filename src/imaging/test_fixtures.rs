//! Synthetic image fixtures shared by the unit tests.
//!
//! Fixtures are generated in-process so tests carry no binary assets.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// A gradient image with distinct pixel values across both axes.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    DynamicImage::ImageRgba8(img)
}

/// PNG-encoded gradient.
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient_image(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// PNG-encoded solid mid-gray image.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// JPEG-encoded gradient.
pub fn solid_jpeg(width: u32, height: u32) -> Vec<u8> {
    let rgb = gradient_image(width, height).to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new(&mut buf)
        .encode_image(&rgb)
        .unwrap();
    buf.into_inner()
}
