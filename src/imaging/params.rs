//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between callers (CLI, HTTP glue) and the pipeline, and they
//! validate on construction so invalid requests are rejected before any
//! decoding work happens.
//!
//! ## Types
//!
//! - [`Dimensions`] — a pixel extent; both axes must be positive.
//! - [`Quality`] — lossy encoding quality (1–100). Out-of-range values are
//!   rejected, not clamped.
//! - [`OutputFormat`] — the four supported output encodings.
//! - [`ExtensionStrategy`] — which extension path the caller wants.
//! - [`ProcessingOptions`] — the full specification for one pipeline run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejected request parameters. Surfaced immediately; no processing is
/// attempted for a request that fails validation.
#[derive(Error, Debug)]
pub enum ParamError {
    #[error("quality must be between 1 and 100, got {0}")]
    QualityOutOfRange(u32),
    #[error("target dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("unknown output format \"{0}\" (expected jpeg, png, webp, or svg)")]
    UnknownFormat(String),
    #[error("unknown extension strategy \"{0}\" (expected ai or edge-extend)")]
    UnknownStrategy(String),
}

/// A pixel extent (width × height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Validated constructor — both axes must be positive.
    pub fn new(width: u32, height: u32) -> Result<Self, ParamError> {
        if width == 0 || height == 0 {
            return Err(ParamError::EmptyDimensions { width, height });
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Quality setting for lossy image encoding (1–100).
///
/// Construction rejects out-of-range values rather than clamping them, so a
/// caller asking for quality 0 or 250 gets an error instead of a silently
/// different encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quality(pub(crate) u32);

impl Quality {
    pub fn new(value: u32) -> Result<Self, ParamError> {
        if !(1..=100).contains(&value) {
            return Err(ParamError::QualityOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl TryFrom<u32> for Quality {
    type Error = ParamError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(q: Quality) -> u32 {
        q.0
    }
}

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Svg => "svg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Svg => "svg",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::WebP),
            "svg" => Ok(Self::Svg),
            other => Err(ParamError::UnknownFormat(other.to_string())),
        }
    }
}

/// Which extension path the caller wants when the target canvas grows.
///
/// The selector may override this: when the target fits inside the original
/// on both axes, the plan is crop-only regardless of the requested strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionStrategy {
    Ai,
    EdgeExtend,
}

impl FromStr for ExtensionStrategy {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ai" => Ok(Self::Ai),
            "edge-extend" | "edge" => Ok(Self::EdgeExtend),
            other => Err(ParamError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Full specification for one pipeline run. One `ProcessingOptions` governs
/// exactly one output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingOptions {
    pub target: Dimensions,
    pub quality: Quality,
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_rejects_out_of_range() {
        assert!(matches!(
            Quality::new(0),
            Err(ParamError::QualityOutOfRange(0))
        ));
        assert!(matches!(
            Quality::new(101),
            Err(ParamError::QualityOutOfRange(101))
        ));
        assert_eq!(Quality::new(1).unwrap().value(), 1);
        assert_eq!(Quality::new(100).unwrap().value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn dimensions_reject_zero_axes() {
        assert!(Dimensions::new(0, 600).is_err());
        assert!(Dimensions::new(800, 0).is_err());
        assert!(Dimensions::new(800, 600).is_ok());
    }

    #[test]
    fn format_parses_aliases() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);
        assert!("tiff".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn strategy_parses_kebab_case() {
        assert_eq!(
            "edge-extend".parse::<ExtensionStrategy>().unwrap(),
            ExtensionStrategy::EdgeExtend
        );
        assert_eq!(
            "ai".parse::<ExtensionStrategy>().unwrap(),
            ExtensionStrategy::Ai
        );
        assert!("gan".parse::<ExtensionStrategy>().is_err());
    }

    #[test]
    fn quality_serde_rejects_invalid() {
        let q: Quality = serde_json::from_str("85").unwrap();
        assert_eq!(q.value(), 85);
        assert!(serde_json::from_str::<Quality>("0").is_err());
    }
}
