//! Response envelope convention for the surrounding transport layer.
//!
//! The core's own contract is [`ProcessedImage`](crate::pipeline::ProcessedImage)
//! and [`PipelineError`](crate::pipeline::PipelineError); this module only
//! preserves the `{success, data?, error?}` JSON shape and the 413/500 status
//! mapping that existing callers depend on.

use crate::pipeline::{ImageMetadata, PipelineError, ProcessedImage};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponsePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    /// Base64-encoded output image.
    pub image_data: String,
    pub metadata: ImageMetadata,
    pub filename: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback_used: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub compression_skipped: bool,
}

impl ResponseEnvelope {
    pub fn from_result(filename: &str, result: &ProcessedImage) -> Self {
        let output_name = format!("{filename}.{}", result.metadata.format.extension());
        Self {
            success: true,
            data: Some(ResponsePayload {
                image_data: BASE64.encode(&result.buffer),
                metadata: result.metadata.clone(),
                filename: output_name,
                fallback_used: result.fallback_used,
                compression_skipped: result.compression_skipped,
            }),
            error: None,
        }
    }

    pub fn from_error(error: &PipelineError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// HTTP-equivalent status for a pipeline failure: 413 for oversized input,
/// 500 for everything else.
pub fn status_code(error: &PipelineError) -> u16 {
    match error {
        PipelineError::PayloadTooLarge { .. } => 413,
        _ => 500,
    }
}
