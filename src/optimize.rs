//! Format/quality normalizer and the external compression backend.
//!
//! [`normalize`] re-encodes pipeline output to the requested format, then —
//! when a compression backend is configured — asks it to recompress at the
//! quality recommended by a fixed size-threshold table. A compression
//! failure is never a pipeline failure: the locally encoded bytes are
//! returned unchanged with the `compression_skipped` signal set.

use crate::imaging::encode::encode;
use crate::imaging::{DecodeError, EncodeError, OutputFormat, Quality, analyze};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Compression backend failure. Recoverable: the normalizer skips
/// compression instead of failing the run.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("compression request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("compression backend returned {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("malformed compression response: {0}")]
    MalformedResponse(String),
}

/// Local normalization failure (decode or encode). Fatal for the run.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Seam for the external compression/optimization service.
pub trait CompressionBackend {
    fn compress(
        &self,
        image: &[u8],
        filename: &str,
        quality: Quality,
        format: OutputFormat,
    ) -> impl Future<Output = Result<Vec<u8>, CompressionError>>;
}

/// Quality recommendation from the fixed threshold table.
///
/// | size | quality |
/// |---|---|
/// | < 100 KB | 95 |
/// | 100 KB – 500 KB | 85 |
/// | 500 KB – 2 MB | 75 |
/// | ≥ 2 MB | 65 |
pub fn recommended_quality(byte_len: usize) -> Quality {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    Quality(match byte_len {
        n if n < 100 * KB => 95,
        n if n < 500 * KB => 85,
        n if n < 2 * MB => 75,
        _ => 65,
    })
}

/// Normalizer output: final bytes plus the compression-skipped signal.
#[derive(Debug)]
pub struct Normalized {
    pub bytes: Vec<u8>,
    pub compression_skipped: bool,
}

/// Re-encode to the requested format, then recompress through the backend
/// when one is configured.
///
/// The `compression_skipped` flag is true only when a configured backend
/// failed; with no backend configured there was nothing to skip.
pub async fn normalize<C: CompressionBackend>(
    bytes: &[u8],
    format: OutputFormat,
    quality: Quality,
    filename: &str,
    compression: Option<&C>,
) -> Result<Normalized, NormalizeError> {
    let img = analyze::decode(bytes)?;
    let encoded = encode(&img, format, quality)?;

    let Some(backend) = compression else {
        return Ok(Normalized {
            bytes: encoded,
            compression_skipped: false,
        });
    };

    let recommendation = recommended_quality(encoded.len());
    debug!(
        size = encoded.len(),
        recommended = recommendation.value(),
        "consulting compression backend"
    );

    match backend
        .compress(&encoded, filename, recommendation, format)
        .await
    {
        Ok(optimized) => Ok(Normalized {
            bytes: optimized,
            compression_skipped: false,
        }),
        Err(e) => {
            warn!(error = %e, "compression backend failed, keeping uncompressed result");
            Ok(Normalized {
                bytes: encoded,
                compression_skipped: true,
            })
        }
    }
}

#[derive(Serialize)]
struct CompressionRequest<'a> {
    image: &'a str,
    filename: &'a str,
    quality: u32,
    format: OutputFormat,
}

#[derive(Deserialize)]
struct CompressionResponse {
    image: String,
}

/// HTTP client for the compression/optimization endpoint.
pub struct HttpCompressionClient {
    inner: Client,
    endpoint: String,
}

impl HttpCompressionClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, CompressionError> {
        let inner = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CompressionError::Request)?;
        Ok(Self {
            inner,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl CompressionBackend for HttpCompressionClient {
    async fn compress(
        &self,
        image: &[u8],
        filename: &str,
        quality: Quality,
        format: OutputFormat,
    ) -> Result<Vec<u8>, CompressionError> {
        let body = CompressionRequest {
            image: &BASE64.encode(image),
            filename,
            quality: quality.value(),
            format,
        };

        let response = self.inner.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(CompressionError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let payload: CompressionResponse = response
            .json()
            .await
            .map_err(|e| CompressionError::MalformedResponse(e.to_string()))?;

        BASE64
            .decode(&payload.image)
            .map_err(|e| CompressionError::MalformedResponse(format!("invalid base64 image: {e}")))
    }
}
