//! AI outpainting client.
//!
//! [`OutpaintBackend`] is the seam between the pipeline and the generative
//! image service; [`HttpOutpaintClient`] is the production implementation.
//! The client is pure request/response — no local state, no retries. Retry
//! and fallback policy belongs to the orchestrator, which must always have
//! the edge-extend path ready when a call here fails.

use crate::imaging::TransformPlan;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Generative backend failure. Every variant is recoverable at the
/// orchestrator level via the edge-extend fallback.
#[derive(Error, Debug)]
pub enum OutpaintError {
    #[error("outpainting request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("outpainting backend returned {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("malformed outpainting response: {0}")]
    MalformedResponse(String),
    #[error("outpainting client misconfigured: {0}")]
    Config(String),
}

/// Seam for the generative image backend.
pub trait OutpaintBackend {
    /// Send image bytes plus canvas geometry; receive the extended image.
    fn extend(
        &self,
        image: &[u8],
        plan: &TransformPlan,
    ) -> impl Future<Output = Result<Vec<u8>, OutpaintError>>;
}

/// Wire request: base64 payload plus the canvas geometry the backend fills.
#[derive(Serialize)]
struct OutpaintRequest<'a> {
    image: &'a str,
    target_width: u32,
    target_height: u32,
    pad_left: u32,
    pad_right: u32,
    pad_top: u32,
    pad_bottom: u32,
}

#[derive(Deserialize)]
struct OutpaintResponse {
    image: String,
}

/// HTTP client for the generative endpoint.
///
/// The API key is injected configuration with no default: construction fails
/// without one rather than falling back to a baked-in credential.
pub struct HttpOutpaintClient {
    inner: Client,
    endpoint: String,
}

impl HttpOutpaintClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, OutpaintError> {
        if api_key.is_empty() {
            return Err(OutpaintError::Config("API key must not be empty".into()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| OutpaintError::Config("API key contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);

        let inner = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(OutpaintError::Request)?;

        Ok(Self {
            inner,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl OutpaintBackend for HttpOutpaintClient {
    async fn extend(&self, image: &[u8], plan: &TransformPlan) -> Result<Vec<u8>, OutpaintError> {
        let body = OutpaintRequest {
            image: &BASE64.encode(image),
            target_width: plan.target.width,
            target_height: plan.target.height,
            pad_left: plan.horizontal.pad_before,
            pad_right: plan.horizontal.pad_after,
            pad_top: plan.vertical.pad_before,
            pad_bottom: plan.vertical.pad_after,
        };

        debug!(
            endpoint = %self.endpoint,
            target = %plan.target,
            "requesting outpaint"
        );

        let response = self.inner.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            warn!(status = status.as_u16(), "outpainting backend rejected request");
            return Err(OutpaintError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let payload: OutpaintResponse = response
            .json()
            .await
            .map_err(|e| OutpaintError::MalformedResponse(e.to_string()))?;

        BASE64
            .decode(&payload.image)
            .map_err(|e| OutpaintError::MalformedResponse(format!("invalid base64 image: {e}")))
    }
}
