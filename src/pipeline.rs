//! Pipeline orchestrator.
//!
//! Sequences analyze → extend → optimize with two-level fallback:
//!
//! - AI path fails (unreachable, rejected, malformed, timed out) → the same
//!   plan is re-run through the deterministic edge-extend path and the result
//!   carries `fallback_used`.
//! - Compression backend fails → the locally encoded result is kept and the
//!   result carries `compression_skipped`.
//!
//! Only a decode failure — or the edge-extend fallback itself failing after
//! an AI failure, which means the input was never decodable — is fatal.
//!
//! Progress is reported through an observer callback at stage boundaries,
//! never stored as pipeline state. One request is one sequential pipeline;
//! batch runs fan out one independent pipeline per input.

use crate::imaging::{
    DecodeError, Dimensions, ExtensionStrategy, OutputFormat, ParamError, PlanKind,
    ProcessingOptions, Quality, TransformPlan, analyze, edge_extend, select_plan,
};
use crate::optimize::{CompressionBackend, NormalizeError, normalize};
use crate::outpaint::{OutpaintBackend, OutpaintError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Pipeline stage, reported to the progress observer at each boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyzing,
    Extending,
    Optimizing,
    Completed,
    Error,
}

impl Stage {
    /// Progress percentage at this boundary.
    pub fn percent(self) -> u8 {
        match self {
            Self::Analyzing => 10,
            Self::Extending => 45,
            Self::Optimizing => 80,
            Self::Completed | Self::Error => 100,
        }
    }
}

/// Observer invoked at stage boundaries with (stage, percent).
pub type ProgressObserver<'a> = &'a dyn Fn(Stage, u8);

fn report(progress: Option<ProgressObserver<'_>>, stage: Stage) {
    if let Some(f) = progress {
        f(stage, stage.percent());
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    InvalidParameter(#[from] ParamError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(
        "input is {size} bytes, exceeding the {limit}-byte ceiling; \
         reduce the file or upload it through blob storage instead of inline"
    )]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("outpainting failed ({outpaint}); edge-extend fallback also failed: {edge}")]
    FallbackExhausted {
        outpaint: OutpaintError,
        edge: DecodeError,
    },
}

/// Everything the pipeline needs for one run. The image buffer is borrowed;
/// the produced [`ProcessedImage`] owns its output buffer.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRequest<'a> {
    pub image: &'a [u8],
    pub filename: &'a str,
    pub options: ProcessingOptions,
    pub strategy: ExtensionStrategy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub size: usize,
}

/// Final pipeline output. Immutable after creation; ownership transfers to
/// the caller.
#[derive(Debug)]
pub struct ProcessedImage {
    pub buffer: Vec<u8>,
    pub metadata: ImageMetadata,
    /// The AI strategy was requested but the deterministic path produced
    /// this result.
    pub fallback_used: bool,
    /// A configured compression backend failed and was skipped.
    pub compression_skipped: bool,
}

/// Run the full reframing pipeline on one image.
pub async fn process<O: OutpaintBackend, C: CompressionBackend>(
    request: &ProcessRequest<'_>,
    outpaint: Option<&O>,
    compression: Option<&C>,
    max_input_bytes: usize,
    progress: Option<ProgressObserver<'_>>,
) -> Result<ProcessedImage, PipelineError> {
    match run(request, outpaint, compression, max_input_bytes, progress).await {
        Ok(result) => Ok(result),
        Err(e) => {
            report(progress, Stage::Error);
            Err(e)
        }
    }
}

async fn run<O: OutpaintBackend, C: CompressionBackend>(
    request: &ProcessRequest<'_>,
    outpaint: Option<&O>,
    compression: Option<&C>,
    max_input_bytes: usize,
    progress: Option<ProgressObserver<'_>>,
) -> Result<ProcessedImage, PipelineError> {
    // Ceiling check comes before any decode attempt.
    check_ceiling(request.image, max_input_bytes)?;

    report(progress, Stage::Analyzing);
    let probe = analyze::analyze(request.image)?;

    report(progress, Stage::Extending);
    let plan = select_plan(probe.dimensions, request.options.target, request.strategy);
    let (extended, fallback_used) = execute_plan(request.image, &plan, outpaint).await?;

    report(progress, Stage::Optimizing);
    let normalized = normalize(
        &extended,
        request.options.format,
        request.options.quality,
        request.filename,
        compression,
    )
    .await?;

    report(progress, Stage::Completed);
    Ok(ProcessedImage {
        metadata: ImageMetadata {
            width: plan.target.width,
            height: plan.target.height,
            format: request.options.format,
            size: normalized.bytes.len(),
        },
        buffer: normalized.bytes,
        fallback_used,
        compression_skipped: normalized.compression_skipped,
    })
}

/// Execute the plan's extension path. Returns the (losslessly encoded)
/// reframed image and whether the deterministic fallback stood in for AI.
async fn execute_plan<O: OutpaintBackend>(
    image: &[u8],
    plan: &TransformPlan,
    outpaint: Option<&O>,
) -> Result<(Vec<u8>, bool), PipelineError> {
    if plan.kind != PlanKind::Outpaint {
        return Ok((edge_extend::extend(image, plan)?, false));
    }

    let Some(client) = outpaint else {
        debug!("AI strategy requested but no outpaint backend configured, using edge-extend");
        return Ok((edge_extend::extend(image, plan)?, true));
    };

    match client.extend(image, plan).await.and_then(|bytes| {
        verify_extension(&bytes, plan.target)?;
        Ok(bytes)
    }) {
        Ok(bytes) => Ok((bytes, false)),
        Err(outpaint_err) => {
            warn!(error = %outpaint_err, "outpainting failed, falling back to edge-extend");
            match edge_extend::extend(image, plan) {
                Ok(bytes) => Ok((bytes, true)),
                Err(edge) => Err(PipelineError::FallbackExhausted {
                    outpaint: outpaint_err,
                    edge,
                }),
            }
        }
    }
}

/// A backend that returns undecodable bytes or the wrong canvas size has
/// sent a malformed response; the fallback rule applies.
fn verify_extension(bytes: &[u8], target: Dimensions) -> Result<(), OutpaintError> {
    let probe = analyze::analyze(bytes)
        .map_err(|e| OutpaintError::MalformedResponse(format!("undecodable image: {e}")))?;
    if probe.dimensions != target {
        return Err(OutpaintError::MalformedResponse(format!(
            "expected {target}, backend returned {}",
            probe.dimensions
        )));
    }
    Ok(())
}

fn check_ceiling(image: &[u8], limit: usize) -> Result<(), PipelineError> {
    if image.len() > limit {
        return Err(PipelineError::PayloadTooLarge {
            size: image.len(),
            limit,
        });
    }
    Ok(())
}

/// Convert an image to another format without reframing.
pub async fn convert_format<C: CompressionBackend>(
    image: &[u8],
    format: OutputFormat,
    quality: Quality,
    filename: &str,
    compression: Option<&C>,
    max_input_bytes: usize,
) -> Result<ProcessedImage, PipelineError> {
    check_ceiling(image, max_input_bytes)?;

    let probe = analyze::analyze(image)?;
    let normalized = normalize(image, format, quality, filename, compression).await?;

    Ok(ProcessedImage {
        metadata: ImageMetadata {
            width: probe.dimensions.width,
            height: probe.dimensions.height,
            format,
            size: normalized.bytes.len(),
        },
        buffer: normalized.bytes,
        fallback_used: false,
        compression_skipped: normalized.compression_skipped,
    })
}

/// Run one independent pipeline per request. Results are reported per file;
/// one failure never affects another input.
pub async fn process_batch<O: OutpaintBackend, C: CompressionBackend>(
    requests: &[ProcessRequest<'_>],
    outpaint: Option<&O>,
    compression: Option<&C>,
    max_input_bytes: usize,
) -> Vec<Result<ProcessedImage, PipelineError>> {
    let mut results = Vec::with_capacity(requests.len());
    for request in requests {
        results.push(process(request, outpaint, compression, max_input_bytes, None).await);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::imaging::test_fixtures::{gradient_png, solid_jpeg};
    use crate::optimize::tests::MockCompression;
    use crate::outpaint::tests::MockOutpaint;
    use std::sync::Mutex;

    const TEN_MB: usize = 10 * 1024 * 1024;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h).unwrap()
    }

    fn request<'a>(
        image: &'a [u8],
        target: Dimensions,
        strategy: ExtensionStrategy,
        format: OutputFormat,
    ) -> ProcessRequest<'a> {
        ProcessRequest {
            image,
            filename: "test-input",
            options: ProcessingOptions {
                target,
                quality: Quality::default(),
                format,
            },
            strategy,
        }
    }

    #[tokio::test]
    async fn downscale_is_crop_only_with_no_fallback_flag() {
        let image = solid_jpeg(1920, 1080);
        let req = request(
            &image,
            dims(800, 600),
            ExtensionStrategy::Ai,
            OutputFormat::Png,
        );
        let mock = MockOutpaint::default();

        let result = process(&req, Some(&mock), None::<&MockCompression>, TEN_MB, None)
            .await
            .unwrap();

        assert_eq!(result.metadata.width, 800);
        assert_eq!(result.metadata.height, 600);
        assert!(!result.fallback_used);
        // AI path is never invoked for a crop-only plan
        assert_eq!(mock.call_count(), 0);

        let probe = analyze::analyze(&result.buffer).unwrap();
        assert_eq!(probe.dimensions, dims(800, 600));
    }

    #[tokio::test]
    async fn unreachable_ai_backend_falls_back_to_edge_extend() {
        let image = gradient_png(800, 600);
        let req = request(
            &image,
            dims(1920, 1080),
            ExtensionStrategy::Ai,
            OutputFormat::Png,
        );
        let mock = MockOutpaint::unreachable_backend();

        let result = process(&req, Some(&mock), None::<&MockCompression>, TEN_MB, None)
            .await
            .unwrap();

        assert!(result.fallback_used);
        assert_eq!(result.metadata.width, 1920);
        assert_eq!(result.metadata.height, 1080);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn fallback_result_matches_direct_edge_extend() {
        let image = gradient_png(300, 200);
        let target = dims(600, 200);

        let failing = MockOutpaint::unreachable_backend();
        let via_fallback = process(
            &request(&image, target, ExtensionStrategy::Ai, OutputFormat::Png),
            Some(&failing),
            None::<&MockCompression>,
            TEN_MB,
            None,
        )
        .await
        .unwrap();

        let direct = process(
            &request(&image, target, ExtensionStrategy::EdgeExtend, OutputFormat::Png),
            None::<&MockOutpaint>,
            None::<&MockCompression>,
            TEN_MB,
            None,
        )
        .await
        .unwrap();

        assert!(via_fallback.fallback_used);
        assert!(!direct.fallback_used);
        assert_eq!(via_fallback.buffer, direct.buffer);
    }

    #[tokio::test]
    async fn successful_ai_extension_is_not_flagged() {
        let image = gradient_png(100, 100);
        // The mock backend replies with a valid image at target dimensions
        let mock = MockOutpaint::replying(Ok(gradient_png(200, 100)));
        let req = request(
            &image,
            dims(200, 100),
            ExtensionStrategy::Ai,
            OutputFormat::Png,
        );

        let result = process(&req, Some(&mock), None::<&MockCompression>, TEN_MB, None)
            .await
            .unwrap();

        assert!(!result.fallback_used);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn wrong_sized_ai_response_triggers_fallback() {
        let image = gradient_png(100, 100);
        // Backend replies with the wrong canvas size
        let mock = MockOutpaint::replying(Ok(gradient_png(150, 100)));
        let req = request(
            &image,
            dims(200, 100),
            ExtensionStrategy::Ai,
            OutputFormat::Png,
        );

        let result = process(&req, Some(&mock), None::<&MockCompression>, TEN_MB, None)
            .await
            .unwrap();

        assert!(result.fallback_used);
        let probe = analyze::analyze(&result.buffer).unwrap();
        assert_eq!(probe.dimensions, dims(200, 100));
    }

    #[tokio::test]
    async fn unconfigured_ai_backend_uses_edge_extend_with_flag() {
        let image = gradient_png(100, 100);
        let req = request(
            &image,
            dims(150, 150),
            ExtensionStrategy::Ai,
            OutputFormat::Png,
        );

        let result = process(
            &req,
            None::<&MockOutpaint>,
            None::<&MockCompression>,
            TEN_MB,
            None,
        )
        .await
        .unwrap();

        assert!(result.fallback_used);
    }

    #[tokio::test]
    async fn oversized_payload_rejected_before_decode() {
        // Garbage bytes: a decode attempt would fail with DecodeError, so
        // getting PayloadTooLarge proves the ceiling check ran first.
        let image = vec![0u8; 15 * 1024 * 1024];
        let req = request(
            &image,
            dims(100, 100),
            ExtensionStrategy::EdgeExtend,
            OutputFormat::Png,
        );

        let result = process(
            &req,
            None::<&MockOutpaint>,
            None::<&MockCompression>,
            TEN_MB,
            None,
        )
        .await;

        assert!(matches!(
            result,
            Err(PipelineError::PayloadTooLarge { size, limit })
                if size == 15 * 1024 * 1024 && limit == TEN_MB
        ));
    }

    #[tokio::test]
    async fn undecodable_input_is_fatal() {
        let req = request(
            b"not an image at all",
            dims(100, 100),
            ExtensionStrategy::EdgeExtend,
            OutputFormat::Png,
        );

        let result = process(
            &req,
            None::<&MockOutpaint>,
            None::<&MockCompression>,
            TEN_MB,
            None,
        )
        .await;

        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[tokio::test]
    async fn compression_failure_sets_skip_flag() {
        let image = gradient_png(50, 50);
        let req = request(
            &image,
            dims(100, 50),
            ExtensionStrategy::EdgeExtend,
            OutputFormat::Jpeg,
        );
        let compression = MockCompression::failing();

        let result = process(&req, None::<&MockOutpaint>, Some(&compression), TEN_MB, None)
            .await
            .unwrap();

        assert!(result.compression_skipped);
        assert!(!result.fallback_used);
    }

    #[tokio::test]
    async fn progress_observer_sees_stage_boundaries_in_order() {
        let image = gradient_png(50, 50);
        let req = request(
            &image,
            dims(60, 60),
            ExtensionStrategy::EdgeExtend,
            OutputFormat::Png,
        );

        let seen = Mutex::new(Vec::new());
        let observer = |stage: Stage, percent: u8| {
            seen.lock().unwrap().push((stage, percent));
        };

        process(
            &req,
            None::<&MockOutpaint>,
            None::<&MockCompression>,
            TEN_MB,
            Some(&observer),
        )
        .await
        .unwrap();

        let stages: Vec<_> = seen.lock().unwrap().clone();
        assert_eq!(
            stages,
            vec![
                (Stage::Analyzing, 10),
                (Stage::Extending, 45),
                (Stage::Optimizing, 80),
                (Stage::Completed, 100),
            ]
        );
    }

    #[tokio::test]
    async fn progress_observer_sees_error_stage_on_failure() {
        let seen = Mutex::new(Vec::new());
        let observer = |stage: Stage, _| {
            seen.lock().unwrap().push(stage);
        };
        let req = request(
            b"garbage",
            dims(10, 10),
            ExtensionStrategy::EdgeExtend,
            OutputFormat::Png,
        );

        let _ = process(
            &req,
            None::<&MockOutpaint>,
            None::<&MockCompression>,
            TEN_MB,
            Some(&observer),
        )
        .await;

        assert_eq!(seen.lock().unwrap().last(), Some(&Stage::Error));
    }

    #[tokio::test]
    async fn convert_format_preserves_dimensions() {
        let image = solid_jpeg(320, 240);
        let result = convert_format(
            &image,
            OutputFormat::WebP,
            Quality::default(),
            "photo.jpg",
            None::<&MockCompression>,
            TEN_MB,
        )
        .await
        .unwrap();

        assert_eq!(result.metadata.width, 320);
        assert_eq!(result.metadata.height, 240);
        let probe = analyze::analyze(&result.buffer).unwrap();
        assert_eq!(probe.dimensions, dims(320, 240));
    }

    #[tokio::test]
    async fn batch_results_are_independent() {
        let good = gradient_png(40, 40);
        let bad = b"broken".to_vec();
        let requests = vec![
            request(&good, dims(80, 40), ExtensionStrategy::EdgeExtend, OutputFormat::Png),
            request(&bad, dims(80, 40), ExtensionStrategy::EdgeExtend, OutputFormat::Png),
            request(&good, dims(20, 20), ExtensionStrategy::EdgeExtend, OutputFormat::Png),
        ];

        let results = process_batch(
            &requests,
            None::<&MockOutpaint>,
            None::<&MockCompression>,
            TEN_MB,
        )
        .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
