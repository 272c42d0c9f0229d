//! # Reframe
//!
//! Image reframing pipeline: take an image, reframe it onto a target canvas
//! (cropping axes that shrink, extending axes that grow), convert the format,
//! and hand back the bytes. Extension runs through a generative outpainting
//! backend when one is configured and always has a deterministic edge-extend
//! path standing behind it.
//!
//! # Architecture: Decide, Execute, Normalize
//!
//! ```text
//! bytes → analyze → select_plan → { outpaint | edge-extend | crop } → normalize → bytes
//! ```
//!
//! The decision core is [`imaging::select_plan`]: pure per-axis math with no
//! I/O, so the crop/extend policy is exhaustively testable without touching
//! pixels or the network. Execution is layered behind two trait seams —
//! [`outpaint::OutpaintBackend`] and [`optimize::CompressionBackend`] — and
//! the orchestrator in [`pipeline`] owns all fallback policy:
//!
//! - Any outpainting failure (unreachable, rejected, malformed, timed out)
//!   re-runs the plan through edge-extend and flags the result; the caller
//!   sees success.
//! - Any compression-backend failure keeps the local encoding and flags the
//!   result; the caller sees success.
//! - Only undecodable input is fatal.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Analyzer, plan geometry, edge-extend, encoders — all local |
//! | [`outpaint`] | Generative backend seam + HTTP client |
//! | [`optimize`] | Format/quality normalizer + compression backend seam |
//! | [`pipeline`] | Orchestrator: stages, fallback, progress observer, batch |
//! | [`envelope`] | `{success, data?, error?}` transport convention (413/500) |
//! | [`config`] | TOML + env configuration; API keys have no default |
//! | [`output`] | CLI result formatting |
//!
//! # Design Decisions
//!
//! ## Per-Axis Independence
//!
//! A target that shrinks one axis and grows the other is not a special case:
//! each axis resolves on its own (shrink → centered crop, grow → split
//! padding), and the plan as a whole is an extension plan if any axis pads.
//! When no axis pads the plan is crop-only regardless of the requested
//! strategy — cropping is lossless for information already present, so the
//! generative backend is never consulted for it.
//!
//! ## The Fallback Is Not Optional
//!
//! Edge-extend exists specifically to guarantee completion when the AI path
//! is unavailable, so it must never depend on a remote service and must be
//! byte-reproducible. The orchestrator treats an edge-extend failure after
//! an AI failure as fatal and unexpected: it only happens when the input was
//! never decodable to begin with.
//!
//! ## Backends Are Injected
//!
//! Both network seams take their endpoint and credentials from injected
//! configuration with no compiled-in defaults. No key, no client — failing
//! fast at configuration time beats quietly shipping a shared credential.

pub mod config;
pub mod envelope;
pub mod imaging;
pub mod optimize;
pub mod outpaint;
pub mod output;
pub mod pipeline;

pub use imaging::{Dimensions, ExtensionStrategy, OutputFormat, ProcessingOptions, Quality};
pub use pipeline::{ProcessRequest, ProcessedImage, Stage, convert_format, process, process_batch};

/// Read dimensions and format from an image buffer without decoding pixels.
pub use imaging::analyze::analyze as get_image_dimensions;
