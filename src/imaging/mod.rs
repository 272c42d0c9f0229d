//! Image analysis and local transforms — pure Rust, no external services.
//!
//! | Operation | Module / crate |
//! |---|---|
//! | **Analyze** | [`analyze`] — `image` header probe, no pixel decode |
//! | **Plan selection** | [`geometry`] — pure per-axis crop/pad math |
//! | **Edge-extend** | [`edge_extend`] — deterministic border replication |
//! | **Re-encode** | [`encode`] — jpeg/png/webp/svg output |
//!
//! The module is split the same way throughout: pure calculations that are
//! unit testable without images, parameter types describing requests, and
//! the pixel work that consumes both.

pub mod analyze;
pub mod edge_extend;
pub mod encode;
pub mod geometry;
mod params;

pub use analyze::{DecodeError, Probe, analyze};
pub use encode::EncodeError;
pub use geometry::{AxisPlan, PlanKind, TransformPlan, select_plan};
pub use params::{
    Dimensions, ExtensionStrategy, OutputFormat, ParamError, ProcessingOptions, Quality,
};

#[cfg(test)]
pub(crate) mod test_fixtures;
