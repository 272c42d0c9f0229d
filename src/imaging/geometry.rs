//! Pure plan math for reframing an image onto a target canvas.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Each axis is resolved independently: an axis where the target fits inside
//! the original crops (centered), an axis where the target exceeds the
//! original pads (split evenly, remainder on the trailing edge). A plan is
//! crop-only exactly when no axis pads — in that case the requested strategy
//! is irrelevant, because cropping is cheaper and lossless for information
//! already present.

use super::params::{Dimensions, ExtensionStrategy};

/// Which execution path a plan resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// Target fits within the original on both axes (includes the identity
    /// case); executed locally, no extension.
    CropOnly,
    /// At least one axis grows; filled by the generative backend.
    Outpaint,
    /// At least one axis grows; filled by deterministic border replication.
    EdgeExtend,
}

/// Resolution of a single axis: how much of the original survives and how
/// much padding is added on each side.
///
/// Invariant: `offset + keep <= original` and `pad_before + keep + pad_after
/// == target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisPlan {
    /// Offset into the original where the kept region starts.
    pub offset: u32,
    /// How many original pixels survive on this axis.
    pub keep: u32,
    /// Padding added before the kept region.
    pub pad_before: u32,
    /// Padding added after the kept region.
    pub pad_after: u32,
}

impl AxisPlan {
    /// Total padding on this axis (`max(0, target - original)`).
    pub fn padding(&self) -> u32 {
        self.pad_before + self.pad_after
    }
}

/// Concrete transform plan: source and target geometry plus the per-axis
/// crop/pad resolution and the execution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformPlan {
    pub kind: PlanKind,
    pub source: Dimensions,
    pub target: Dimensions,
    pub horizontal: AxisPlan,
    pub vertical: AxisPlan,
}

impl TransformPlan {
    /// True when the plan changes nothing (target equals original exactly).
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }

    /// True when at least one axis requires new pixels.
    pub fn requires_extension(&self) -> bool {
        self.horizontal.padding() > 0 || self.vertical.padding() > 0
    }
}

/// Resolve one axis independently: shrink crops, growth pads.
fn plan_axis(original: u32, target: u32) -> AxisPlan {
    if target <= original {
        AxisPlan {
            offset: (original - target) / 2,
            keep: target,
            pad_before: 0,
            pad_after: 0,
        }
    } else {
        let pad = target - original;
        let pad_before = pad / 2;
        AxisPlan {
            offset: 0,
            keep: original,
            pad_before,
            pad_after: pad - pad_before,
        }
    }
}

/// Decide the concrete transform plan for reframing `original` onto `target`.
///
/// When the target fits within the original on both axes the plan is
/// crop-only regardless of `requested`. Otherwise the plan carries the
/// requested extension path; the orchestrator owns availability and fallback.
pub fn select_plan(
    original: Dimensions,
    target: Dimensions,
    requested: ExtensionStrategy,
) -> TransformPlan {
    let horizontal = plan_axis(original.width, target.width);
    let vertical = plan_axis(original.height, target.height);

    let kind = if horizontal.padding() == 0 && vertical.padding() == 0 {
        PlanKind::CropOnly
    } else {
        match requested {
            ExtensionStrategy::Ai => PlanKind::Outpaint,
            ExtensionStrategy::EdgeExtend => PlanKind::EdgeExtend,
        }
    };

    TransformPlan {
        kind,
        source: original,
        target,
        horizontal,
        vertical,
    }
}
