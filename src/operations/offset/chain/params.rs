use std::time::Instant;

use crate::operations::offset::SplineOffsetOptions;

/// How neighbouring offset pieces that do not meet are reconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum IntersectionType {
    /// Intersections are computed on tessellated pieces and gaps are never
    /// closed by extending pieces.
    Approximate,
    /// Analytic intersections; lines and arcs are extended along their
    /// carriers (infinite line, full circle) to close gaps.
    #[default]
    True,
}

/// Tuning for [`offset_chain`](super::offset_chain).
///
/// | field                    | default  |
/// |--------------------------|----------|
/// | `tolerance`              | `0.1`    |
/// | `max_extension`          | `50.0`   |
/// | `snap_threshold`         | `0.5`    |
/// | `polyline_intersections` | `false`  |
/// | `intersection_type`      | `True`   |
/// | `allow_gaps`             | `false`  |
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ChainOffsetParameters {
    /// Slack when comparing offset geometry against the offset distance.
    pub tolerance: f64,
    /// Longest distance a piece may be extended to close a gap.
    pub max_extension: f64,
    /// Offset endpoints closer than this are joined by moving them together.
    pub snap_threshold: f64,
    /// Close convex gaps with an arc about the source vertex instead of a
    /// straight bridge.
    pub polyline_intersections: bool,
    pub intersection_type: IntersectionType,
    /// Skip members whose offset fails instead of failing the chain.
    pub allow_gaps: bool,
    /// Refinement options for spline and ellipse members.
    pub spline_options: SplineOffsetOptions,
    /// The chain offset is abandoned once this instant has passed.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub deadline: Option<Instant>,
}

impl Default for ChainOffsetParameters {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            max_extension: 50.0,
            snap_threshold: 0.5,
            polyline_intersections: false,
            intersection_type: IntersectionType::True,
            allow_gaps: false,
            spline_options: SplineOffsetOptions::default(),
            deadline: None,
        }
    }
}

impl ChainOffsetParameters {
    /// Spline options with the chain deadline applied when the options carry
    /// none of their own.
    #[must_use]
    pub(super) fn member_spline_options(&self) -> SplineOffsetOptions {
        let mut options = self.spline_options.clone();
        if options.deadline.is_none() {
            options.deadline = self.deadline;
        }
        options
    }

    pub(super) fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
