use std::time::Duration;

use crate::geometry::Chain;
use crate::math::Point2;

/// What produced a recorded intersection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum IntersectionKind {
    /// Neighbouring offset pieces were trimmed or extended to meet here.
    Join,
    /// Non-neighbouring pieces crossed here; the chain was cut and the
    /// invalid part removed.
    SelfIntersection,
}

/// Diagnostic point reported by the chain engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct IntersectionPoint {
    pub point: Point2,
    pub kind: IntersectionKind,
    /// Indices into the input chain's shapes of the shapes involved.
    pub shape_indices: Vec<usize>,
}

/// Counters collected while offsetting a chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ChainOffsetMetrics {
    pub input_shapes: usize,
    pub output_shapes: usize,
    pub gaps_filled: usize,
    pub overlaps_trimmed: usize,
    pub self_intersections: usize,
    pub elapsed: Duration,
}

impl ChainOffsetMetrics {
    /// Sums the counters of two runs over the same input.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            input_shapes: self.input_shapes.max(other.input_shapes),
            output_shapes: self.output_shapes + other.output_shapes,
            gaps_filled: self.gaps_filled + other.gaps_filled,
            overlaps_trimmed: self.overlaps_trimmed + other.overlaps_trimmed,
            self_intersections: self.self_intersections + other.self_intersections,
            elapsed: self.elapsed + other.elapsed,
        }
    }
}

/// Outcome of a chain offset.
///
/// `outer_chain` holds the expanded side, `inner_chain` the contracted side.
/// Either may be absent even on success.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ChainOffsetResult {
    pub success: bool,
    pub outer_chain: Option<Chain>,
    pub inner_chain: Option<Chain>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub intersection_points: Vec<IntersectionPoint>,
    pub metrics: ChainOffsetMetrics,
}

impl ChainOffsetResult {
    /// Successful result without any chain.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    /// The only chain present, if exactly one side was built.
    #[must_use]
    pub fn single_chain(&self) -> Option<&Chain> {
        match (&self.outer_chain, &self.inner_chain) {
            (Some(c), None) | (None, Some(c)) => Some(c),
            _ => None,
        }
    }
}
