//! Constant-distance offsets of drawing shapes and chains.
//!
//! Every `offset_*` function is pure: it never mutates its input and always
//! returns a result value. Errors are reported in the `errors` list of the
//! result instead of being propagated.

mod arc;
pub mod chain;
mod ellipse;
mod line;
mod polyline;
mod spline;

use crate::error::{GeometryError, OffsetError, OperationError};
use crate::geometry::{Geometry, Shape};

pub use arc::{offset_arc, offset_circle};
pub use chain::{
    offset_chain, offset_chain_both_sides, ChainOffsetMetrics, ChainOffsetParameters,
    ChainOffsetResult, IntersectionKind, IntersectionPoint, IntersectionType,
};
pub use ellipse::offset_ellipse;
pub use line::offset_line;
pub use polyline::{offset_polyline, offset_polyline_with_params};
pub use spline::{offset_spline, offset_spline_with_options, SplineOffsetOptions};

/// Which way to offset a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OffsetDirection {
    /// No offset; every operation is a no-op.
    #[default]
    None,
    /// Towards the inside (contracting).
    Inset,
    /// Towards the outside (expanding).
    Outset,
}

impl OffsetDirection {
    /// Signed offset distance: `+distance` for outset, `-distance` for inset.
    #[must_use]
    pub fn signed(self, distance: f64) -> f64 {
        match self {
            Self::Outset => distance,
            Self::Inset => -distance,
            Self::None => 0.0,
        }
    }

    /// Whether an offset with this direction and distance does nothing.
    #[must_use]
    pub fn is_noop(self, distance: f64) -> bool {
        self == Self::None || distance == 0.0
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Outset => Self::Inset,
            Self::Inset => Self::Outset,
            Self::None => Self::None,
        }
    }
}

/// Outcome of a single-shape offset.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetResult {
    pub success: bool,
    pub shapes: Vec<Shape>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl OffsetResult {
    /// Successful result with no shapes.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ok(shapes: Vec<Shape>) -> Self {
        Self {
            success: true,
            shapes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

impl From<OffsetError> for OffsetResult {
    fn from(err: OffsetError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<GeometryError> for OffsetResult {
    fn from(err: GeometryError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<OperationError> for OffsetResult {
    fn from(err: OperationError) -> Self {
        Self::failure(err.to_string())
    }
}

/// Offsets any shape by routing it to the matching `offset_*` function.
#[must_use]
pub fn offset_shape(shape: &Shape, distance: f64, direction: OffsetDirection) -> OffsetResult {
    offset_shape_with_options(shape, distance, direction, &SplineOffsetOptions::default())
}

/// Like [`offset_shape`], with explicit refinement options for splines.
#[must_use]
pub fn offset_shape_with_options(
    shape: &Shape,
    distance: f64,
    direction: OffsetDirection,
    options: &SplineOffsetOptions,
) -> OffsetResult {
    if direction.is_noop(distance) {
        return OffsetResult::noop();
    }
    if !distance.is_finite() {
        return OffsetResult::failure(format!("Invalid offset distance: {distance}"));
    }
    match &shape.geometry {
        Geometry::Line(l) => offset_line(l, distance, direction),
        Geometry::Arc(a) => offset_arc(a, distance, direction),
        Geometry::Circle(c) => offset_circle(c, distance, direction),
        Geometry::Ellipse(e) => offset_ellipse(e, distance, direction),
        Geometry::Polyline(p) => offset_polyline(p, distance, direction),
        Geometry::Spline(s) => offset_spline_with_options(s, distance, direction, options),
    }
}

/// Offsets a shape given only its type tag and geometry, as received from a
/// host that dispatches on strings.
#[must_use]
pub fn offset_tagged(
    kind: &str,
    geometry: Option<&Geometry>,
    distance: f64,
    direction: OffsetDirection,
) -> OffsetResult {
    match geometry {
        Some(g) if g.kind().to_string() == kind => {
            offset_shape(&Shape::new(g.clone()), distance, direction)
        }
        _ => OffsetResult::failure(format!("Unsupported shape type for offset: {kind}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::geometry::{Arc, Ellipse, Polyline, Spline};
    use crate::math::{Point2, Vector2};

    fn all_shapes() -> Vec<Shape> {
        vec![
            Shape::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
            Shape::arc(Arc::new(Point2::origin(), 10.0, 0.0, 1.5, false)),
            Shape::circle(Point2::origin(), 8.0),
            Shape::ellipse(Ellipse::new(Point2::origin(), Vector2::new(10.0, 0.0), 0.5)),
            Shape::polyline(Polyline::from_points(
                &[Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), Point2::new(5.0, 5.0)],
                false,
            )),
            Shape::spline(Spline::new(
                vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(3.0, 4.0),
                    Point2::new(6.0, 0.0),
                    Point2::new(9.0, 4.0),
                ],
                3,
                vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            )),
        ]
    }

    #[test]
    fn direction_sign_convention() {
        assert_eq!(OffsetDirection::Outset.signed(2.0), 2.0);
        assert_eq!(OffsetDirection::Inset.signed(2.0), -2.0);
        assert_eq!(OffsetDirection::None.signed(2.0), 0.0);
        assert_eq!(OffsetDirection::Inset.opposite(), OffsetDirection::Outset);
    }

    #[test]
    fn none_direction_and_zero_distance_are_noops() {
        for shape in all_shapes() {
            let r = offset_shape(&shape, 5.0, OffsetDirection::None);
            assert!(r.success && r.shapes.is_empty(), "{}", shape.kind());
            let r = offset_shape(&shape, 0.0, OffsetDirection::Outset);
            assert!(r.success && r.shapes.is_empty(), "{}", shape.kind());
        }
    }

    #[test]
    fn every_kind_produces_output() {
        for shape in all_shapes() {
            let r = offset_shape(&shape, 1.0, OffsetDirection::Outset);
            assert!(r.success, "{}: {:?}", shape.kind(), r.errors);
            assert!(!r.shapes.is_empty(), "{}", shape.kind());
            assert!(r.shapes.iter().all(|s| s.id != shape.id));
        }
    }

    #[test]
    fn unsupported_tag_fails() {
        let r = offset_tagged("hatch", None, 1.0, OffsetDirection::Outset);
        assert!(!r.success);
        assert_eq!(r.errors[0], "Unsupported shape type for offset: hatch");
    }

    #[test]
    fn tagged_dispatch_matches_kind() {
        let g = Geometry::Circle(crate::geometry::Circle::new(Point2::origin(), 2.0));
        let r = offset_tagged("circle", Some(&g), 1.0, OffsetDirection::Outset);
        assert!(r.success);
        let r = offset_tagged("arc", Some(&g), 1.0, OffsetDirection::Outset);
        assert!(!r.success);
    }
}
