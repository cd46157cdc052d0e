use tracing::{debug, warn};

use crate::geometry::{Geometry, Shape};
use crate::operations::offset::{offset_shape_with_options, OffsetDirection};

use super::members::Member;
use super::params::ChainOffsetParameters;
use super::piece::{Origin, Piece, PieceGeometry};

/// Side of the traversal direction an offset is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Per-member offsets before any joining.
#[derive(Debug, Default)]
pub(super) struct RawOffset {
    pub pieces: Vec<Piece>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Direction that moves `member` towards `side`.
///
/// Lines and splines move right on outset. Arcs grow on outset, which is
/// their right side only when counter-clockwise. Ellipses are offset in
/// their own parameter direction, so a reversed ellipse swaps sides.
pub(super) fn member_direction(member: &Member, side: Side) -> OffsetDirection {
    let right = match &member.geometry {
        Geometry::Arc(a) if a.sweep() < 0.0 => OffsetDirection::Inset,
        Geometry::Ellipse(_) if member.reversed => OffsetDirection::Inset,
        _ => OffsetDirection::Outset,
    };
    match side {
        Side::Right => right,
        Side::Left => right.opposite(),
    }
}

/// Offsets every member by `abs_distance` towards `side`.
///
/// Failures are collected under the member's [`label`](Member::label); with
/// `allow_gaps` they become warnings and the member is skipped.
pub(super) fn build(
    members: &[Member],
    side: Side,
    abs_distance: f64,
    params: &ChainOffsetParameters,
) -> RawOffset {
    let options = params.member_spline_options();
    let mut raw = RawOffset::default();
    for (index, member) in members.iter().enumerate() {
        let direction = member_direction(member, side);
        let label = member.label();
        let shape = Shape::new(member.geometry.clone());
        let result = offset_shape_with_options(&shape, abs_distance, direction, &options);
        raw.warnings
            .extend(result.warnings.iter().map(|w| format!("{label}: {w}")));

        if !result.success {
            for e in &result.errors {
                if params.allow_gaps {
                    warn!(shape = member.shape_index, error = %e, "skipping member that failed to offset");
                    raw.warnings.push(format!("{label}: {e} (skipped)"));
                } else {
                    raw.errors.push(format!("{label}: {e}"));
                }
            }
            continue;
        }

        let origin = Origin::Offset(index);
        let mut pieces: Vec<Piece> = result
            .shapes
            .iter()
            .filter_map(|s| Piece::from_geometry(&s.geometry, origin))
            .collect();
        if member.reversed && matches!(member.geometry, Geometry::Ellipse(_)) {
            pieces.reverse();
            for p in &mut pieces {
                if let PieceGeometry::Spline(s) = &p.geometry {
                    p.geometry = PieceGeometry::Spline(s.reversed());
                }
            }
        }
        debug!(member = index, ?direction, pieces = pieces.len(), "offset chain member");
        raw.pieces.extend(pieces);
    }
    raw
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::members::{flatten, orient};
    use super::*;
    use crate::geometry::{Arc, Chain, Ellipse};
    use crate::math::{Point2, Vector2};
    use approx::assert_abs_diff_eq;

    #[test]
    fn arc_direction_depends_on_winding() {
        let chain = Chain::new(vec![
            Shape::arc(Arc::new(Point2::origin(), 2.0, 0.0, 1.0, false)),
            Shape::arc(Arc::new(Point2::new(5.0, 0.0), 2.0, 1.0, 0.0, true)),
        ]);
        let members = flatten(&chain);
        assert_eq!(member_direction(&members[0], Side::Right), OffsetDirection::Outset);
        assert_eq!(member_direction(&members[1], Side::Right), OffsetDirection::Inset);
        assert_eq!(member_direction(&members[1], Side::Left), OffsetDirection::Outset);
    }

    #[test]
    fn failures_are_labelled_with_shape_index() {
        let chain = Chain::new(vec![
            Shape::line(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0)),
            Shape::arc(Arc::new(Point2::new(5.0, 1.0), 1.0, -std::f64::consts::FRAC_PI_2, 0.0, false)),
        ]);
        let mut members = flatten(&chain);
        orient(&mut members, 0.5);
        // Left of a counter-clockwise arc is towards its center.
        let raw = build(&members, Side::Left, 2.0, &ChainOffsetParameters::default());
        assert_eq!(raw.errors.len(), 1);
        assert!(raw.errors[0].starts_with("Shape 1 (arc): Offset would create negative radius"), "{:?}", raw.errors);

        let params = ChainOffsetParameters {
            allow_gaps: true,
            ..ChainOffsetParameters::default()
        };
        let raw = build(&members, Side::Left, 2.0, &params);
        assert!(raw.errors.is_empty());
        assert_eq!(raw.pieces.len(), 1);
        assert!(raw.warnings.iter().any(|w| w.contains("skipped")));
    }

    #[test]
    fn polyline_failures_name_the_segment() {
        use crate::geometry::{BulgeVertex, Polyline};
        // Stadium with semicircle ends of radius 1.
        let stadium = Polyline::from_bulge_vertices(
            &[
                BulgeVertex::new(0.0, 0.0, 0.0),
                BulgeVertex::new(4.0, 0.0, 1.0),
                BulgeVertex::new(4.0, 2.0, 0.0),
                BulgeVertex::new(0.0, 2.0, 1.0),
            ],
            true,
        );
        let chain = Chain::new(vec![Shape::polyline(stadium)]);
        let mut members = flatten(&chain);
        orient(&mut members, 0.5);
        // Left of the counter-clockwise stadium is inside.
        let raw = build(&members, Side::Left, 1.5, &ChainOffsetParameters::default());
        assert_eq!(raw.errors.len(), 2, "{:?}", raw.errors);
        assert!(raw.errors[0].starts_with("Shape 0 (polyline) segment 1 (arc): Offset would create negative radius"));
        assert!(raw.errors[1].starts_with("Shape 0 (polyline) segment 3 (arc): "));
    }

    #[test]
    fn reversed_ellipse_offset_follows_traversal() {
        let e = Ellipse::arc(Point2::origin(), Vector2::new(4.0, 0.0), 0.5, 0.0, std::f64::consts::PI);
        let chain = Chain::new(vec![
            Shape::line(Point2::new(4.0, 0.0), Point2::new(-4.0, 0.0)),
            Shape::ellipse(e),
        ]);
        let mut members = flatten(&chain);
        orient(&mut members, 0.5);
        let raw = build(&members, Side::Left, 1.0, &ChainOffsetParameters::default());
        assert!(raw.errors.is_empty(), "{:?}", raw.errors);
        let spline = &raw.pieces[1];
        // Traversal runs from (-4, 0) over the top; left of it is outside.
        assert_abs_diff_eq!((spline.start_point() - Point2::new(-5.0, 0.0)).norm(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!((spline.end_point() - Point2::new(5.0, 0.0)).norm(), 0.0, epsilon = 1e-6);
    }
}
