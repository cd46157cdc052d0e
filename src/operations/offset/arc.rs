use crate::error::OperationError;
use crate::geometry::{Arc, Circle, Geometry, Shape};

use super::{OffsetDirection, OffsetResult};

/// Offsets an arc by changing its radius. Center, angles and winding are
/// unchanged; outset grows the radius.
#[must_use]
pub fn offset_arc(arc: &Arc, distance: f64, direction: OffsetDirection) -> OffsetResult {
    if direction.is_noop(distance) {
        return OffsetResult::noop();
    }
    let radius = arc.radius + direction.signed(distance);
    if radius <= 0.0 {
        return OperationError::NegativeRadius(radius).into();
    }
    OffsetResult::ok(vec![Shape::new(Geometry::Arc(Arc { radius, ..*arc }))])
}

/// Offsets a circle by changing its radius.
#[must_use]
pub fn offset_circle(circle: &Circle, distance: f64, direction: OffsetDirection) -> OffsetResult {
    if direction.is_noop(distance) {
        return OffsetResult::noop();
    }
    let radius = circle.radius + direction.signed(distance);
    if radius <= 0.0 {
        return OperationError::NegativeRadius(radius).into();
    }
    OffsetResult::ok(vec![Shape::new(Geometry::Circle(Circle::new(
        circle.center,
        radius,
    )))])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn arc_of(r: &OffsetResult) -> Arc {
        match &r.shapes[0].geometry {
            Geometry::Arc(a) => *a,
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn radius_arithmetic_is_exact() {
        let a = Arc::new(Point2::new(2.0, 3.0), 10.0, 0.0, FRAC_PI_2, false);
        let out = arc_of(&offset_arc(&a, 2.5, OffsetDirection::Outset));
        assert_eq!(out.radius, 12.5);
        assert_eq!(out.center, a.center);
        assert_eq!(out.start_angle, a.start_angle);
        assert_eq!(out.end_angle, a.end_angle);
        assert_eq!(out.clockwise, a.clockwise);
        let inset = arc_of(&offset_arc(&a, 2.5, OffsetDirection::Inset));
        assert_eq!(inset.radius, 7.5);
    }

    #[test]
    fn inset_past_radius_fails() {
        let a = Arc::new(Point2::origin(), 10.0, 0.0, FRAC_PI_2, false);
        let r = offset_arc(&a, 15.0, OffsetDirection::Inset);
        assert!(!r.success);
        assert!(r.errors[0].contains("negative radius"), "{:?}", r.errors);
        assert!(r.shapes.is_empty());
    }

    #[test]
    fn inset_equal_to_radius_fails() {
        let c = Circle::new(Point2::origin(), 4.0);
        let r = offset_circle(&c, 4.0, OffsetDirection::Inset);
        assert!(!r.success);
        assert!(r.errors[0].contains("negative radius"));
    }

    #[test]
    fn circle_outset() {
        let c = Circle::new(Point2::new(1.0, -1.0), 8.0);
        let r = offset_circle(&c, 4.0, OffsetDirection::Outset);
        assert_eq!(r.shapes.len(), 1);
        let Geometry::Circle(out) = &r.shapes[0].geometry else {
            panic!("expected circle")
        };
        assert_eq!(out.radius, 12.0);
        assert_eq!(out.center, c.center);
    }

    #[test]
    fn every_sample_moves_by_distance() {
        for sweep in [FRAC_PI_2, PI, 1.5 * PI, 1.9 * PI] {
            for clockwise in [false, true] {
                let end = if clockwise { -sweep } else { sweep };
                let a = Arc::new(Point2::new(5.0, 5.0), 3.0, 0.0, end, clockwise);
                let o = arc_of(&offset_arc(&a, 1.25, OffsetDirection::Outset));
                for i in 0..=16 {
                    let t = f64::from(i) / 16.0;
                    assert_abs_diff_eq!((o.point_at(t) - a.point_at(t)).norm(), 1.25, epsilon = 1e-12);
                }
            }
        }
    }
}
