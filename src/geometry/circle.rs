use std::f64::consts::TAU;

use crate::math::Point2;

use super::{Arc, BoundingBox};

/// A full circle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    #[must_use]
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    #[must_use]
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// The circle as a full counter-clockwise arc starting at angle 0.
    #[must_use]
    pub fn as_arc(&self) -> Arc {
        Arc::from_sweep(self.center, self.radius, 0.0, TAU)
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            Point2::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn as_arc_is_full_ccw_turn() {
        let c = Circle::new(Point2::new(3.0, 4.0), 2.0);
        let a = c.as_arc();
        assert_abs_diff_eq!(a.sweep(), TAU, epsilon = 1e-12);
        assert!(!a.clockwise);
        assert_abs_diff_eq!(a.start_point().x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.end_point().x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn bounding_box_is_square() {
        let c = Circle::new(Point2::origin(), 8.0);
        let bbox = c.bounding_box();
        assert_abs_diff_eq!(bbox.width(), 16.0);
        assert_abs_diff_eq!(bbox.height(), 16.0);
    }
}
