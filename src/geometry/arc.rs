use std::f64::consts::FRAC_PI_2;

use crate::math::arc_2d::{
    angle_in_arc_range, arc_from_bulge, arc_point_at, arc_sweep, arc_tangent_at,
};
use crate::math::{Point2, Vector2};

use super::BoundingBox;

/// A circular arc.
///
/// Angles are in radians. The arc runs from `start_angle` to `end_angle`,
/// counter-clockwise unless `clockwise` is set. Coincident angles describe a
/// full turn.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub clockwise: bool,
}

impl Arc {
    #[must_use]
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64, clockwise: bool) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
            clockwise,
        }
    }

    /// Creates an arc from two endpoints and a DXF bulge (`tan(sweep / 4)`).
    ///
    /// Returns `None` for a zero bulge or coincident endpoints.
    #[must_use]
    pub fn from_bulge(p0: &Point2, p1: &Point2, bulge: f64) -> Option<Self> {
        let (center, radius, start_angle, sweep) = arc_from_bulge(p0, p1, bulge)?;
        Some(Self {
            center,
            radius,
            start_angle,
            end_angle: start_angle + sweep,
            clockwise: sweep < 0.0,
        })
    }

    /// Creates an arc from a start angle and a signed sweep.
    #[must_use]
    pub fn from_sweep(center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle: start_angle + sweep,
            clockwise: sweep < 0.0,
        }
    }

    /// Signed sweep angle: positive counter-clockwise, `|sweep| ∈ (0, 2π]`.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        arc_sweep(self.start_angle, self.end_angle, self.clockwise)
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.point_at(0.0)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.point_at(1.0)
    }

    /// Point at normalized parameter `t ∈ [0, 1]` along the sweep.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        arc_point_at(&self.center, self.radius, self.start_angle, self.sweep(), t)
    }

    /// Unit tangent at `t`, pointing in the direction of travel.
    #[must_use]
    pub fn tangent_at(&self, t: f64) -> Vector2 {
        arc_tangent_at(self.start_angle, self.sweep(), t)
    }

    #[must_use]
    pub fn contains_angle(&self, angle: f64) -> bool {
        angle_in_arc_range(angle, self.start_angle, self.sweep())
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep().abs()
    }

    /// Same arc traversed from end to start.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            center: self.center,
            radius: self.radius,
            start_angle: self.end_angle,
            end_angle: self.start_angle,
            clockwise: !self.clockwise,
        }
    }

    /// Tight bounding box, including axis extremes inside the sweep.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::new(self.start_point(), self.end_point());
        for k in 0..4 {
            let angle = f64::from(k) * FRAC_PI_2;
            if self.contains_angle(angle) {
                bbox.include(&Point2::new(
                    self.center.x + self.radius * angle.cos(),
                    self.center.y + self.radius * angle.sin(),
                ));
            }
        }
        bbox
    }
}
