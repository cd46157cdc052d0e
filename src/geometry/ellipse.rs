use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, ANGLE_TOLERANCE, TOLERANCE};

use super::BoundingBox;

/// An ellipse or elliptical arc.
///
/// `major_axis_endpoint` is the vector from `center` to the end of the major
/// axis, so it carries both the semi-major length and the rotation. The
/// semi-minor length is `semi_major * minor_to_major_ratio`.
///
/// `P(θ) = center + R(rotation) * (a·cos θ, b·sin θ)`
///
/// `start_param`/`end_param` bound the elliptical angle θ; the arc runs
/// counter-clockwise from start to end. Without bounds the ellipse is full.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Ellipse {
    pub center: Point2,
    pub major_axis_endpoint: Vector2,
    pub minor_to_major_ratio: f64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub start_param: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub end_param: Option<f64>,
}

impl Ellipse {
    /// Creates a full ellipse.
    #[must_use]
    pub fn new(center: Point2, major_axis_endpoint: Vector2, minor_to_major_ratio: f64) -> Self {
        Self {
            center,
            major_axis_endpoint,
            minor_to_major_ratio,
            start_param: None,
            end_param: None,
        }
    }

    /// Creates an elliptical arc between two parametric angles.
    #[must_use]
    pub fn arc(
        center: Point2,
        major_axis_endpoint: Vector2,
        minor_to_major_ratio: f64,
        start_param: f64,
        end_param: f64,
    ) -> Self {
        Self {
            center,
            major_axis_endpoint,
            minor_to_major_ratio,
            start_param: Some(start_param),
            end_param: Some(end_param),
        }
    }

    #[must_use]
    pub fn semi_major(&self) -> f64 {
        self.major_axis_endpoint.norm()
    }

    #[must_use]
    pub fn semi_minor(&self) -> f64 {
        self.semi_major() * self.minor_to_major_ratio
    }

    /// Rotation of the major axis from the x axis, in radians.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.major_axis_endpoint.y.atan2(self.major_axis_endpoint.x)
    }

    /// Checks the axis lengths and ratio.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::DegenerateEllipse` when an axis is (near) zero
    /// or the ratio lies outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let a = self.semi_major();
        if !a.is_finite() || a < TOLERANCE {
            return Err(GeometryError::DegenerateEllipse(format!(
                "major axis length {a} is too small"
            ))
            .into());
        }
        let ratio = self.minor_to_major_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 + TOLERANCE {
            return Err(GeometryError::DegenerateEllipse(format!(
                "minor to major ratio {ratio} must be in (0, 1]"
            ))
            .into());
        }
        if self.semi_minor() < TOLERANCE {
            return Err(GeometryError::DegenerateEllipse(format!(
                "minor axis length {} is too small",
                self.semi_minor()
            ))
            .into());
        }
        Ok(())
    }

    /// Parametric range `(start, end)` with `end > start` and
    /// `end - start ≤ 2π`.
    #[must_use]
    pub fn param_range(&self) -> (f64, f64) {
        match (self.start_param, self.end_param) {
            (Some(start), Some(end)) => {
                let mut span = (end - start).rem_euclid(TAU);
                if span < ANGLE_TOLERANCE {
                    span = TAU;
                }
                (start, start + span)
            }
            (Some(start), None) => (start, start + TAU),
            (None, Some(end)) => (0.0, if end > ANGLE_TOLERANCE { end } else { TAU }),
            (None, None) => (0.0, TAU),
        }
    }

    /// Whether the parametric range covers a full turn.
    #[must_use]
    pub fn is_full(&self) -> bool {
        let (start, end) = self.param_range();
        (end - start - TAU).abs() < 1e-6
    }

    /// Maps a local (unrotated, centered) vector into world space.
    #[must_use]
    pub fn to_world(&self, local: Vector2) -> Vector2 {
        let (s, c) = self.rotation().sin_cos();
        Vector2::new(c * local.x - s * local.y, s * local.x + c * local.y)
    }

    #[must_use]
    pub fn point_at_param(&self, theta: f64) -> Point2 {
        let local = Vector2::new(
            self.semi_major() * theta.cos(),
            self.semi_minor() * theta.sin(),
        );
        self.center + self.to_world(local)
    }

    /// Outward unit normal at parametric angle `theta`.
    ///
    /// For the unrotated ellipse the gradient direction is
    /// `(b·cos θ, a·sin θ)`; the result is rotated into world space.
    #[must_use]
    pub fn normal_at_param(&self, theta: f64) -> Option<Vector2> {
        let local = Vector2::new(
            self.semi_minor() * theta.cos(),
            self.semi_major() * theta.sin(),
        );
        let len = local.norm();
        if len < TOLERANCE {
            return None;
        }
        Some(self.to_world(local / len))
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.point_at_param(self.param_range().0)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.point_at_param(self.param_range().1)
    }

    /// Samples `segments + 1` points uniformly in the parametric angle.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tessellate(&self, segments: usize) -> Vec<Point2> {
        let segments = segments.max(1);
        let (start, end) = self.param_range();
        (0..=segments)
            .map(|i| self.point_at_param(start + (end - start) * i as f64 / segments as f64))
            .collect()
    }

    /// Bounding box of a 256-segment tessellation.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let pts = self.tessellate(256);
        BoundingBox::from_points(&pts).unwrap_or(BoundingBox::new(self.center, self.center))
    }
}
