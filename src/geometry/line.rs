use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::BoundingBox;

/// A straight line segment from `start` to `end`.
///
/// The parametric form is `P(t) = start + t * (end - start)`, `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Returns the unit direction from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroLengthLine` if both endpoints coincide.
    pub fn direction(&self) -> Result<Vector2> {
        let d = self.end - self.start;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroLengthLine.into());
        }
        Ok(d / len)
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        self.start + (self.end - self.start) * t
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.start, self.end)
    }
}
