use std::f64::consts::TAU;

use crate::math::polygon_2d::signed_area_2d;
use crate::math::{points_close, Point2, ANGLE_TOLERANCE};

use super::shape::new_id;
use super::{BoundingBox, Geometry, Shape};

/// Tessellation tolerance used for area and orientation queries.
const AREA_TESSELLATION_TOL: f64 = 0.01;

/// An ordered sequence of shapes traversed start to end.
///
/// A chain is closed when the end of its last shape meets the start of its
/// first within a tolerance. A single circle, closed polyline, full ellipse
/// or closed spline is a closed chain on its own.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chain {
    pub id: String,
    pub shapes: Vec<Shape>,
}

impl Chain {
    /// Creates a chain with a fresh id.
    #[must_use]
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self {
            id: new_id(),
            shapes,
        }
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>, shapes: Vec<Shape>) -> Self {
        Self {
            id: id.into(),
            shapes,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Point2> {
        self.shapes.first().and_then(Shape::start_point)
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Point2> {
        self.shapes.last().and_then(Shape::end_point)
    }

    /// Whether the chain forms a closed loop within `tolerance`.
    #[must_use]
    pub fn is_closed(&self, tolerance: f64) -> bool {
        if let [only] = self.shapes.as_slice() {
            match &only.geometry {
                Geometry::Circle(_) => return true,
                Geometry::Arc(a) if (a.sweep().abs() - TAU).abs() < ANGLE_TOLERANCE => return true,
                Geometry::Ellipse(e) if e.is_full() => return true,
                Geometry::Polyline(p) if p.closed => return true,
                Geometry::Spline(s) if s.closed => return true,
                _ => {}
            }
        }
        match (self.start_point(), self.end_point()) {
            (Some(a), Some(b)) => self.shapes.len() > 1 && points_close(&a, &b, tolerance),
            _ => false,
        }
    }

    /// Flattens the whole chain to a point sequence without duplicated
    /// junction points.
    #[must_use]
    pub fn tessellate(&self, tolerance: f64) -> Vec<Point2> {
        let mut points: Vec<Point2> = Vec::new();
        for shape in &self.shapes {
            let pts = shape.tessellate(tolerance);
            let joined = matches!(
                (points.last(), pts.first()),
                (Some(a), Some(b)) if points_close(a, b, 1e-9)
            );
            let skip = usize::from(joined);
            points.extend(pts.into_iter().skip(skip));
        }
        points
    }

    /// Signed area of the polygon traced by the chain (positive for
    /// counter-clockwise). Open chains are closed implicitly.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.tessellate(AREA_TESSELLATION_TOL))
    }

    #[must_use]
    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.shapes
            .iter()
            .filter_map(Shape::bounding_box)
            .reduce(|a, b| a.union(&b))
    }
}
