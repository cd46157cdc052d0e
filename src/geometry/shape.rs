use std::fmt;

use uuid::Uuid;

use crate::math::arc_2d::arc_subdivision_count;
use crate::math::Point2;

use super::{Arc, BoundingBox, Circle, Ellipse, Line, Polyline, Spline};

/// Concrete geometry carried by a [`Shape`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "geometry", rename_all = "lowercase")
)]
pub enum Geometry {
    Line(Line),
    Arc(Arc),
    Circle(Circle),
    Ellipse(Ellipse),
    Polyline(Polyline),
    Spline(Spline),
}

/// Type tag of a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ShapeKind {
    Line,
    Arc,
    Circle,
    Ellipse,
    Polyline,
    Spline,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "line",
            Self::Arc => "arc",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Polyline => "polyline",
            Self::Spline => "spline",
        };
        f.write_str(name)
    }
}

impl Geometry {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Line(_) => ShapeKind::Line,
            Self::Arc(_) => ShapeKind::Arc,
            Self::Circle(_) => ShapeKind::Circle,
            Self::Ellipse(_) => ShapeKind::Ellipse,
            Self::Polyline(_) => ShapeKind::Polyline,
            Self::Spline(_) => ShapeKind::Spline,
        }
    }
}

/// A drawing entity: an opaque id plus its geometry.
///
/// Shapes are immutable values. Every derived shape (offsets, reversals,
/// trims) gets a fresh id.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub geometry: Geometry,
}

/// Generates a new random shape or chain id.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Shape {
    /// Creates a shape with a freshly generated id.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: new_id(),
            geometry,
        }
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }

    #[must_use]
    pub fn line(start: Point2, end: Point2) -> Self {
        Self::new(Geometry::Line(Line::new(start, end)))
    }

    #[must_use]
    pub fn arc(arc: Arc) -> Self {
        Self::new(Geometry::Arc(arc))
    }

    #[must_use]
    pub fn circle(center: Point2, radius: f64) -> Self {
        Self::new(Geometry::Circle(Circle::new(center, radius)))
    }

    #[must_use]
    pub fn ellipse(ellipse: Ellipse) -> Self {
        Self::new(Geometry::Ellipse(ellipse))
    }

    #[must_use]
    pub fn polyline(polyline: Polyline) -> Self {
        Self::new(Geometry::Polyline(polyline))
    }

    #[must_use]
    pub fn spline(spline: Spline) -> Self {
        Self::new(Geometry::Spline(spline))
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Point2> {
        match &self.geometry {
            Geometry::Line(l) => Some(l.start),
            Geometry::Arc(a) => Some(a.start_point()),
            Geometry::Circle(c) => Some(c.point_at_angle(0.0)),
            Geometry::Ellipse(e) => Some(e.start_point()),
            Geometry::Polyline(p) => p.start_point(),
            Geometry::Spline(s) => s.validate().is_ok().then(|| s.start_point()),
        }
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Point2> {
        match &self.geometry {
            Geometry::Line(l) => Some(l.end),
            Geometry::Arc(a) => Some(a.end_point()),
            Geometry::Circle(c) => Some(c.point_at_angle(0.0)),
            Geometry::Ellipse(e) => Some(e.end_point()),
            Geometry::Polyline(p) => p.end_point(),
            Geometry::Spline(s) => s.validate().is_ok().then(|| s.end_point()),
        }
    }

    /// Flattens the shape to points with roughly `tolerance` chord error
    /// for circular pieces. Splines and ellipses use a fixed density.
    #[must_use]
    pub fn tessellate(&self, tolerance: f64) -> Vec<Point2> {
        match &self.geometry {
            Geometry::Line(l) => vec![l.start, l.end],
            Geometry::Arc(a) => tessellate_arc(a, tolerance),
            Geometry::Circle(c) => tessellate_arc(&c.as_arc(), tolerance),
            Geometry::Ellipse(e) => {
                let (start, end) = e.param_range();
                let n = arc_subdivision_count(e.semi_major(), end - start, tolerance);
                e.tessellate(n.max(16))
            }
            Geometry::Polyline(p) => {
                let mut pts = p.tessellate(tolerance);
                if p.closed {
                    if let Some(first) = pts.first().copied() {
                        pts.push(first);
                    }
                }
                pts
            }
            Geometry::Spline(s) => {
                if s.validate().is_err() {
                    return s.control_points.clone();
                }
                s.tessellate(s.default_segments())
            }
        }
    }

    /// The shape traversed in the opposite direction, with a fresh id.
    ///
    /// Circles and ellipses have a fixed counter-clockwise orientation and
    /// return `None`.
    #[must_use]
    pub fn reversed(&self) -> Option<Self> {
        let geometry = match &self.geometry {
            Geometry::Line(l) => Geometry::Line(l.reversed()),
            Geometry::Arc(a) => Geometry::Arc(a.reversed()),
            Geometry::Polyline(p) => Geometry::Polyline(p.reversed()),
            Geometry::Spline(s) => Geometry::Spline(s.reversed()),
            Geometry::Circle(_) | Geometry::Ellipse(_) => return None,
        };
        Some(Self::new(geometry))
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match &self.geometry {
            Geometry::Line(l) => Some(l.bounding_box()),
            Geometry::Arc(a) => Some(a.bounding_box()),
            Geometry::Circle(c) => Some(c.bounding_box()),
            Geometry::Ellipse(e) => Some(e.bounding_box()),
            Geometry::Polyline(p) => p.bounding_box(),
            Geometry::Spline(s) => {
                if s.validate().is_err() {
                    return BoundingBox::from_points(&s.control_points);
                }
                s.bounding_box()
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn tessellate_arc(arc: &Arc, tolerance: f64) -> Vec<Point2> {
    let n = arc_subdivision_count(arc.radius, arc.sweep().abs(), tolerance).max(4);
    (0..=n).map(|i| arc.point_at(i as f64 / n as f64)).collect()
}
