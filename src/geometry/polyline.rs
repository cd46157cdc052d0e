use crate::math::arc_2d::arc_subdivision_count;
use crate::math::{points_close, Point2};

use super::{Arc, BoundingBox, Line};

/// Bulge-encoded polyline vertex, as found in DXF `LWPOLYLINE` entities.
///
/// `bulge = tan(sweep_angle / 4)`:
/// - `0` = straight line to next vertex
/// - `> 0` = counter-clockwise arc to next vertex
/// - `< 0` = clockwise arc to next vertex
/// - `|bulge| = 1` = semicircle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BulgeVertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl BulgeVertex {
    #[must_use]
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    /// Creates a line vertex (bulge = 0).
    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    #[must_use]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// One segment of a [`Polyline`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "geometry", rename_all = "lowercase")
)]
pub enum PolylineSegment {
    Line(Line),
    Arc(Arc),
}

impl PolylineSegment {
    #[must_use]
    pub fn start_point(&self) -> Point2 {
        match self {
            Self::Line(l) => l.start,
            Self::Arc(a) => a.start_point(),
        }
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        match self {
            Self::Line(l) => l.end,
            Self::Arc(a) => a.end_point(),
        }
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Line(l) => Self::Line(l.reversed()),
            Self::Arc(a) => Self::Arc(a.reversed()),
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Self::Line(l) => l.bounding_box(),
            Self::Arc(a) => a.bounding_box(),
        }
    }

    /// Appends the points of this segment after its start point.
    fn push_points(&self, tolerance: f64, out: &mut Vec<Point2>) {
        match self {
            Self::Line(l) => out.push(l.end),
            Self::Arc(a) => {
                let n = arc_subdivision_count(a.radius, a.sweep().abs(), tolerance);
                for j in 1..n {
                    #[allow(clippy::cast_precision_loss)]
                    let t = j as f64 / n as f64;
                    out.push(a.point_at(t));
                }
                out.push(a.end_point());
            }
        }
    }
}

/// A connected path of line and arc segments.
///
/// For closed polylines the end of the last segment coincides with the
/// start of the first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    pub segments: Vec<PolylineSegment>,
    pub closed: bool,
}

impl Polyline {
    #[must_use]
    pub fn new(segments: Vec<PolylineSegment>, closed: bool) -> Self {
        Self { segments, closed }
    }

    /// Builds a line-only polyline through `points`.
    ///
    /// When `closed` is set a closing segment back to the first point is
    /// added unless the last point already coincides with it.
    #[must_use]
    pub fn from_points(points: &[Point2], closed: bool) -> Self {
        let mut segments: Vec<PolylineSegment> = points
            .windows(2)
            .filter(|w| !points_close(&w[0], &w[1], 1e-12))
            .map(|w| PolylineSegment::Line(Line::new(w[0], w[1])))
            .collect();
        if closed && points.len() > 2 {
            let (first, last) = (points[0], points[points.len() - 1]);
            if !points_close(&first, &last, 1e-12) {
                segments.push(PolylineSegment::Line(Line::new(last, first)));
            }
        }
        Self { segments, closed }
    }

    /// Expands bulge vertices into line and arc segments.
    ///
    /// Zero-length segments are skipped.
    #[must_use]
    pub fn from_bulge_vertices(vertices: &[BulgeVertex], closed: bool) -> Self {
        let n = vertices.len();
        if n < 2 {
            return Self {
                segments: Vec::new(),
                closed,
            };
        }
        let seg_count = if closed { n } else { n - 1 };
        let mut segments = Vec::with_capacity(seg_count);
        for i in 0..seg_count {
            let v0 = &vertices[i];
            let v1 = &vertices[(i + 1) % n];
            let (p0, p1) = (v0.point(), v1.point());
            if points_close(&p0, &p1, 1e-12) {
                continue;
            }
            match Arc::from_bulge(&p0, &p1, v0.bulge) {
                Some(arc) => segments.push(PolylineSegment::Arc(arc)),
                None => segments.push(PolylineSegment::Line(Line::new(p0, p1))),
            }
        }
        Self { segments, closed }
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Point2> {
        self.segments.first().map(PolylineSegment::start_point)
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Point2> {
        self.segments.last().map(PolylineSegment::end_point)
    }

    /// Flattens the polyline to points; arcs are subdivided so the chord
    /// deviation stays below `tolerance`.
    ///
    /// Closed polylines do not repeat the first point at the end.
    #[must_use]
    pub fn tessellate(&self, tolerance: f64) -> Vec<Point2> {
        let Some(first) = self.segments.first() else {
            return Vec::new();
        };
        let mut points = Vec::with_capacity(self.segments.len() * 2);
        points.push(first.start_point());
        for seg in &self.segments {
            seg.push_points(tolerance, &mut points);
        }
        if self.closed && points.len() > 1 {
            let (a, b) = (points[0], points[points.len() - 1]);
            if points_close(&a, &b, 1e-9) {
                points.pop();
            }
        }
        points
    }

    /// Returns the polyline traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().map(PolylineSegment::reversed).collect(),
            closed: self.closed,
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.segments
            .iter()
            .map(PolylineSegment::bounding_box)
            .reduce(|a, b| a.union(&b))
    }
}
