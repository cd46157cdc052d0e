//! Flattening and orientation of chain members.

use tracing::{debug, trace};

use crate::geometry::{Chain, Ellipse, Geometry, PolylineSegment, ShapeKind};
use crate::math::arc_2d::arc_subdivision_count;
use crate::math::distance_2d::{point_to_arc_dist, point_to_points_dist, point_to_segment_dist};
use crate::math::polygon_2d::{signed_area_2d, winding_number_2d};
use crate::math::{Point2, TOLERANCE};

/// Tessellation tolerance for source curves without a closed-form distance.
const SOURCE_TESSELLATION_TOL: f64 = 1e-3;

/// One offsettable curve of the source chain, in traversal order.
#[derive(Debug, Clone)]
pub(super) struct Member {
    /// Index of the chain shape this member came from.
    pub shape_index: usize,
    /// Kind of that chain shape (polyline segments report `polyline`).
    pub kind: ShapeKind,
    /// Segment index within a polyline shape.
    pub segment: Option<usize>,
    /// Line, arc, ellipse or spline geometry. Lines, arcs and splines are
    /// stored already reversed when `reversed` is set; ellipses are stored as
    /// given.
    pub geometry: Geometry,
    pub reversed: bool,
}

impl Member {
    /// Prefix for messages about this member, e.g. `Shape 2 (arc)` or
    /// `Shape 0 (polyline) segment 3 (arc)`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.segment {
            Some(segment) => format!(
                "Shape {} ({}) segment {segment} ({})",
                self.shape_index,
                self.kind,
                self.geometry.kind()
            ),
            None => format!("Shape {} ({})", self.shape_index, self.kind),
        }
    }

    fn raw_endpoints(&self) -> (Point2, Point2) {
        match &self.geometry {
            Geometry::Line(l) => (l.start, l.end),
            Geometry::Arc(a) => (a.start_point(), a.end_point()),
            Geometry::Ellipse(e) => (e.start_point(), e.end_point()),
            Geometry::Spline(s) => (s.start_point(), s.end_point()),
            Geometry::Circle(c) => {
                let p = c.point_at_angle(0.0);
                (p, p)
            }
            Geometry::Polyline(p) => match (p.start_point(), p.end_point()) {
                (Some(a), Some(b)) => (a, b),
                _ => (Point2::origin(), Point2::origin()),
            },
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        let (s, e) = self.raw_endpoints();
        if self.flipped_ellipse() {
            e
        } else {
            s
        }
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        let (s, e) = self.raw_endpoints();
        if self.flipped_ellipse() {
            s
        } else {
            e
        }
    }

    fn flipped_ellipse(&self) -> bool {
        self.reversed && matches!(self.geometry, Geometry::Ellipse(_))
    }

    fn reverse(&mut self) {
        self.reversed = !self.reversed;
        self.geometry = match &self.geometry {
            Geometry::Line(l) => Geometry::Line(l.reversed()),
            Geometry::Arc(a) => Geometry::Arc(a.reversed()),
            Geometry::Spline(s) => Geometry::Spline(s.reversed()),
            other => other.clone(),
        };
    }

    /// Points along the member in traversal order.
    fn tessellate(&self) -> Vec<Point2> {
        let mut pts = match &self.geometry {
            Geometry::Line(l) => vec![l.start, l.end],
            Geometry::Arc(a) => {
                let n = arc_subdivision_count(a.radius, a.sweep().abs(), SOURCE_TESSELLATION_TOL);
                (0..=n)
                    .map(|i| {
                        #[allow(clippy::cast_precision_loss)]
                        let t = i as f64 / n as f64;
                        a.point_at(t)
                    })
                    .collect()
            }
            Geometry::Ellipse(e) => e.tessellate(ellipse_segments(e)),
            Geometry::Spline(s) => s.tessellate(s.default_segments()),
            Geometry::Circle(_) | Geometry::Polyline(_) => Vec::new(),
        };
        if self.flipped_ellipse() {
            pts.reverse();
        }
        pts
    }
}

fn ellipse_segments(e: &Ellipse) -> usize {
    let (start, end) = e.param_range();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = ((end - start).abs() * 64.0).ceil() as usize;
    n.clamp(16, 1024)
}

/// Shapes that break their own invariants, as
/// `"Shape <index> (<kind>): <message>"`.
///
/// Splines are the only shapes whose evaluation depends on valid data, so
/// they are checked before anything reads their endpoints.
pub(super) fn invalid_shapes(chain: &Chain) -> Vec<String> {
    chain
        .shapes
        .iter()
        .enumerate()
        .filter_map(|(index, shape)| match &shape.geometry {
            Geometry::Spline(s) => s
                .validate()
                .err()
                .map(|e| format!("Shape {index} ({}): {e}", shape.kind())),
            _ => None,
        })
        .collect()
}

/// Splits chain shapes into members: polylines become one member per
/// segment and circles become full counter-clockwise arcs.
///
/// Callers reject [`invalid_shapes`] first.
pub(super) fn flatten(chain: &Chain) -> Vec<Member> {
    let mut members = Vec::with_capacity(chain.len());
    for (shape_index, shape) in chain.shapes.iter().enumerate() {
        let kind = shape.kind();
        let member = |geometry, segment| Member {
            shape_index,
            kind,
            segment,
            geometry,
            reversed: false,
        };
        match &shape.geometry {
            Geometry::Polyline(p) => {
                for (i, seg) in p.segments.iter().enumerate() {
                    match seg {
                        PolylineSegment::Line(l) if l.length() < TOLERANCE => {
                            trace!(shape_index, segment = i, "dropping zero-length polyline segment");
                        }
                        PolylineSegment::Line(l) => members.push(member(Geometry::Line(*l), Some(i))),
                        PolylineSegment::Arc(a) => members.push(member(Geometry::Arc(*a), Some(i))),
                    }
                }
            }
            Geometry::Circle(c) => members.push(member(Geometry::Arc(c.as_arc()), None)),
            other => members.push(member(other.clone(), None)),
        }
    }
    members
}

/// Reverses members so each one starts where the previous one ends.
///
/// A member is reversed only when its end, and not its start, lies within
/// `snap` of the previous member's end. The first member is oriented against
/// the second.
pub(super) fn orient(members: &mut [Member], snap: f64) {
    if members.len() < 2 {
        return;
    }
    let touches = |p: &Point2, q: &Point2| (p - q).norm() <= snap;

    let (next_s, next_e) = (members[1].start_point(), members[1].end_point());
    let first_end = members[0].end_point();
    let first_start = members[0].start_point();
    let end_joins = touches(&first_end, &next_s) || touches(&first_end, &next_e);
    let start_joins = touches(&first_start, &next_s) || touches(&first_start, &next_e);
    if !end_joins && start_joins {
        debug!(shape = members[0].shape_index, "reversing first chain member");
        members[0].reverse();
    }

    for i in 1..members.len() {
        let prev_end = members[i - 1].end_point();
        let m = &members[i];
        if !touches(&m.start_point(), &prev_end) && touches(&m.end_point(), &prev_end) {
            debug!(shape = m.shape_index, "reversing chain member");
            members[i].reverse();
        }
    }
}

/// Whether the oriented members form a closed loop.
pub(super) fn is_closed(members: &[Member], snap: f64) -> bool {
    match members {
        [] => false,
        [only] => match &only.geometry {
            Geometry::Arc(a) => (a.sweep().abs() - std::f64::consts::TAU).abs() < 1e-9,
            Geometry::Ellipse(e) => e.is_full(),
            Geometry::Spline(s) => s.closed || (s.start_point() - s.end_point()).norm() <= snap,
            _ => false,
        },
        [first, .., last] => (first.start_point() - last.end_point()).norm() <= snap,
    }
}

/// Source chain geometry in a form suited to distance queries.
pub(super) struct SourceProfile {
    curves: Vec<SourceCurve>,
    outline: Vec<Point2>,
}

enum SourceCurve {
    Segment(Point2, Point2),
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
    Points(Vec<Point2>),
}

impl SourceProfile {
    pub fn new(members: &[Member]) -> Self {
        let mut outline: Vec<Point2> = Vec::new();
        let curves = members
            .iter()
            .map(|m| {
                let pts = m.tessellate();
                let skip = usize::from(matches!(
                    (outline.last(), pts.first()),
                    (Some(a), Some(b)) if (a - b).norm() < 1e-9
                ));
                outline.extend(pts.iter().skip(skip));
                match &m.geometry {
                    Geometry::Line(l) => SourceCurve::Segment(l.start, l.end),
                    Geometry::Arc(a) => SourceCurve::Arc {
                        center: a.center,
                        radius: a.radius,
                        start_angle: a.start_angle,
                        sweep: a.sweep(),
                    },
                    _ => SourceCurve::Points(pts),
                }
            })
            .collect();
        Self { curves, outline }
    }

    /// Shortest distance from `p` to any source curve.
    pub fn distance(&self, p: &Point2) -> f64 {
        self.curves
            .iter()
            .map(|c| match c {
                SourceCurve::Segment(a, b) => point_to_segment_dist(p, a, b),
                SourceCurve::Arc {
                    center,
                    radius,
                    start_angle,
                    sweep,
                } => point_to_arc_dist(p, center, *radius, *start_angle, *sweep),
                SourceCurve::Points(pts) => point_to_points_dist(p, pts),
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Signed area enclosed by the source, positive counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.outline)
    }

    /// Outline points of a closed source without the repeated closing point.
    pub fn ring(&self) -> &[Point2] {
        match self.outline.as_slice() {
            [first, rest @ .., last] if !rest.is_empty() && (first - last).norm() < 1e-9 => {
                &self.outline[..self.outline.len() - 1]
            }
            all => all,
        }
    }

    /// Whether `p` lies in the region enclosed by a closed source, counting
    /// every area with a non-zero winding number.
    pub fn contains(&self, p: &Point2) -> bool {
        winding_number_2d(p, self.ring()) != 0
    }
}
