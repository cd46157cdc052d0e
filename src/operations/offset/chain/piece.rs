//! Trimmable pieces of an offset chain.

use crate::geometry::{Arc, BoundingBox, Geometry, Line, Shape, Spline};
use crate::math::arc_2d::arc_subdivision_count;
use crate::math::{Point2, Vector2, TOLERANCE};

/// Chord tolerance when flattening arcs for approximate intersection.
const ARC_FLATTEN_TOL: f64 = 1e-3;

/// Parameters closer than this to `0` or `1` are treated as piece ends.
pub(super) const END_PARAM_EPS: f64 = 1e-9;

/// Where a piece came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Origin {
    /// Offset of the member at this index.
    Offset(usize),
    /// Connector inserted between two offset pieces.
    Bridge,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum PieceGeometry {
    Line(Line),
    Arc(Arc),
    Spline(Spline),
}

/// One curve of an offset chain. Parameters `t` run over `[0, 1]`; lines and
/// arcs also accept parameters outside that range, which extend them along
/// their carrier.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Piece {
    pub geometry: PieceGeometry,
    pub origin: Origin,
}

impl Piece {
    pub fn line(start: Point2, end: Point2, origin: Origin) -> Self {
        Self {
            geometry: PieceGeometry::Line(Line::new(start, end)),
            origin,
        }
    }

    pub fn arc(arc: Arc, origin: Origin) -> Self {
        Self {
            geometry: PieceGeometry::Arc(arc),
            origin,
        }
    }

    /// Converts offset output into a piece. Circles become full arcs.
    pub fn from_geometry(geometry: &Geometry, origin: Origin) -> Option<Self> {
        let geometry = match geometry {
            Geometry::Line(l) => PieceGeometry::Line(*l),
            Geometry::Arc(a) => PieceGeometry::Arc(*a),
            Geometry::Circle(c) => PieceGeometry::Arc(c.as_arc()),
            Geometry::Spline(s) => PieceGeometry::Spline(s.clone()),
            Geometry::Ellipse(_) | Geometry::Polyline(_) => return None,
        };
        Some(Self { geometry, origin })
    }

    pub fn member(&self) -> Option<usize> {
        match self.origin {
            Origin::Offset(m) => Some(m),
            Origin::Bridge => None,
        }
    }

    pub fn is_spline(&self) -> bool {
        matches!(self.geometry, PieceGeometry::Spline(_))
    }

    pub fn point_at(&self, t: f64) -> Point2 {
        match &self.geometry {
            PieceGeometry::Line(l) => l.point_at(t),
            PieceGeometry::Arc(a) => a.point_at(t),
            PieceGeometry::Spline(s) => s.point_at(spline_param(s, t)),
        }
    }

    pub fn start_point(&self) -> Point2 {
        match &self.geometry {
            PieceGeometry::Line(l) => l.start,
            PieceGeometry::Arc(a) => a.start_point(),
            PieceGeometry::Spline(s) => s.start_point(),
        }
    }

    pub fn end_point(&self) -> Point2 {
        match &self.geometry {
            PieceGeometry::Line(l) => l.end,
            PieceGeometry::Arc(a) => a.end_point(),
            PieceGeometry::Spline(s) => s.end_point(),
        }
    }

    /// Unit tangent at `t` in the direction of travel.
    pub fn tangent_at(&self, t: f64) -> Option<Vector2> {
        match &self.geometry {
            PieceGeometry::Line(l) => {
                let d = l.end - l.start;
                (d.norm() > TOLERANCE).then(|| d.normalize())
            }
            PieceGeometry::Arc(a) => Some(a.tangent_at(t)),
            PieceGeometry::Spline(s) => s.unit_tangent_at(spline_param(s, t)),
        }
    }

    pub fn length(&self) -> f64 {
        match &self.geometry {
            PieceGeometry::Line(l) => l.length(),
            PieceGeometry::Arc(a) => a.length(),
            PieceGeometry::Spline(s) => polyline_length(&s.tessellate(s.default_segments())),
        }
    }

    /// The part of the piece between `t0` and `t1`.
    ///
    /// Splines are clamped to their domain; a failed split leaves the
    /// spline untouched.
    pub fn sub(&self, t0: f64, t1: f64) -> Self {
        let geometry = match &self.geometry {
            PieceGeometry::Line(l) => PieceGeometry::Line(Line::new(l.point_at(t0), l.point_at(t1))),
            PieceGeometry::Arc(a) => {
                let sweep = a.sweep();
                PieceGeometry::Arc(Arc::from_sweep(
                    a.center,
                    a.radius,
                    a.start_angle + sweep * t0,
                    sweep * (t1 - t0),
                ))
            }
            PieceGeometry::Spline(s) => {
                let (t0, t1) = (t0.clamp(0.0, 1.0), t1.clamp(0.0, 1.0));
                if t0 <= END_PARAM_EPS && t1 >= 1.0 - END_PARAM_EPS {
                    PieceGeometry::Spline(s.clone())
                } else {
                    let sub = s
                        .subcurve(spline_param(s, t0), spline_param(s, t1))
                        .map(|mut c| {
                            c.closed = false;
                            c
                        })
                        .unwrap_or_else(|_| s.clone());
                    PieceGeometry::Spline(sub)
                }
            }
        };
        Self {
            geometry,
            origin: self.origin,
        }
    }

    /// Moves the start of a line or spline onto `p`. Arcs cannot move
    /// off their circle and are left as they are; returns whether the piece
    /// was changed.
    pub fn set_start(&mut self, p: Point2) -> bool {
        match &mut self.geometry {
            PieceGeometry::Line(l) => l.start = p,
            PieceGeometry::Spline(s) => match s.control_points.first_mut() {
                Some(c) => *c = p,
                None => return false,
            },
            PieceGeometry::Arc(_) => return false,
        }
        true
    }

    /// Moves the end of a line or spline onto `p`. See [`Piece::set_start`].
    pub fn set_end(&mut self, p: Point2) -> bool {
        match &mut self.geometry {
            PieceGeometry::Line(l) => l.end = p,
            PieceGeometry::Spline(s) => match s.control_points.last_mut() {
                Some(c) => *c = p,
                None => return false,
            },
            PieceGeometry::Arc(_) => return false,
        }
        true
    }

    /// The same curve traversed backwards.
    pub fn reversed(&self) -> Self {
        let geometry = match &self.geometry {
            PieceGeometry::Line(l) => PieceGeometry::Line(l.reversed()),
            PieceGeometry::Arc(a) => PieceGeometry::Arc(a.reversed()),
            PieceGeometry::Spline(s) => PieceGeometry::Spline(s.reversed()),
        };
        Self {
            geometry,
            origin: self.origin,
        }
    }

    pub fn is_movable(&self) -> bool {
        !matches!(self.geometry, PieceGeometry::Arc(_))
    }

    /// Points with their parameters, dense enough for intersection tests.
    pub fn flatten(&self) -> Vec<(Point2, f64)> {
        let n = match &self.geometry {
            PieceGeometry::Line(_) => 1,
            PieceGeometry::Arc(a) => arc_subdivision_count(a.radius, a.sweep().abs(), ARC_FLATTEN_TOL),
            PieceGeometry::Spline(s) => (s.control_points.len() * 8).clamp(32, 256),
        };
        (0..=n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f64 / n as f64;
                (self.point_at(t), t)
            })
            .collect()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match &self.geometry {
            PieceGeometry::Line(l) => l.bounding_box(),
            PieceGeometry::Arc(a) => a.bounding_box(),
            PieceGeometry::Spline(s) => {
                // The control polygon contains the curve.
                BoundingBox::from_points(&s.control_points)
                    .unwrap_or_else(|| BoundingBox::new(s.start_point(), s.end_point()))
            }
        }
    }

    pub fn into_shape(self) -> Shape {
        Shape::new(match self.geometry {
            PieceGeometry::Line(l) => Geometry::Line(l),
            PieceGeometry::Arc(a) => Geometry::Arc(a),
            PieceGeometry::Spline(s) => Geometry::Spline(s),
        })
    }
}

fn spline_param(s: &Spline, t: f64) -> f64 {
    let (lo, hi) = s.domain();
    lo + (hi - lo) * t.clamp(0.0, 1.0)
}

pub(super) fn polyline_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Points of consecutive pieces without repeated junction points.
pub(super) fn outline(pieces: &[Piece]) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::new();
    for piece in pieces {
        let pts = piece.flatten();
        let skip = usize::from(matches!(
            (out.last(), pts.first()),
            (Some(a), Some((b, _))) if (a - b).norm() < 1e-9
        ));
        out.extend(pts.into_iter().skip(skip).map(|(p, _)| p));
    }
    out
}
