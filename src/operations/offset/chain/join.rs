//! Reconnecting neighbouring offset pieces.
//!
//! Offsets of adjacent members rarely meet exactly: at concave corners they
//! overlap, at convex corners they leave a gap. Each neighbour pair is
//! repaired by the first rule that applies:
//!
//! 1. ends already coincide;
//! 2. the pieces cross near the joint: trim both back to the crossing;
//! 3. [`IntersectionType::True`]: extend lines and arcs along their carriers
//!    until they meet, within `max_extension`;
//! 4. ends within `snap_threshold`: move them together;
//! 5. `polyline_intersections`: round the corner with an arc about the
//!    source vertex;
//! 6. bridge the gap with a straight line.

use std::f64::consts::TAU;

use tracing::{debug, warn};

use crate::geometry::Arc;
use crate::math::arc_2d::{ccw_span, normalize_angle};
use crate::math::intersect_2d::{
    circle_circle_intersect_2d, line_circle_intersect_2d, line_line_intersect_2d,
};
use crate::math::{cross, Point2, POINT_TOLERANCE};

use super::members::Member;
use super::params::{ChainOffsetParameters, IntersectionType};
use super::piece::{Origin, Piece, PieceGeometry, END_PARAM_EPS};
use super::result::{IntersectionKind, IntersectionPoint};
use super::self_intersect;

/// Pieces shorter than this are dropped after joining.
const MIN_PIECE_LENGTH: f64 = 1e-9;

/// Counters and diagnostics collected while joining.
#[derive(Debug, Default)]
pub(super) struct JoinReport {
    pub gaps_filled: usize,
    pub overlaps_trimmed: usize,
    pub points: Vec<IntersectionPoint>,
    pub warnings: Vec<String>,
}

/// How one joint was repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Coincident,
    Trimmed,
    Extended,
    Snapped,
    Rounded,
    Bridged,
}

/// Context shared by every joint of one chain.
struct Joiner<'a> {
    members: &'a [Member],
    abs_distance: f64,
    params: &'a ChainOffsetParameters,
}

/// Joins consecutive pieces (and the last to the first when `closed`),
/// returning the connected sequence with any inserted connectors.
pub(super) fn connect(
    mut pieces: Vec<Piece>,
    members: &[Member],
    closed: bool,
    abs_distance: f64,
    params: &ChainOffsetParameters,
    report: &mut JoinReport,
) -> Vec<Piece> {
    let n = pieces.len();
    if n == 0 {
        return pieces;
    }
    let joiner = Joiner {
        members,
        abs_distance,
        params,
    };
    let mut connectors: Vec<Option<Piece>> = vec![None; n];
    let joint_count = if closed { n } else { n - 1 };

    for i in 0..joint_count {
        let j = (i + 1) % n;
        let (kind, connector) = if i == j {
            let mut only = pieces[i].clone();
            let mut same = pieces[i].clone();
            let out = joiner.join_gap(&mut only, &mut same, i);
            pieces[i] = only;
            pieces[i].set_start(same.start_point());
            out
        } else {
            let mut a = pieces[i].clone();
            let mut b = pieces[j].clone();
            let out = joiner.join(&mut a, &mut b, i, report);
            pieces[i] = a;
            pieces[j] = b;
            out
        };
        match kind {
            JoinKind::Coincident => {}
            JoinKind::Trimmed => report.overlaps_trimmed += 1,
            JoinKind::Extended | JoinKind::Snapped | JoinKind::Rounded | JoinKind::Bridged => {
                report.gaps_filled += 1;
            }
        }
        if kind == JoinKind::Bridged {
            if let Some(c) = &connector {
                let gap = c.length();
                if gap > params.max_extension {
                    warn!(gap, joint = i, "bridging gap wider than max extension");
                    report.warnings.push(format!(
                        "Gap of {gap:.4} after shape {} exceeds max extension {}; bridged with a line",
                        joiner.shape_index(&pieces[i]).unwrap_or(i),
                        params.max_extension
                    ));
                }
            }
        }
        debug!(joint = i, ?kind, "joined offset pieces");
        connectors[i] = connector;
    }

    let mut out = Vec::with_capacity(n + connectors.iter().flatten().count());
    for (piece, connector) in pieces.into_iter().zip(connectors) {
        out.push(piece);
        out.extend(connector);
    }
    out.retain(|p| p.length() >= MIN_PIECE_LENGTH);
    out
}

impl Joiner<'_> {
    fn shape_index(&self, piece: &Piece) -> Option<usize> {
        piece.member().map(|m| self.members[m].shape_index)
    }

    /// Source vertex shared by the members behind `a` and its successor.
    fn joint_vertex(&self, a: &Piece, fallback: Point2) -> Point2 {
        a.member()
            .map_or(fallback, |m| self.members[m].end_point())
    }

    fn record(&self, a: &Piece, b: &Piece, point: Point2, report: &mut JoinReport) {
        let mut shape_indices: Vec<usize> = [a, b].iter().filter_map(|p| self.shape_index(p)).collect();
        shape_indices.dedup();
        report.points.push(IntersectionPoint {
            point,
            kind: IntersectionKind::Join,
            shape_indices,
        });
    }

    fn join(&self, a: &mut Piece, b: &mut Piece, joint: usize, report: &mut JoinReport) -> (JoinKind, Option<Piece>) {
        let gap = (a.end_point() - b.start_point()).norm();
        if gap <= POINT_TOLERANCE {
            weld(a, b);
            return (JoinKind::Coincident, None);
        }
        let vertex = self.joint_vertex(a, a.end_point());
        let approximate = self.params.intersection_type == IntersectionType::Approximate;

        if let Some((point, ta, tb)) = nearest(
            self_intersect::between(a, b, approximate)
                .into_iter()
                .filter(|(_, ta, tb)| *ta > END_PARAM_EPS && *tb < 1.0 - END_PARAM_EPS),
            &vertex,
        ) {
            *a = a.sub(0.0, ta);
            *b = b.sub(tb, 1.0);
            a.set_end(point);
            b.set_start(point);
            self.record(a, b, point, report);
            return (JoinKind::Trimmed, None);
        }

        if !approximate {
            if let Some((point, ta, tb)) = self.extension(a, b, &vertex) {
                *a = a.sub(0.0, ta);
                *b = b.sub(tb, 1.0);
                a.set_end(point);
                b.set_start(point);
                self.record(a, b, point, report);
                return (JoinKind::Extended, None);
            }
        }

        self.join_gap(a, b, joint)
    }

    /// Rules that close a gap without moving along the pieces.
    fn join_gap(&self, a: &mut Piece, b: &mut Piece, joint: usize) -> (JoinKind, Option<Piece>) {
        let (end, start) = (a.end_point(), b.start_point());
        let gap = (end - start).norm();
        if gap <= POINT_TOLERANCE {
            weld(a, b);
            return (JoinKind::Coincident, None);
        }

        if gap <= self.params.snap_threshold && (a.is_movable() || b.is_movable()) {
            match (a.is_movable(), b.is_movable()) {
                (true, true) => {
                    let mid = Point2::from((end.coords + start.coords) * 0.5);
                    a.set_end(mid);
                    b.set_start(mid);
                }
                (true, false) => {
                    a.set_end(start);
                }
                _ => {
                    b.set_start(end);
                }
            }
            return (JoinKind::Snapped, None);
        }

        if self.params.polyline_intersections {
            let vertex = self.joint_vertex(a, end);
            if let Some(arc) = self.rounding_arc(a, &vertex, &end, &start) {
                b.set_start(arc.end_point());
                return (JoinKind::Rounded, Some(Piece::arc(arc, Origin::Bridge)));
            }
        }

        debug!(joint, gap, "bridging offset gap");
        (JoinKind::Bridged, Some(Piece::line(end, start, Origin::Bridge)))
    }

    /// Arc about the source vertex from the end of `a` to `start`, when both
    /// points sit at the offset distance from the vertex.
    fn rounding_arc(&self, a: &Piece, vertex: &Point2, end: &Point2, start: &Point2) -> Option<Arc> {
        let (ra, rb) = ((end - vertex).norm(), (start - vertex).norm());
        let tol = self.params.tolerance;
        if (ra - self.abs_distance).abs() > tol || (rb - self.abs_distance).abs() > tol {
            return None;
        }
        let tangent = a.tangent_at(1.0)?;
        let angle_a = (end.y - vertex.y).atan2(end.x - vertex.x);
        let angle_b = (start.y - vertex.y).atan2(start.x - vertex.x);
        let ccw = cross(&(end - vertex), &tangent) > 0.0;
        let sweep = if ccw {
            ccw_span(angle_a, angle_b)
        } else {
            -ccw_span(angle_b, angle_a)
        };
        Some(Arc::from_sweep(*vertex, ra, angle_a, sweep))
    }

    /// Where the carriers of `a` and `b` meet, as `(point, t_a, t_b)` with
    /// `a` kept on `[0, t_a]` and `b` on `[t_b, 1]`.
    fn extension(&self, a: &Piece, b: &Piece, vertex: &Point2) -> Option<(Point2, f64, f64)> {
        let candidates: Vec<(Point2, f64, f64)> = match (&a.geometry, &b.geometry) {
            (PieceGeometry::Line(la), PieceGeometry::Line(lb)) => {
                let (da, db) = (la.end - la.start, lb.end - lb.start);
                line_line_intersect_2d(&la.start, &da, &lb.start, &db)
                    .map(|(ta, tb)| (la.start + da * ta, ta, tb))
                    .into_iter()
                    .collect()
            }
            (PieceGeometry::Line(l), PieceGeometry::Arc(arc)) => {
                line_circle_intersect_2d(&l.start, &l.end, &arc.center, arc.radius)
                    .into_iter()
                    .map(|(p, t)| (p, t, carrier_start_param(arc, &p)))
                    .collect()
            }
            (PieceGeometry::Arc(arc), PieceGeometry::Line(l)) => {
                line_circle_intersect_2d(&l.start, &l.end, &arc.center, arc.radius)
                    .into_iter()
                    .map(|(p, t)| (p, carrier_end_param(arc, &p), t))
                    .collect()
            }
            (PieceGeometry::Arc(a1), PieceGeometry::Arc(a2)) => {
                circle_circle_intersect_2d(&a1.center, a1.radius, &a2.center, a2.radius)
                    .into_iter()
                    .map(|p| (p, carrier_end_param(a1, &p), carrier_start_param(a2, &p)))
                    .collect()
            }
            _ => return None,
        };

        let (len_a, len_b) = (a.length(), b.length());
        let reach = |t: f64, len: f64| if t > 1.0 { (t - 1.0) * len } else { 0.0 };
        let valid = candidates.into_iter().filter(|(_, ta, tb)| {
            *ta > END_PARAM_EPS
                && *tb < 1.0 - END_PARAM_EPS
                && reach(*ta, len_a) <= self.params.max_extension
                && reach(1.0 - *tb, len_b) <= self.params.max_extension
        });
        nearest(valid, vertex)
    }
}

/// Makes coincident ends exactly equal where a piece can move.
fn weld(a: &mut Piece, b: &mut Piece) {
    if b.is_movable() {
        b.set_start(a.end_point());
    } else if a.is_movable() {
        a.set_end(b.start_point());
    }
}

/// Candidate closest to `vertex`.
fn nearest(
    candidates: impl Iterator<Item = (Point2, f64, f64)>,
    vertex: &Point2,
) -> Option<(Point2, f64, f64)> {
    candidates.min_by(|x, y| {
        (x.0 - vertex)
            .norm()
            .total_cmp(&(y.0 - vertex).norm())
    })
}

/// Angle travelled from the arc start to `p`, in `[0, 2π)`.
fn travel_angle(arc: &Arc, p: &Point2) -> f64 {
    let angle = (p.y - arc.center.y).atan2(p.x - arc.center.x);
    if arc.sweep() >= 0.0 {
        normalize_angle(angle - arc.start_angle)
    } else {
        normalize_angle(arc.start_angle - angle)
    }
}

/// Parameter of `p` when the arc may only grow past its end.
fn carrier_end_param(arc: &Arc, p: &Point2) -> f64 {
    travel_angle(arc, p) / arc.sweep().abs()
}

/// Parameter of `p` when the arc may only grow before its start.
fn carrier_start_param(arc: &Arc, p: &Point2) -> f64 {
    let span = arc.sweep().abs();
    let delta = travel_angle(arc, p);
    if delta <= span {
        delta / span
    } else {
        -(TAU - delta) / span
    }
}
