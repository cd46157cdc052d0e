use std::cmp::Ordering;
use std::ops::Range;

use crate::math::intersect_2d::{
    arc_arc_intersect_2d, line_arc_intersect_2d, segment_segment_intersect_2d,
};
use crate::math::Point2;

use super::piece::{Piece, PieceGeometry, END_PARAM_EPS};

/// A crossing between two non-adjacent pieces of an offset chain.
#[derive(Debug, Clone)]
pub(super) struct Intersection {
    /// Index of the first piece.
    pub piece_i: usize,
    /// Index of the second piece (always > `piece_i`).
    pub piece_j: usize,
    pub t_i: f64,
    pub t_j: f64,
    pub point: Point2,
}

/// Bounded intersections of two pieces as `(point, t_a, t_b)`.
///
/// Lines and arcs are intersected analytically unless `approximate` is set;
/// splines are always intersected through their flattened form.
pub(super) fn between(a: &Piece, b: &Piece, approximate: bool) -> Vec<(Point2, f64, f64)> {
    if !a.bounding_box().overlaps(&b.bounding_box(), 1e-9) {
        return Vec::new();
    }
    if approximate || a.is_spline() || b.is_spline() {
        return flattened(a, b);
    }
    match (&a.geometry, &b.geometry) {
        (PieceGeometry::Line(la), PieceGeometry::Line(lb)) => {
            segment_segment_intersect_2d(&la.start, &la.end, &lb.start, &lb.end)
                .into_iter()
                .collect()
        }
        (PieceGeometry::Line(l), PieceGeometry::Arc(arc)) => line_arc_intersect_2d(
            &l.start,
            &l.end,
            &arc.center,
            arc.radius,
            arc.start_angle,
            arc.sweep(),
        ),
        (PieceGeometry::Arc(arc), PieceGeometry::Line(l)) => line_arc_intersect_2d(
            &l.start,
            &l.end,
            &arc.center,
            arc.radius,
            arc.start_angle,
            arc.sweep(),
        )
        .into_iter()
        .map(|(pt, t_line, t_arc)| (pt, t_arc, t_line))
        .collect(),
        (PieceGeometry::Arc(a1), PieceGeometry::Arc(a2)) => arc_arc_intersect_2d(
            &a1.center,
            a1.radius,
            a1.start_angle,
            a1.sweep(),
            &a2.center,
            a2.radius,
            a2.start_angle,
            a2.sweep(),
        ),
        _ => flattened(a, b),
    }
}

/// Intersections of the flattened pieces; parameters are interpolated
/// within the hit segments.
fn flattened(a: &Piece, b: &Piece) -> Vec<(Point2, f64, f64)> {
    let pa = a.flatten();
    let pb = b.flatten();
    let mut hits: Vec<(Point2, f64, f64)> = Vec::new();
    for wa in pa.windows(2) {
        for wb in pb.windows(2) {
            let Some((pt, s, u)) = segment_segment_intersect_2d(&wa[0].0, &wa[1].0, &wb[0].0, &wb[1].0)
            else {
                continue;
            };
            let ta = wa[0].1 + (wa[1].1 - wa[0].1) * s;
            let tb = wb[0].1 + (wb[1].1 - wb[0].1) * u;
            // A hit on a shared flattening vertex shows up in both segments.
            if hits.iter().any(|(q, _, _)| (q - pt).norm() < 1e-9) {
                continue;
            }
            hits.push((pt, ta, tb));
        }
    }
    hits
}

fn at_end(t: f64) -> bool {
    !(END_PARAM_EPS..=1.0 - END_PARAM_EPS).contains(&t)
}

/// Finds crossings between non-adjacent pieces.
///
/// Touches at piece ends are not reported. For closed chains the first and
/// last pieces are adjacent.
pub(super) fn find_all(pieces: &[Piece], closed: bool, approximate: bool) -> Vec<Intersection> {
    let n = pieces.len();
    if n < 3 {
        return Vec::new();
    }
    find_where(pieces, approximate, |i, j| j == i + 1 || (closed && i == 0 && j == n - 1))
}

/// Finds crossings in pieces laid out as several closed rings.
///
/// Pieces are adjacent only within their own ring, where the first and last
/// pieces also meet. Crossings between rings are always reported.
pub(super) fn find_in_rings(pieces: &[Piece], rings: &[Range<usize>], approximate: bool) -> Vec<Intersection> {
    let ring_of = |k: usize| rings.iter().find(|r| r.contains(&k));
    find_where(pieces, approximate, |i, j| match (ring_of(i), ring_of(j)) {
        (Some(a), Some(b)) if a == b => j == i + 1 || (i == a.start && j + 1 == a.end),
        _ => false,
    })
}

fn find_where(
    pieces: &[Piece],
    approximate: bool,
    adjacent: impl Fn(usize, usize) -> bool,
) -> Vec<Intersection> {
    let n = pieces.len();
    let mut results = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if adjacent(i, j) {
                continue;
            }
            for (point, t_i, t_j) in between(&pieces[i], &pieces[j], approximate) {
                if at_end(t_i) || at_end(t_j) {
                    continue;
                }
                results.push(Intersection {
                    piece_i: i,
                    piece_j: j,
                    t_i,
                    t_j,
                    point,
                });
            }
        }
    }
    results.sort_by(|a, b| {
        a.piece_i
            .cmp(&b.piece_i)
            .then(a.t_i.partial_cmp(&b.t_i).unwrap_or(Ordering::Equal))
    });
    results
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::piece::Origin;
    use super::*;
    use crate::geometry::{Arc, Spline};
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn line(a: (f64, f64), b: (f64, f64)) -> Piece {
        Piece::line(p(a.0, a.1), p(b.0, b.1), Origin::Bridge)
    }

    #[test]
    fn bow_tie_crosses_once() {
        let pieces = vec![
            line((0.0, 0.0), (4.0, 4.0)),
            line((4.0, 4.0), (4.0, 0.0)),
            line((4.0, 0.0), (0.0, 4.0)),
            line((0.0, 4.0), (0.0, 0.0)),
        ];
        let hits = find_all(&pieces, true, false);
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].piece_i, hits[0].piece_j), (0, 2));
        assert_abs_diff_eq!(hits[0].t_i, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!((hits[0].point - p(2.0, 2.0)).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rings_cross_each_other_but_not_their_neighbours() {
        let pieces = vec![
            line((0.0, 0.0), (4.0, 0.0)),
            line((4.0, 0.0), (4.0, 4.0)),
            line((4.0, 4.0), (0.0, 0.0)),
            line((2.0, -1.0), (2.0, 5.0)),
            line((2.0, 5.0), (3.0, 5.0)),
            line((3.0, 5.0), (2.0, -1.0)),
        ];
        let hits = find_in_rings(&pieces, &[0..3, 3..6], false);
        // The vertical line cuts the bottom edge and the diagonal; the
        // slanted return leg cuts the same two.
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|h| h.piece_i < 3 && h.piece_j >= 3));
    }

    #[test]
    fn square_has_no_crossings() {
        let pieces = vec![
            line((0.0, 0.0), (4.0, 0.0)),
            line((4.0, 0.0), (4.0, 4.0)),
            line((4.0, 4.0), (0.0, 4.0)),
            line((0.0, 4.0), (0.0, 0.0)),
        ];
        assert!(find_all(&pieces, true, false).is_empty());
    }

    #[test]
    fn arc_line_parameters_are_ordered() {
        let arc = Piece::arc(Arc::new(p(0.0, 0.0), 2.0, 0.0, std::f64::consts::PI, false), Origin::Bridge);
        let l = line((-3.0, 1.0), (3.0, 1.0));
        let hits = between(&arc, &l, false);
        assert_eq!(hits.len(), 2);
        for (pt, t_arc, t_line) in hits {
            assert_abs_diff_eq!((arc.point_at(t_arc) - pt).norm(), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!((l.point_at(t_line) - pt).norm(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn approximate_matches_analytic_closely() {
        let arc = Piece::arc(Arc::new(p(0.0, 0.0), 2.0, 0.0, std::f64::consts::PI, false), Origin::Bridge);
        let l = line((-3.0, 1.0), (3.0, 1.0));
        let exact = between(&arc, &l, false);
        let approx_hits = between(&arc, &l, true);
        assert_eq!(approx_hits.len(), exact.len());
        for a in &approx_hits {
            assert!(exact.iter().any(|x| (x.0 - a.0).norm() < 1e-2), "{a:?}");
        }
    }

    #[test]
    fn spline_crossing_a_line() {
        let s = Spline::new(
            vec![p(0.0, -1.0), p(1.0, 3.0), p(3.0, 3.0), p(4.0, -1.0)],
            3,
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        );
        let sp = Piece {
            geometry: PieceGeometry::Spline(s),
            origin: Origin::Bridge,
        };
        let l = line((-1.0, 0.0), (5.0, 0.0));
        let hits = between(&sp, &l, false);
        assert_eq!(hits.len(), 2);
        for (pt, ts, _) in hits {
            assert!(pt.y.abs() < 1e-9);
            assert!((sp.point_at(ts) - pt).norm() < 1e-2);
        }
    }
}
