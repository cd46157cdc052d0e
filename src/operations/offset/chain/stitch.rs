use super::piece::Piece;
use super::slice::Slice;

/// Squared distance under which slice ends are joined.
const JOIN_TOL_SQ: f64 = 1e-8;

/// A stitched run of pieces.
#[derive(Debug, Clone)]
pub(super) struct Loop {
    pub pieces: Vec<Piece>,
    pub closed: bool,
}

/// Stitches slices back together by matching each run's end to an unused
/// slice starting at the same point, preferring one cut at the same crossing.
///
/// A run stops growing once its end returns to its start; it is then closed.
#[must_use]
pub(super) fn connect(slices: Vec<Slice>) -> Vec<Loop> {
    let n = slices.len();
    let mut used = vec![false; n];
    let mut results = Vec::new();

    for start in 0..n {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut run: Vec<Piece> = slices[start].pieces.clone();
        let mut end_hit = slices[start].end_hit;
        let Some(run_start) = run.first().map(Piece::start_point) else {
            continue;
        };

        while let Some(end_pt) = run.last().map(Piece::end_point) {
            if (end_pt - run_start).norm_squared() < JOIN_TOL_SQ {
                break;
            }
            let mut best: Option<(usize, bool, f64)> = None;
            for (candidate, slice) in slices.iter().enumerate() {
                if used[candidate] {
                    continue;
                }
                let Some(first) = slice.pieces.first() else {
                    continue;
                };
                let dist_sq = (first.start_point() - end_pt).norm_squared();
                if dist_sq >= JOIN_TOL_SQ {
                    continue;
                }
                let same_hit = end_hit.is_some() && slice.start_hit == end_hit;
                let better = match best {
                    None => true,
                    Some((_, best_hit, best_dist)) => {
                        (same_hit && !best_hit) || (same_hit == best_hit && dist_sq < best_dist)
                    }
                };
                if better {
                    best = Some((candidate, same_hit, dist_sq));
                }
            }
            let Some((next, _, _)) = best else { break };
            used[next] = true;
            end_hit = slices[next].end_hit;
            let mut pieces = slices[next].pieces.clone();
            if let Some(first) = pieces.first_mut() {
                first.set_start(end_pt);
            }
            run.extend(pieces);
        }

        let Some(last) = run.last() else {
            continue;
        };
        let closed = (last.end_point() - run_start).norm_squared() < JOIN_TOL_SQ;
        results.push(Loop { pieces: run, closed });
    }
    results
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::piece::Origin;
    use super::*;
    use crate::math::Point2;

    fn slice(points: &[(f64, f64)]) -> Slice {
        let pieces = points
            .windows(2)
            .map(|w| Piece::line(Point2::new(w[0].0, w[0].1), Point2::new(w[1].0, w[1].1), Origin::Bridge))
            .collect();
        Slice {
            pieces,
            start_hit: None,
            end_hit: None,
        }
    }

    #[test]
    fn joins_out_of_order_slices_into_a_loop() {
        let loops = connect(vec![
            slice(&[(0.0, 0.0), (1.0, 0.0)]),
            slice(&[(1.0, 1.0), (0.0, 0.0)]),
            slice(&[(1.0, 0.0), (1.0, 1.0)]),
        ]);
        assert_eq!(loops.len(), 1);
        assert!(loops[0].closed);
        assert_eq!(loops[0].pieces.len(), 3);
    }

    #[test]
    fn disjoint_slices_stay_apart() {
        let loops = connect(vec![
            slice(&[(0.0, 0.0), (1.0, 0.0)]),
            slice(&[(5.0, 0.0), (6.0, 0.0)]),
        ]);
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| !l.closed));
    }

    #[test]
    fn closed_lobes_are_not_merged() {
        let mut lobes = vec![
            slice(&[(2.0, 2.0), (4.0, 4.0), (4.0, 0.0), (2.0, 2.0)]),
            slice(&[(2.0, 2.0), (0.0, 4.0), (0.0, 0.0), (2.0, 2.0)]),
        ];
        for lobe in &mut lobes {
            lobe.start_hit = Some(0);
            lobe.end_hit = Some(0);
        }
        let loops = connect(lobes);
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| l.closed && l.pieces.len() == 3));
    }
}
