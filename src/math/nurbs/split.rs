//! Knot insertion and curve subdivision.

use super::basis::find_span;
use super::knots::{distinct_interior, multiplicity};
use super::{from_homogeneous, CurveData, CurveView};
use crate::error::{OperationError, Result};

/// Relative epsilon for matching an existing knot value.
const KNOT_EPS: f64 = 1e-12;

/// Inserts `u` into the knot vector `times` times (Boehm's algorithm,
/// NURBS Book A5.1). The curve shape is unchanged.
///
/// Insertions beyond multiplicity `degree` are ignored.
#[must_use]
#[allow(clippy::needless_range_loop)]
pub fn insert_knot(curve: &CurveView<'_>, u: f64, times: usize) -> CurveData {
    let p = curve.degree;
    let np = curve.control_points.len() - 1;
    let span_eps = KNOT_EPS * (curve.knots[np + 1] - curve.knots[p]).abs().max(1.0);
    let s = multiplicity(curve.knots, u, span_eps);
    let r = times.min(p.saturating_sub(s));
    let pw = curve.homogeneous();
    if r == 0 {
        return CurveData {
            control_points: curve.control_points.to_vec(),
            weights: pw.iter().map(|h| h[2]).collect(),
            knots: curve.knots.to_vec(),
            degree: p,
        };
    }

    let k = find_span(np, p, u, curve.knots);
    let up = curve.knots;
    let mp = np + p + 1;

    let mut uq = Vec::with_capacity(mp + r + 1);
    uq.extend_from_slice(&up[..=k]);
    uq.extend(std::iter::repeat_n(u, r));
    uq.extend_from_slice(&up[k + 1..=mp]);

    let mut qw = vec![[0.0; 3]; np + r + 1];
    qw[..=k - p].copy_from_slice(&pw[..=k - p]);
    qw[k - s + r..=np + r].copy_from_slice(&pw[k - s..=np]);

    let mut rw: Vec<[f64; 3]> = pw[k - p..=k - s].to_vec();
    let mut l = k - p;
    for j in 1..=r {
        l = k - p + j;
        for i in 0..=(p - j - s) {
            let alpha = (u - up[l + i]) / (up[i + k + 1] - up[l + i]);
            for c in 0..3 {
                rw[i][c] = alpha * rw[i + 1][c] + (1.0 - alpha) * rw[i][c];
            }
        }
        qw[l] = rw[0];
        qw[k + r - j - s] = rw[p - j - s];
    }
    for i in (l + 1)..(k - s) {
        qw[i] = rw[i - l];
    }

    let (control_points, weights) = from_homogeneous(&qw);
    CurveData {
        control_points,
        weights,
        knots: uq,
        degree: p,
    }
}

/// Splits the curve at parameter `u` into the parts before and after it.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` when `u` is not strictly inside
/// the curve domain.
pub fn split_at(curve: &CurveView<'_>, u: f64) -> Result<(CurveData, CurveData)> {
    let (lo, hi) = curve.domain();
    let eps = KNOT_EPS * (hi - lo).abs().max(1.0);
    if u <= lo + eps || u >= hi - eps {
        return Err(OperationError::InvalidInput(format!(
            "split parameter {u} outside open domain ({lo}, {hi})"
        ))
        .into());
    }

    let p = curve.degree;
    // Snap to an existing knot to avoid near-zero knot spans.
    let u = curve
        .knots
        .iter()
        .copied()
        .find(|k| (k - u).abs() <= eps)
        .unwrap_or(u);
    let refined = insert_knot(curve, u, p);
    let knots = &refined.knots;
    let n = refined.control_points.len() - 1;
    let k = find_span(n, p, u, knots);
    // After refinement `u` has multiplicity p ending at index k.
    let split_ctrl = k - p;

    let mut left_knots = knots[..=k].to_vec();
    left_knots.push(u);
    let left = CurveData {
        control_points: refined.control_points[..=split_ctrl].to_vec(),
        weights: refined.weights[..=split_ctrl].to_vec(),
        knots: left_knots,
        degree: p,
    };

    let mut right_knots = vec![u];
    right_knots.extend_from_slice(&knots[k - p + 1..]);
    let right = CurveData {
        control_points: refined.control_points[split_ctrl..].to_vec(),
        weights: refined.weights[split_ctrl..].to_vec(),
        knots: right_knots,
        degree: p,
    };
    Ok((left, right))
}

/// Extracts the part of the curve between `u0` and `u1` (`u0 < u1`).
///
/// Bounds at the domain ends are not split.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` when the range is empty.
pub fn subcurve(curve: &CurveView<'_>, u0: f64, u1: f64) -> Result<CurveData> {
    let (lo, hi) = curve.domain();
    let eps = 1e-9 * (hi - lo).abs().max(1.0);
    let u0 = u0.max(lo);
    let u1 = u1.min(hi);
    if u1 - u0 <= eps {
        return Err(OperationError::InvalidInput(format!(
            "empty subcurve range [{u0}, {u1}]"
        ))
        .into());
    }

    let tail = if u0 > lo + eps {
        split_at(curve, u0)?.1
    } else {
        CurveData {
            control_points: curve.control_points.to_vec(),
            weights: curve.homogeneous().iter().map(|h| h[2]).collect(),
            knots: curve.knots.to_vec(),
            degree: curve.degree,
        }
    };
    if u1 < hi - eps {
        Ok(split_at(&tail.view(), u1)?.0)
    } else {
        Ok(tail)
    }
}

/// Decomposes the curve into Bezier segments by splitting at every distinct
/// interior knot.
///
/// # Errors
///
/// Propagates subdivision failures.
pub fn decompose_bezier(curve: &CurveView<'_>) -> Result<Vec<CurveData>> {
    let interior = distinct_interior(curve.knots, curve.degree, KNOT_EPS);
    let mut segments = Vec::with_capacity(interior.len() + 1);
    let mut rest = CurveData {
        control_points: curve.control_points.to_vec(),
        weights: curve.homogeneous().iter().map(|h| h[2]).collect(),
        knots: curve.knots.to_vec(),
        degree: curve.degree,
    };
    for u in interior {
        let (left, right) = split_at(&rest.view(), u)?;
        segments.push(left);
        rest = right;
    }
    segments.push(rest);
    Ok(segments)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;

    fn cubic() -> CurveData {
        CurveData {
            control_points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 3.0),
                Point2::new(3.0, 3.0),
                Point2::new(4.0, 0.0),
                Point2::new(6.0, -1.0),
                Point2::new(7.0, 2.0),
            ],
            weights: vec![1.0, 1.0, 2.0, 1.0, 1.0, 1.0],
            knots: vec![0.0, 0.0, 0.0, 0.0, 0.3, 0.6, 1.0, 1.0, 1.0, 1.0],
            degree: 3,
        }
    }

    fn assert_same_point(a: Point2, b: Point2) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
    }

    #[test]
    fn knot_insertion_preserves_shape() {
        let c = cubic();
        let refined = insert_knot(&c.view(), 0.45, 2);
        assert_eq!(refined.control_points.len(), 8);
        assert_eq!(refined.knots.len(), 12);
        for i in 0..=20 {
            let u = f64::from(i) / 20.0;
            assert_same_point(c.view().point_at(u), refined.view().point_at(u));
        }
    }

    #[test]
    fn split_halves_meet_at_split_point() {
        let c = cubic();
        let (left, right) = split_at(&c.view(), 0.45).unwrap();
        let at = c.view().point_at(0.45);
        assert_same_point(left.view().point_at(0.45), at);
        assert_same_point(right.view().point_at(0.45), at);
        assert_same_point(left.view().point_at(0.2), c.view().point_at(0.2));
        assert_same_point(right.view().point_at(0.8), c.view().point_at(0.8));
    }

    #[test]
    fn split_at_existing_knot() {
        let c = cubic();
        let (left, right) = split_at(&c.view(), 0.3).unwrap();
        assert_same_point(left.view().point_at(0.1), c.view().point_at(0.1));
        assert_same_point(right.view().point_at(0.9), c.view().point_at(0.9));
        assert_eq!(left.knots.len(), left.control_points.len() + 4);
        assert_eq!(right.knots.len(), right.control_points.len() + 4);
    }

    #[test]
    fn split_rejects_domain_ends() {
        let c = cubic();
        assert!(split_at(&c.view(), 0.0).is_err());
        assert!(split_at(&c.view(), 1.0).is_err());
    }

    #[test]
    fn subcurve_matches_original() {
        let c = cubic();
        let sub = subcurve(&c.view(), 0.2, 0.7).unwrap();
        let (lo, hi) = sub.view().domain();
        assert_abs_diff_eq!(lo, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(hi, 0.7, epsilon = 1e-12);
        assert_same_point(sub.view().point_at(0.5), c.view().point_at(0.5));
    }

    #[test]
    fn bezier_decomposition_count() {
        let c = cubic();
        let segs = decompose_bezier(&c.view()).unwrap();
        assert_eq!(segs.len(), 3);
        for s in &segs {
            assert_eq!(s.control_points.len(), 4);
        }
        assert_same_point(segs[1].view().point_at(0.45), c.view().point_at(0.45));
    }
}
