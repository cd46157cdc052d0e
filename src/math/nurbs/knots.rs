//! Knot vector construction and validation.

use crate::error::{GeometryError, Result};

/// Required knot count for `n_ctrl` control points of the given degree.
#[must_use]
pub fn expected_len(n_ctrl: usize, degree: usize) -> usize {
    n_ctrl + degree + 1
}

/// Checks that `knots` is non-decreasing, has `degree + 1` repeated values at
/// both ends, and spans a non-empty domain.
#[must_use]
pub fn is_clamped(knots: &[f64], degree: usize) -> bool {
    validate_clamped(knots, degree).is_ok()
}

/// Like [`is_clamped`] but reports which property is broken.
///
/// # Errors
///
/// Returns `GeometryError::KnotVector` describing the first violation found.
pub fn validate_clamped(knots: &[f64], degree: usize) -> Result<()> {
    let m = knots.len();
    if m < 2 * (degree + 1) {
        return Err(GeometryError::KnotVector(format!(
            "{m} knots cannot clamp a degree {degree} curve"
        ))
        .into());
    }
    if knots.iter().any(|k| !k.is_finite()) {
        return Err(GeometryError::KnotVector("non-finite knot value".into()).into());
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(GeometryError::KnotVector("knots must be non-decreasing".into()).into());
    }
    let first = knots[0];
    let last = knots[m - 1];
    let scale = (last - first).abs().max(1.0);
    let eps = 1e-12 * scale;
    if knots[..=degree].iter().any(|k| (k - first).abs() > eps) {
        return Err(GeometryError::KnotVector(format!(
            "first {} knots must be equal",
            degree + 1
        ))
        .into());
    }
    if knots[m - degree - 1..].iter().any(|k| (k - last).abs() > eps) {
        return Err(GeometryError::KnotVector(format!(
            "last {} knots must be equal",
            degree + 1
        ))
        .into());
    }
    if last - first <= eps {
        return Err(GeometryError::KnotVector("knot vector has an empty domain".into()).into());
    }
    Ok(())
}

/// Builds a uniform clamped knot vector on `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn uniform_clamped(n_ctrl: usize, degree: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(expected_len(n_ctrl, degree));
    knots.extend(std::iter::repeat_n(0.0, degree + 1));
    let interior = n_ctrl.saturating_sub(degree + 1);
    let segments = (interior + 1) as f64;
    for i in 1..=interior {
        knots.push(i as f64 / segments);
    }
    knots.extend(std::iter::repeat_n(1.0, degree + 1));
    knots
}

/// Returns `knots` unchanged when it is a valid clamped vector for `n_ctrl`
/// control points, otherwise a regenerated uniform clamped vector.
///
/// The boolean is `true` when the vector had to be regenerated.
#[must_use]
pub fn repair(knots: &[f64], n_ctrl: usize, degree: usize) -> (Vec<f64>, bool) {
    if knots.len() == expected_len(n_ctrl, degree) && is_clamped(knots, degree) {
        (knots.to_vec(), false)
    } else {
        (uniform_clamped(n_ctrl, degree), true)
    }
}

/// Averaged knot vector for global interpolation through points with the
/// given parameters (NURBS Book eq. 9.8).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn averaged(params: &[f64], degree: usize) -> Vec<f64> {
    let n = params.len();
    let mut knots = Vec::with_capacity(expected_len(n, degree));
    knots.extend(std::iter::repeat_n(0.0, degree + 1));
    for j in 1..n.saturating_sub(degree) {
        let sum: f64 = params[j..j + degree].iter().sum();
        knots.push(sum / degree as f64);
    }
    knots.extend(std::iter::repeat_n(1.0, degree + 1));
    knots
}

/// Number of times `u` appears in `knots` (within `eps`).
#[must_use]
pub fn multiplicity(knots: &[f64], u: f64, eps: f64) -> usize {
    knots.iter().filter(|k| (*k - u).abs() <= eps).count()
}

/// Distinct interior knot values, in increasing order.
#[must_use]
pub fn distinct_interior(knots: &[f64], degree: usize, eps: f64) -> Vec<f64> {
    let m = knots.len();
    if m < 2 * (degree + 1) {
        return Vec::new();
    }
    let lo = knots[degree];
    let hi = knots[m - degree - 1];
    let mut out: Vec<f64> = Vec::new();
    for &k in &knots[degree + 1..m - degree - 1] {
        if k - lo > eps && hi - k > eps && out.last().is_none_or(|last| k - last > eps) {
            out.push(k);
        }
    }
    out
}
