//! Global curve interpolation through a point cloud.

use nalgebra::{DMatrix, DVector};

use super::basis::{basis_functions, find_span};
use super::knots::averaged;
use super::CurveData;
use crate::error::{OperationError, Result};
use crate::math::Point2;

/// Parameter gap below which consecutive points are treated as duplicates.
const DUPLICATE_PARAM_EPS: f64 = 1e-12;

/// Result of fitting a curve through points.
#[derive(Debug, Clone)]
pub struct FittedCurve {
    pub curve: CurveData,
    /// Curve parameter assigned to each input point (duplicates share a value).
    pub params: Vec<f64>,
}

/// Chord-length parameters in `[0, 1]` for the given points.
///
/// # Errors
///
/// Returns `OperationError::Fitting` when all points coincide.
#[allow(clippy::cast_precision_loss)]
pub fn chord_length_params(points: &[Point2]) -> Result<Vec<f64>> {
    let mut params = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    params.push(0.0);
    for w in points.windows(2) {
        acc += (w[1] - w[0]).norm();
        params.push(acc);
    }
    if acc < f64::EPSILON {
        return Err(OperationError::Fitting("all fit points coincide".into()).into());
    }
    for p in &mut params {
        *p /= acc;
    }
    Ok(params)
}

/// Interpolates a non-rational B-spline of (at most) `degree` through `points`.
///
/// Uses chord-length parameters and averaged knots, then solves the
/// collocation system with an LU decomposition. Consecutive duplicate points
/// are skipped. The degree drops when there are too few distinct points.
///
/// # Errors
///
/// Returns `OperationError::Fitting` when fewer than two distinct points are
/// given or the collocation matrix is singular.
pub fn interpolate(points: &[Point2], degree: usize) -> Result<FittedCurve> {
    let all_params = chord_length_params(points)?;

    let mut unique_pts = Vec::with_capacity(points.len());
    let mut unique_params = Vec::with_capacity(points.len());
    for (p, &u) in points.iter().zip(&all_params) {
        if unique_params
            .last()
            .is_none_or(|last: &f64| u - last > DUPLICATE_PARAM_EPS)
        {
            unique_pts.push(*p);
            unique_params.push(u);
        }
    }
    // Force an exact end parameter even if the last point was merged.
    if let Some(last) = unique_params.last_mut() {
        *last = 1.0;
    }

    let n = unique_pts.len();
    if n < 2 {
        return Err(OperationError::Fitting("fewer than 2 distinct fit points".into()).into());
    }
    let degree = degree.clamp(1, n - 1);
    let knots = averaged(&unique_params, degree);

    let mut matrix = DMatrix::<f64>::zeros(n, n);
    for (row, &u) in unique_params.iter().enumerate() {
        let span = find_span(n - 1, degree, u, &knots);
        let basis = basis_functions(span, u, degree, &knots);
        for (j, b) in basis.iter().enumerate() {
            matrix[(row, span - degree + j)] = *b;
        }
    }

    let bx = DVector::from_iterator(n, unique_pts.iter().map(|p| p.x));
    let by = DVector::from_iterator(n, unique_pts.iter().map(|p| p.y));
    let lu = matrix.lu();
    let (Some(xs), Some(ys)) = (lu.solve(&bx), lu.solve(&by)) else {
        return Err(OperationError::Fitting("singular interpolation matrix".into()).into());
    };
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return Err(OperationError::Fitting("interpolation produced non-finite control points".into()).into());
    }

    let control_points = xs.iter().zip(ys.iter()).map(|(x, y)| Point2::new(*x, *y)).collect();
    Ok(FittedCurve {
        curve: CurveData {
            control_points,
            weights: vec![1.0; n],
            knots,
            degree,
        },
        params: all_params,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::TAU;

    #[test]
    fn interpolates_through_every_point() {
        let pts: Vec<Point2> = (0..12)
            .map(|i| {
                let t = f64::from(i) * 0.5;
                Point2::new(t, t.sin())
            })
            .collect();
        let fit = interpolate(&pts, 3).unwrap();
        let view = fit.curve.view();
        for (p, u) in pts.iter().zip(&fit.params) {
            let q = view.point_at(*u);
            assert_abs_diff_eq!(p.x, q.x, epsilon = 1e-9);
            assert_abs_diff_eq!(p.y, q.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn circle_fit_stays_close_between_samples() {
        let pts: Vec<Point2> = (0..=64)
            .map(|i| {
                let a = TAU * f64::from(i) / 64.0;
                Point2::new(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect();
        let fit = interpolate(&pts, 3).unwrap();
        for p in fit.curve.view().sample(500) {
            assert!((p.coords.norm() - 10.0).abs() < 1e-2);
        }
    }

    #[test]
    fn degree_drops_for_few_points() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        let fit = interpolate(&pts, 3).unwrap();
        assert_eq!(fit.curve.degree, 1);
        assert_eq!(fit.curve.control_points.len(), 2);
    }

    #[test]
    fn duplicate_points_are_skipped() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(3.0, 0.0),
        ];
        let fit = interpolate(&pts, 3).unwrap();
        assert_eq!(fit.curve.control_points.len(), 4);
        assert_eq!(fit.params.len(), 5);
    }

    #[test]
    fn coincident_points_fail() {
        let pts = [Point2::new(1.0, 1.0); 4];
        assert!(interpolate(&pts, 3).is_err());
    }
}
