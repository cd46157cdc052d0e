//! NURBS curve evaluation, fitting and subdivision.
//!
//! Curves are evaluated in homogeneous coordinates `(w·x, w·y, w)` and
//! projected back, so rational weights are handled uniformly.

pub mod basis;
pub mod fit;
pub mod knots;
pub mod split;

use super::{Point2, Vector2};
use basis::{basis_derivatives, basis_functions, find_span};

/// Borrowed view of the data defining a NURBS curve.
///
/// The view does not validate its data; callers check the structural
/// invariants (see [`Spline::validate`](crate::geometry::Spline::validate)) first.
#[derive(Debug, Clone, Copy)]
pub struct CurveView<'a> {
    pub control_points: &'a [Point2],
    pub weights: &'a [f64],
    pub knots: &'a [f64],
    pub degree: usize,
}

/// Owned NURBS curve data produced by fitting and subdivision.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveData {
    pub control_points: Vec<Point2>,
    pub weights: Vec<f64>,
    pub knots: Vec<f64>,
    pub degree: usize,
}

impl CurveData {
    /// Borrows this curve as a [`CurveView`].
    #[must_use]
    pub fn view(&self) -> CurveView<'_> {
        CurveView {
            control_points: &self.control_points,
            weights: &self.weights,
            knots: &self.knots,
            degree: self.degree,
        }
    }
}

impl CurveView<'_> {
    /// Parameter domain `[knots[p], knots[n + 1]]`.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        let n = self.control_points.len() - 1;
        (self.knots[self.degree], self.knots[n + 1])
    }

    fn weight(&self, i: usize) -> f64 {
        self.weights.get(i).copied().unwrap_or(1.0)
    }

    /// Evaluates the curve point at `u` (clamped to the domain).
    #[must_use]
    pub fn point_at(&self, u: f64) -> Point2 {
        let (lo, hi) = self.domain();
        let u = u.clamp(lo, hi);
        let n = self.control_points.len() - 1;
        let p = self.degree;
        let span = find_span(n, p, u, self.knots);
        let basis = basis_functions(span, u, p, self.knots);

        let (mut x, mut y, mut w) = (0.0, 0.0, 0.0);
        for (j, b) in basis.iter().enumerate() {
            let i = span - p + j;
            let wi = self.weight(i) * b;
            x += self.control_points[i].x * wi;
            y += self.control_points[i].y * wi;
            w += wi;
        }
        if w.abs() < f64::EPSILON {
            return self.control_points[span - p];
        }
        Point2::new(x / w, y / w)
    }

    /// Evaluates the point and the first derivative of the rational curve at `u`.
    #[must_use]
    pub fn derivative_at(&self, u: f64) -> (Point2, Vector2) {
        let (lo, hi) = self.domain();
        let u = u.clamp(lo, hi);
        let n = self.control_points.len() - 1;
        let p = self.degree;
        let span = find_span(n, p, u, self.knots);
        let ders = basis_derivatives(span, u, p, 1, self.knots);

        // A(u) and w(u) with their first derivatives.
        let (mut ax, mut ay, mut w) = (0.0, 0.0, 0.0);
        let (mut dax, mut day, mut dw) = (0.0, 0.0, 0.0);
        for j in 0..=p {
            let i = span - p + j;
            let wi = self.weight(i);
            let pt = self.control_points[i];
            ax += ders[0][j] * wi * pt.x;
            ay += ders[0][j] * wi * pt.y;
            w += ders[0][j] * wi;
            if ders.len() > 1 {
                dax += ders[1][j] * wi * pt.x;
                day += ders[1][j] * wi * pt.y;
                dw += ders[1][j] * wi;
            }
        }
        if w.abs() < f64::EPSILON {
            return (self.control_points[span - p], Vector2::zeros());
        }
        let point = Point2::new(ax / w, ay / w);
        let deriv = Vector2::new((dax - dw * point.x) / w, (day - dw * point.y) / w);
        (point, deriv)
    }

    /// Samples `count` points uniformly in parameter space (endpoints included).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, count: usize) -> Vec<Point2> {
        let count = count.max(2);
        let (lo, hi) = self.domain();
        (0..count)
            .map(|i| self.point_at(lo + (hi - lo) * i as f64 / (count - 1) as f64))
            .collect()
    }

    /// Converts the control points to homogeneous coordinates.
    #[must_use]
    pub fn homogeneous(&self) -> Vec<[f64; 3]> {
        self.control_points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let w = self.weight(i);
                [p.x * w, p.y * w, w]
            })
            .collect()
    }
}

/// Splits homogeneous control points back into points and weights.
#[must_use]
pub fn from_homogeneous(pw: &[[f64; 3]]) -> (Vec<Point2>, Vec<f64>) {
    pw.iter()
        .map(|h| {
            let w = if h[2].abs() < f64::EPSILON { 1.0 } else { h[2] };
            (Point2::new(h[0] / w, h[1] / w), h[2])
        })
        .unzip()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Quarter circle as a rational quadratic Bezier.
    fn quarter_circle() -> CurveData {
        CurveData {
            control_points: vec![
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            weights: vec![1.0, std::f64::consts::FRAC_1_SQRT_2, 1.0],
            knots: vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            degree: 2,
        }
    }

    #[test]
    fn rational_quarter_circle_is_exact() {
        let c = quarter_circle();
        for p in c.view().sample(17) {
            assert_abs_diff_eq!(p.coords.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn endpoints_match_control_points() {
        let c = quarter_circle();
        let v = c.view();
        assert_abs_diff_eq!(v.point_at(0.0).x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.point_at(1.0).y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn derivative_is_tangent_to_circle() {
        let c = quarter_circle();
        let (p, d) = c.view().derivative_at(0.3);
        // Tangent of a circle is perpendicular to the radius.
        assert_abs_diff_eq!(p.coords.dot(&d), 0.0, epsilon = 1e-10);
        assert!(d.norm() > 0.0);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let c = CurveData {
            control_points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 2.0),
                Point2::new(3.0, 2.0),
                Point2::new(4.0, 0.0),
                Point2::new(6.0, 1.0),
            ],
            weights: vec![1.0, 2.0, 0.5, 1.0, 1.0],
            knots: vec![0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0],
            degree: 3,
        };
        let v = c.view();
        let h = 1e-6;
        let u = 0.37;
        let fd = (v.point_at(u + h) - v.point_at(u - h)) / (2.0 * h);
        let (_, d) = v.derivative_at(u);
        assert_abs_diff_eq!(d.x, fd.x, epsilon = 1e-5);
        assert_abs_diff_eq!(d.y, fd.y, epsilon = 1e-5);
    }
}
