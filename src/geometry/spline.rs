use crate::error::{GeometryError, Result};
use crate::math::nurbs::{split, CurveData, CurveView};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::BoundingBox;

/// Relative parameter step used to step around a vanishing derivative.
const TANGENT_STEP: f64 = 1e-6;

/// A NURBS curve.
///
/// `weights` may be empty, in which case every weight is `1.0`.
/// `fit_points` are carried through from the source drawing and do not
/// affect evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Spline {
    pub control_points: Vec<Point2>,
    pub degree: usize,
    pub knots: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub weights: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fit_points: Vec<Point2>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub closed: bool,
}

impl Spline {
    /// Creates a non-rational spline.
    #[must_use]
    pub fn new(control_points: Vec<Point2>, degree: usize, knots: Vec<f64>) -> Self {
        let weights = vec![1.0; control_points.len()];
        Self {
            control_points,
            degree,
            knots,
            weights,
            fit_points: Vec::new(),
            closed: false,
        }
    }

    /// Wraps fitted or subdivided curve data.
    #[must_use]
    pub fn from_curve_data(data: CurveData, closed: bool) -> Self {
        Self {
            control_points: data.control_points,
            degree: data.degree,
            knots: data.knots,
            weights: data.weights,
            fit_points: Vec::new(),
            closed,
        }
    }

    /// Checks the structural invariants of the curve.
    ///
    /// # Errors
    ///
    /// Returns the `GeometryError` naming the first broken invariant:
    /// control point count, degree range, knot count, knot ordering, weight
    /// count, or weight sign.
    pub fn validate(&self) -> Result<()> {
        let n = self.control_points.len();
        if n < 2 {
            return Err(GeometryError::TooFewControlPoints(n).into());
        }
        if self.degree == 0 || self.degree >= n {
            return Err(GeometryError::InvalidDegree {
                degree: self.degree,
                control_points: n,
            }
            .into());
        }
        let expected = n + self.degree + 1;
        if self.knots.len() != expected {
            return Err(GeometryError::KnotCount {
                expected,
                actual: self.knots.len(),
            }
            .into());
        }
        if self.knots.iter().any(|k| !k.is_finite()) {
            return Err(GeometryError::KnotVector("non-finite knot value".into()).into());
        }
        if self.knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(GeometryError::KnotVector("knots must be non-decreasing".into()).into());
        }
        let (lo, hi) = (self.knots[self.degree], self.knots[n]);
        if hi - lo <= TOLERANCE {
            return Err(GeometryError::KnotVector("knot vector has an empty domain".into()).into());
        }
        if !self.weights.is_empty() {
            if self.weights.len() != n {
                return Err(GeometryError::WeightCount {
                    expected: n,
                    actual: self.weights.len(),
                }
                .into());
            }
            if let Some(w) = self.weights.iter().find(|w| !w.is_finite() || **w <= 0.0) {
                return Err(GeometryError::NonPositiveWeight(*w).into());
            }
        }
        if self.control_points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::Degenerate("non-finite control point".into()).into());
        }
        Ok(())
    }

    /// Borrows the curve data for evaluation. Callers validate first.
    #[must_use]
    pub fn view(&self) -> CurveView<'_> {
        CurveView {
            control_points: &self.control_points,
            weights: &self.weights,
            knots: &self.knots,
            degree: self.degree,
        }
    }

    /// Parameter domain `(u_min, u_max)`.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.view().domain()
    }

    #[must_use]
    pub fn point_at(&self, u: f64) -> Point2 {
        self.view().point_at(u)
    }

    /// Point and first derivative at `u`.
    #[must_use]
    pub fn derivative_at(&self, u: f64) -> (Point2, Vector2) {
        self.view().derivative_at(u)
    }

    /// Unit tangent at `u`.
    ///
    /// Where the derivative vanishes (repeated control points, cusps) the
    /// direction is taken from a nearby parameter, then from the chord
    /// between neighbouring points.
    #[must_use]
    pub fn unit_tangent_at(&self, u: f64) -> Option<Vector2> {
        let (lo, hi) = self.domain();
        let (_, d) = self.derivative_at(u);
        if d.norm() > TOLERANCE {
            return Some(d.normalize());
        }
        let span = hi - lo;
        for scale in [1.0, 10.0, 100.0, 1000.0] {
            let h = TANGENT_STEP * scale * span;
            let nearby = if u + h <= hi { u + h } else { u - h };
            let (_, d) = self.derivative_at(nearby);
            if d.norm() > TOLERANCE {
                return Some(d.normalize());
            }
            let a = self.point_at((u - h).max(lo));
            let b = self.point_at((u + h).min(hi));
            let chord = b - a;
            if chord.norm() > TOLERANCE {
                return Some(chord.normalize());
            }
        }
        None
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.point_at(self.domain().0)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.point_at(self.domain().1)
    }

    /// Samples `segments + 1` points uniformly in parameter space.
    #[must_use]
    pub fn tessellate(&self, segments: usize) -> Vec<Point2> {
        self.view().sample(segments.max(1) + 1)
    }

    /// Segment count giving a reasonable tessellation for this curve.
    #[must_use]
    pub fn default_segments(&self) -> usize {
        (self.control_points.len() * 8 * self.degree.max(1)).clamp(32, 2048)
    }

    /// The same curve traversed in the opposite direction.
    ///
    /// The knot vector is mirrored about its midpoint, which keeps the domain
    /// of a clamped curve unchanged.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let (lo, hi) = (self.knots.first().copied(), self.knots.last().copied());
        let knots = match (lo, hi) {
            (Some(lo), Some(hi)) => self.knots.iter().rev().map(|k| lo + hi - k).collect(),
            _ => Vec::new(),
        };
        Self {
            control_points: self.control_points.iter().rev().copied().collect(),
            degree: self.degree,
            knots,
            weights: self.weights.iter().rev().copied().collect(),
            fit_points: self.fit_points.iter().rev().copied().collect(),
            closed: self.closed,
        }
    }

    /// Splits the curve at `u` into two open splines.
    ///
    /// # Errors
    ///
    /// Returns an error when `u` is not strictly inside the domain.
    pub fn split_at(&self, u: f64) -> Result<(Self, Self)> {
        let (left, right) = split::split_at(&self.view(), u)?;
        Ok((
            Self::from_curve_data(left, false),
            Self::from_curve_data(right, false),
        ))
    }

    /// The piece of the curve between `u0` and `u1`.
    ///
    /// # Errors
    ///
    /// Returns an error when the range is empty.
    pub fn subcurve(&self, u0: f64, u1: f64) -> Result<Self> {
        let data = split::subcurve(&self.view(), u0, u1)?;
        Ok(Self::from_curve_data(data, false))
    }

    /// Decomposes the curve into Bezier pieces.
    ///
    /// # Errors
    ///
    /// Propagates subdivision failures.
    pub fn bezier_segments(&self) -> Result<Vec<Self>> {
        Ok(split::decompose_bezier(&self.view())?
            .into_iter()
            .map(|d| Self::from_curve_data(d, false))
            .collect())
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.tessellate(self.default_segments()))
    }
}
