use tracing::{debug, warn};

use crate::error::{OperationError, Result};
use crate::geometry::{Ellipse, Geometry, Shape, Spline};
use crate::math::nurbs::{fit, knots};
use crate::math::Point2;

use super::{OffsetDirection, OffsetResult};

/// Samples taken along the ellipse before fitting.
const ELLIPSE_SAMPLES: usize = 100;

/// Fewer valid offset samples than this cannot describe a curve.
const MIN_VALID_SAMPLES: usize = 4;

/// Degree of the fitted offset curve.
const FIT_DEGREE: usize = 3;

/// Offsets an ellipse (or elliptical arc).
///
/// The true offset of an ellipse is not an ellipse, so the result is a
/// cubic [`Spline`] interpolated through offset sample points. It is an
/// approximation; deviation from the exact offset is small but non-zero.
#[must_use]
pub fn offset_ellipse(ellipse: &Ellipse, distance: f64, direction: OffsetDirection) -> OffsetResult {
    if direction.is_noop(distance) {
        return OffsetResult::noop();
    }
    match build_offset(ellipse, direction.signed(distance)) {
        Ok((spline, warnings)) => {
            OffsetResult::ok(vec![Shape::new(Geometry::Spline(spline))]).with_warnings(warnings)
        }
        Err(e) => e.into(),
    }
}

/// Exact offset points of the ellipse at `count + 1` uniformly spaced
/// parametric angles. Points with a degenerate normal are skipped.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn offset_samples(ellipse: &Ellipse, signed_distance: f64, count: usize) -> Vec<Point2> {
    let (start, end) = ellipse.param_range();
    (0..=count)
        .filter_map(|i| {
            let theta = start + (end - start) * i as f64 / count as f64;
            let normal = ellipse.normal_at_param(theta)?;
            let p = ellipse.point_at_param(theta) + normal * signed_distance;
            (p.x.is_finite() && p.y.is_finite()).then_some(p)
        })
        .collect()
}

fn build_offset(ellipse: &Ellipse, signed_distance: f64) -> Result<(Spline, Vec<String>)> {
    ellipse.validate()?;
    let a = ellipse.semi_major();
    let b = ellipse.semi_minor();
    let mut warnings = Vec::new();

    if signed_distance < 0.0 {
        let inset = -signed_distance;
        if inset >= b {
            return Err(OperationError::EllipseCollapse {
                distance: inset,
                semi_minor: b,
            }
            .into());
        }
        // Smallest radius of curvature sits at the major axis vertices.
        let min_curvature_radius = b * b / a;
        if inset > min_curvature_radius {
            warn!(inset, min_curvature_radius, "ellipse inset exceeds curvature radius");
            warnings.push(format!(
                "Ellipse inset {inset} exceeds minimum radius of curvature {min_curvature_radius:.6}; offset may contain cusps"
            ));
        }
    }

    let points = offset_samples(ellipse, signed_distance, ELLIPSE_SAMPLES);
    if points.len() < MIN_VALID_SAMPLES {
        return Err(OperationError::InsufficientSamples {
            valid: points.len(),
            required: MIN_VALID_SAMPLES,
        }
        .into());
    }

    let fitted = fit::interpolate(&points, FIT_DEGREE)?;
    let mut curve = fitted.curve;
    let (repaired, was_repaired) =
        knots::repair(&curve.knots, curve.control_points.len(), curve.degree);
    if was_repaired {
        debug!("regenerated malformed knot vector of fitted ellipse offset");
        curve.knots = repaired;
    }
    debug!(
        samples = points.len(),
        control_points = curve.control_points.len(),
        signed_distance,
        "fitted ellipse offset"
    );
    Ok((Spline::from_curve_data(curve, ellipse.is_full()), warnings))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector2;
    use std::f64::consts::PI;

    fn spline_of(r: &OffsetResult) -> Spline {
        assert!(r.success, "{:?}", r.errors);
        match &r.shapes[0].geometry {
            Geometry::Spline(s) => s.clone(),
            other => panic!("expected spline, got {other:?}"),
        }
    }

    /// Max and average distance from exact offset points to the fitted curve.
    fn deviation(ellipse: &Ellipse, spline: &Spline, signed_distance: f64) -> (f64, f64) {
        let dense = spline.tessellate(4000);
        let exact = offset_samples(ellipse, signed_distance, 360);
        let dists: Vec<f64> = exact
            .iter()
            .map(|p| dense.iter().map(|q| (p - q).norm()).fold(f64::INFINITY, f64::min))
            .collect();
        let max = dists.iter().copied().fold(0.0, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let avg = dists.iter().sum::<f64>() / dists.len() as f64;
        (max, avg)
    }

    #[test]
    fn full_ellipse_outset_is_closed_and_accurate() {
        let e = Ellipse::new(Point2::new(5.0, -3.0), Vector2::new(30.0, 10.0), 0.5);
        let s = spline_of(&offset_ellipse(&e, 4.0, OffsetDirection::Outset));
        assert!(s.closed);
        s.validate().unwrap();
        assert!(knots::is_clamped(&s.knots, s.degree));
        let (max, avg) = deviation(&e, &s, 4.0);
        assert!(max < 10.0 && avg < 5.0, "max {max} avg {avg}");
        assert!(max < 0.1, "max {max}");
        assert!((s.start_point() - s.end_point()).norm() < 1e-9);
    }

    #[test]
    fn extreme_aspect_ratio_stays_within_bounds() {
        let e = Ellipse::new(Point2::origin(), Vector2::new(100.0, 0.0), 0.05);
        let s = spline_of(&offset_ellipse(&e, 2.0, OffsetDirection::Outset));
        let (max, avg) = deviation(&e, &s, 2.0);
        assert!(max < 10.0 && avg < 5.0, "max {max} avg {avg}");
    }

    #[test]
    fn small_ellipse_large_outset() {
        let e = Ellipse::new(Point2::origin(), Vector2::new(2.0, 0.0), 0.5);
        let s = spline_of(&offset_ellipse(&e, 20.0, OffsetDirection::Outset));
        let (max, avg) = deviation(&e, &s, 20.0);
        assert!(max < 10.0 && avg < 5.0, "max {max} avg {avg}");
    }

    #[test]
    fn partial_ellipse_is_open() {
        let e = Ellipse::arc(Point2::origin(), Vector2::new(10.0, 0.0), 0.6, 0.0, PI);
        let s = spline_of(&offset_ellipse(&e, 1.0, OffsetDirection::Inset));
        assert!(!s.closed);
        // Inset of the upper half starts inside the major vertex.
        assert!((s.start_point() - Point2::new(9.0, 0.0)).norm() < 1e-6);
        let top = s.point_at(0.5);
        assert!((top - Point2::new(0.0, 5.0)).norm() < 0.1, "{top:?}");
    }

    #[test]
    fn inset_beyond_semi_minor_fails() {
        let e = Ellipse::new(Point2::origin(), Vector2::new(10.0, 0.0), 0.3);
        let r = offset_ellipse(&e, 3.0, OffsetDirection::Inset);
        assert!(!r.success);
        assert!(r.errors[0].contains("semi-minor"), "{:?}", r.errors);
    }

    #[test]
    fn inset_past_curvature_radius_warns() {
        let e = Ellipse::new(Point2::origin(), Vector2::new(10.0, 0.0), 0.5);
        // b²/a = 2.5 < 3 < b = 5
        let r = offset_ellipse(&e, 3.0, OffsetDirection::Inset);
        assert!(r.success);
        assert!(r.warnings.iter().any(|w| w.contains("cusps")));
    }

    #[test]
    fn degenerate_ellipse_fails() {
        let e = Ellipse::new(Point2::origin(), Vector2::new(0.0, 0.0), 0.5);
        let r = offset_ellipse(&e, 1.0, OffsetDirection::Outset);
        assert!(!r.success);
        assert!(r.errors[0].starts_with("Degenerate ellipse"));
    }
}
