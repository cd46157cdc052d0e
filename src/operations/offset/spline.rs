use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::error::{OperationError, Result};
use crate::geometry::{Geometry, Shape, Spline};
use crate::math::nurbs::fit::{self, FittedCurve};
use crate::math::nurbs::knots;
use crate::math::polygon_2d::right_normal;
use crate::math::{cross, Point2, TOLERANCE};

use super::{OffsetDirection, OffsetResult};

/// Highest degree used when refitting an offset spline.
const FIT_DEGREE: usize = 3;

/// Lower bound for the derived initial sample count.
const MIN_INITIAL_SAMPLES: usize = 16;

/// Tuning for the adaptive spline offset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SplineOffsetOptions {
    /// Maximum allowed deviation between the fitted curve and the true offset.
    pub tolerance: f64,
    /// Number of refinement rounds after the first fit.
    pub max_retries: usize,
    /// Samples for the first fit. `None` derives a count from the control
    /// points.
    pub initial_samples: Option<usize>,
    /// Hard ceiling on the sample count.
    pub max_samples: usize,
    /// Refinement stops once this instant has passed; the best curve so far
    /// is returned with a warning.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub deadline: Option<Instant>,
}

impl Default for SplineOffsetOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_retries: 5,
            initial_samples: None,
            max_samples: 1000,
            deadline: None,
        }
    }
}

/// Offsets a spline with [`SplineOffsetOptions::default`].
#[must_use]
pub fn offset_spline(spline: &Spline, distance: f64, direction: OffsetDirection) -> OffsetResult {
    offset_spline_with_options(spline, distance, direction, &SplineOffsetOptions::default())
}

/// Offsets a spline by sampling, moving every sample along the right-hand
/// normal and refitting a cubic through the moved points.
///
/// The sample count doubles until the fit is within `options.tolerance` of
/// the true offset. Running out of retries, samples or time is not an error:
/// the best fit is returned with a warning.
#[must_use]
pub fn offset_spline_with_options(
    spline: &Spline,
    distance: f64,
    direction: OffsetDirection,
    options: &SplineOffsetOptions,
) -> OffsetResult {
    if direction.is_noop(distance) {
        return OffsetResult::noop();
    }
    if let Err(e) = spline.validate() {
        return e.into();
    }
    match refine(spline, direction.signed(distance), options) {
        Ok((offset, warnings)) => {
            OffsetResult::ok(vec![Shape::new(Geometry::Spline(offset))]).with_warnings(warnings)
        }
        Err(e) => e.into(),
    }
}

/// Offset samples: original parameters and the moved points.
struct Samples {
    params: Vec<f64>,
    points: Vec<Point2>,
}

fn initial_sample_count(spline: &Spline, options: &SplineOffsetOptions) -> usize {
    let derived = (spline.control_points.len() * 4).max(MIN_INITIAL_SAMPLES);
    options
        .initial_samples
        .unwrap_or(derived)
        .clamp(2, options.max_samples.max(2))
}

/// True offset point at `u`, or `None` where no tangent can be found.
fn offset_point(spline: &Spline, u: f64, signed_distance: f64) -> Option<Point2> {
    let tangent = spline.unit_tangent_at(u)?;
    Some(spline.point_at(u) + right_normal(&tangent) * signed_distance)
}

#[allow(clippy::cast_precision_loss)]
fn sample(spline: &Spline, signed_distance: f64, count: usize) -> Samples {
    let (lo, hi) = spline.domain();
    let mut params = Vec::with_capacity(count);
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let u = lo + (hi - lo) * i as f64 / (count - 1) as f64;
        if let Some(p) = offset_point(spline, u, signed_distance) {
            params.push(u);
            points.push(p);
        } else {
            trace!(u, "skipping spline sample with degenerate tangent");
        }
    }
    Samples { params, points }
}

/// Largest distance between the fitted curve and the true offset, measured
/// half-way between consecutive samples.
fn max_deviation(spline: &Spline, signed_distance: f64, samples: &Samples, fitted: &FittedCurve) -> f64 {
    let view = fitted.curve.view();
    let mut worst: f64 = 0.0;
    for i in 0..samples.params.len().saturating_sub(1) {
        let u_mid = 0.5 * (samples.params[i] + samples.params[i + 1]);
        let Some(truth) = offset_point(spline, u_mid, signed_distance) else {
            continue;
        };
        let v_mid = 0.5 * (fitted.params[i] + fitted.params[i + 1]);
        let (at, deriv) = view.derivative_at(v_mid);
        let delta = truth - at;
        let spacing = (samples.points[i + 1] - samples.points[i]).norm();
        let dev = if deriv.norm() > TOLERANCE {
            let t = deriv.normalize();
            // Parameterizations of the fit and the source drift apart; the
            // normal component measures shape error unless the drift is large.
            if delta.dot(&t).abs() > 0.5 * spacing {
                delta.norm()
            } else {
                cross(&t, &delta).abs()
            }
        } else {
            delta.norm()
        };
        worst = worst.max(dev);
    }
    worst
}

fn fit_samples(samples: &Samples, closed: bool) -> Result<(Spline, FittedCurve)> {
    if samples.points.len() < 2 {
        return Err(OperationError::Fitting(format!(
            "only {} spline samples have a usable tangent",
            samples.points.len()
        ))
        .into());
    }
    let fitted = fit::interpolate(&samples.points, FIT_DEGREE)?;
    let mut curve = fitted.curve.clone();
    let (repaired, was_repaired) =
        knots::repair(&curve.knots, curve.control_points.len(), curve.degree);
    if was_repaired {
        debug!("regenerated malformed knot vector of fitted spline offset");
        curve.knots = repaired;
    }
    Ok((Spline::from_curve_data(curve, closed), fitted))
}

fn refine(spline: &Spline, signed_distance: f64, options: &SplineOffsetOptions) -> Result<(Spline, Vec<String>)> {
    let mut warnings = Vec::new();
    let max_samples = options.max_samples.max(2);
    let mut count = initial_sample_count(spline, options);
    let mut best: Option<(Spline, f64)> = None;

    for attempt in 0..=options.max_retries {
        let samples = sample(spline, signed_distance, count);
        let (curve, fitted) = fit_samples(&samples, spline.closed)?;
        let deviation = max_deviation(spline, signed_distance, &samples, &fitted);
        trace!(attempt, count, deviation, "spline offset fit");

        if best.as_ref().map_or(true, |(_, d)| deviation < *d) {
            best = Some((curve, deviation));
        }
        if deviation <= options.tolerance {
            debug!(attempt, count, deviation, "spline offset converged");
            break;
        }
        if options.deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(attempt, count, deviation, "spline offset deadline reached");
            warnings.push(format!(
                "Spline offset cancelled at deadline after {} attempts: max deviation {deviation:.6}",
                attempt + 1
            ));
            break;
        }
        if count >= max_samples {
            warn!(count, deviation, "spline offset sample limit reached");
            warnings.push(format!(
                "Maximum sample limit reached ({max_samples}): max deviation {deviation:.6} exceeds tolerance {}",
                options.tolerance
            ));
            break;
        }
        if attempt == options.max_retries {
            warn!(count, deviation, "spline offset did not converge");
            warnings.push(format!(
                "Spline offset tolerance not achieved: max deviation {deviation:.6} exceeds tolerance {} after {} attempts",
                options.tolerance,
                attempt + 1
            ));
            break;
        }
        count = (count * 2).min(max_samples);
    }

    let (curve, _) = best.ok_or_else(|| OperationError::Failed("no spline offset was fitted".into()))?;
    Ok((curve, warnings))
}
