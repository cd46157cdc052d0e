/// 2D arc math utilities.
///
/// Arcs are stored as `(center, radius, start_angle, end_angle, clockwise)`.
/// Internally most algorithms work with a signed sweep instead:
/// - `sweep > 0`: counter-clockwise
/// - `sweep < 0`: clockwise
///
/// Bulge convention (DXF polylines): `bulge = tan(sweep_angle / 4)`.
use std::f64::consts::{PI, TAU};

use super::{Point2, Vector2, ANGLE_TOLERANCE, TOLERANCE};

/// Normalizes an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Counter-clockwise angular distance from `from` to `to`, in `(0, 2π]`.
///
/// Coincident angles give a full turn.
#[must_use]
pub fn ccw_span(from: f64, to: f64) -> f64 {
    let span = normalize_angle(to - from);
    if span < ANGLE_TOLERANCE || TAU - span < ANGLE_TOLERANCE {
        TAU
    } else {
        span
    }
}

/// Signed sweep of an arc running from `start_angle` to `end_angle`.
#[must_use]
pub fn arc_sweep(start_angle: f64, end_angle: f64, clockwise: bool) -> f64 {
    if clockwise {
        -ccw_span(end_angle, start_angle)
    } else {
        ccw_span(start_angle, end_angle)
    }
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, start_angle: f64, sweep: f64, t: f64) -> Point2 {
    let angle = start_angle + sweep * t;
    Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// Computes the unit tangent direction on an arc at parameter `t` in `[0, 1]`.
///
/// The tangent points in the direction of increasing `t`.
#[must_use]
pub fn arc_tangent_at(start_angle: f64, sweep: f64, t: f64) -> Vector2 {
    let angle = start_angle + sweep * t;
    let sign = if sweep >= 0.0 { 1.0 } else { -1.0 };
    // Tangent to circle at angle θ is (-sin θ, cos θ) for CCW; negate for CW.
    Vector2::new(-sign * angle.sin(), sign * angle.cos())
}

/// Converts an absolute angle to an arc parameter `t` in `[0, 1]`.
///
/// Returns `None` if the angle is not within the arc's angular range
/// (with an angular slack of `eps` radians at both ends).
#[must_use]
pub fn angle_to_arc_param(angle: f64, start_angle: f64, sweep: f64, eps: f64) -> Option<f64> {
    if sweep.abs() < TOLERANCE {
        return None;
    }
    let delta = if sweep > 0.0 {
        normalize_angle(angle - start_angle)
    } else {
        -normalize_angle(start_angle - angle)
    };

    let t = delta / sweep;
    if t <= 1.0 + eps / sweep.abs() {
        return Some(t.clamp(0.0, 1.0));
    }
    // Just before the start: the normalized delta wrapped around a full turn.
    let wrapped = (TAU - delta.abs()) / sweep.abs();
    if wrapped <= eps / sweep.abs() {
        return Some(0.0);
    }
    None
}

/// Checks if an angle falls within an arc's angular range.
#[must_use]
pub fn angle_in_arc_range(angle: f64, start_angle: f64, sweep: f64) -> bool {
    angle_to_arc_param(angle, start_angle, sweep, 1e-10).is_some()
}

/// Converts a bulge-defined arc segment to center-radius-angle form.
///
/// Returns `(center, radius, start_angle, sweep)`, or `None` for a
/// zero-length chord or a zero bulge (straight segment).
#[must_use]
pub fn arc_from_bulge(p0: &Point2, p1: &Point2, bulge: f64) -> Option<(Point2, f64, f64, f64)> {
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let chord_len = (dx * dx + dy * dy).sqrt();

    if chord_len < 1e-12 || bulge.abs() < 1e-12 {
        return None;
    }

    // Distance from chord midpoint to center.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let mx = (p0.x + p1.x) * 0.5;
    let my = (p0.y + p1.y) * 0.5;

    // Normal to chord pointing toward center (for positive bulge, center is left of chord).
    let nx = -dy / chord_len;
    let ny = dx / chord_len;

    let cx = mx + sagitta_ratio * (chord_len * 0.5) * nx;
    let cy = my + sagitta_ratio * (chord_len * 0.5) * ny;

    // r = d*(1+b²)/(4*|b|) derived from r = d/(2*sin(θ/2)) with θ=4*atan(b)
    let radius = (chord_len * 0.5) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());
    let start_angle = (p0.y - cy).atan2(p0.x - cx);
    let sweep = (4.0 * bulge.atan()).clamp(-2.0 * PI, 2.0 * PI);

    Some((Point2::new(cx, cy), radius, start_angle, sweep))
}

/// Computes the number of line segments needed to approximate an arc
/// within the given tolerance.
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> usize {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // From the sagitta formula: sagitta = r * (1 - cos(θ/2))
    let max_angle = if tolerance >= radius {
        PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as usize;
    n.clamp(1, 4096)
}
