use super::arc_2d::{angle_in_arc_range, arc_point_at};
use super::Point2;

/// Returns the minimum distance from point `p` to the segment `a`–`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (p - a).norm();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm()
}

/// Returns the perpendicular distance from `p` to the infinite line through
/// `a` and `b`.
#[must_use]
pub fn point_to_line_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len = d.norm();
    if len < 1e-12 {
        return (p - a).norm();
    }
    ((p - a).x * d.y - (p - a).y * d.x).abs() / len
}

/// Returns the minimum distance from `p` to a circular arc.
///
/// If the point's angle (relative to center) falls within the arc range,
/// the distance is `||p - center| - radius|`. Otherwise it is the distance
/// to the nearer arc endpoint.
#[must_use]
pub fn point_to_arc_dist(
    p: &Point2,
    center: &Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> f64 {
    let delta = p - center;
    let dist_to_center = delta.norm();

    let angle = delta.y.atan2(delta.x);
    if angle_in_arc_range(angle, start_angle, sweep) {
        return (dist_to_center - radius).abs();
    }

    let ep0 = arc_point_at(center, radius, start_angle, sweep, 0.0);
    let ep1 = arc_point_at(center, radius, start_angle, sweep, 1.0);
    (p - ep0).norm().min((p - ep1).norm())
}

/// Returns the minimum distance from `p` to an open polyline through `points`.
#[must_use]
pub fn point_to_points_dist(p: &Point2, points: &[Point2]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => (p - single).norm(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
