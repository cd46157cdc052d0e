use super::arc_2d::angle_to_arc_param;
use super::{cross, Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let denom = cross(d1, d2);
    if denom.abs() < TOLERANCE * d1.norm().max(1.0) * d2.norm().max(1.0) {
        return None;
    }
    let delta = p2 - p1;
    let t = cross(&delta, d2) / denom;
    let u = cross(&delta, d1) / denom;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE * 100.0;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((a0 + da * t_clamped, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of the infinite line through `p0`, `p1` with a full circle.
///
/// Returns `(point, t)` pairs where `t` is the unbounded line parameter
/// (`0` at `p0`, `1` at `p1`), sorted by `t`.
#[must_use]
pub fn line_circle_intersect_2d(
    p0: &Point2,
    p1: &Point2,
    center: &Point2,
    radius: f64,
) -> Vec<(Point2, f64)> {
    let d = p1 - p0;
    let a = d.norm_squared();
    if a < TOLERANCE * TOLERANCE || radius < TOLERANCE {
        return Vec::new();
    }

    // Substitute parametric line into circle equation:
    // |p0 + t*d - c|² = r²
    let f = p0 - center;
    let b = 2.0 * f.dot(&d);
    let c = f.norm_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    // Relative slack so that tangent lines still register a touch point.
    let slack = 1e-9 * (b * b).max(4.0 * a * radius * radius);
    if discriminant < -slack {
        return Vec::new();
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();

    let roots = if disc_sqrt <= slack.sqrt() {
        // Tangent case: single root.
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    };
    roots.into_iter().map(|t| (p0 + d * t, t)).collect()
}

/// Intersection points of two full circles.
///
/// Concentric circles report no intersections.
#[must_use]
pub fn circle_circle_intersect_2d(c1: &Point2, r1: f64, c2: &Point2, r2: f64) -> Vec<Point2> {
    if r1 < TOLERANCE || r2 < TOLERANCE {
        return Vec::new();
    }
    let delta = c2 - c1;
    let dist_sq = delta.norm_squared();
    let dist = dist_sq.sqrt();

    if dist < TOLERANCE {
        return Vec::new();
    }

    // Check if circles intersect.
    let slack = 1e-9 * (r1 + r2);
    if dist > r1 + r2 + slack || dist < (r1 - r2).abs() - slack {
        return Vec::new();
    }

    // Distance from c1 along the line c1→c2 to the radical line.
    let a = (r1 * r1 - r2 * r2 + dist_sq) / (2.0 * dist);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let dir = delta / dist;
    let mid = c1 + dir * a;
    let perp = Vector2::new(-dir.y, dir.x);

    if h < slack {
        vec![mid]
    } else {
        vec![mid + perp * h, mid - perp * h]
    }
}

/// Intersection of a line segment with a circular arc.
///
/// The arc has `center`, `radius`, `start_angle`, and signed `sweep`.
///
/// Returns a vector of `(point, t_seg, t_arc)` where both parameters are
/// in `[0, 1]`.
#[must_use]
pub fn line_arc_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    center: &Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> Vec<(Point2, f64, f64)> {
    if sweep.abs() < TOLERANCE {
        return Vec::new();
    }
    let eps = TOLERANCE * 100.0;
    let seg_len = (a1 - a0).norm();
    line_circle_intersect_2d(a0, a1, center, radius)
        .into_iter()
        .filter(|(_, t)| *t >= -eps && *t <= 1.0 + eps)
        .filter_map(|(p, t)| {
            let angle = (p.y - center.y).atan2(p.x - center.x);
            let slack = (eps * seg_len.max(1.0)) / radius.max(TOLERANCE);
            angle_to_arc_param(angle, start_angle, sweep, slack)
                .map(|t_arc| (p, t.clamp(0.0, 1.0), t_arc))
        })
        .collect()
}

/// Intersection of two circular arcs.
///
/// Returns a vector of `(point, t1, t2)` where `t1` and `t2` are arc
/// parameters in `[0, 1]`.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn arc_arc_intersect_2d(
    c1: &Point2,
    r1: f64,
    start1: f64,
    sweep1: f64,
    c2: &Point2,
    r2: f64,
    start2: f64,
    sweep2: f64,
) -> Vec<(Point2, f64, f64)> {
    let slack1 = 1e-8 / r1.max(TOLERANCE);
    let slack2 = 1e-8 / r2.max(TOLERANCE);
    circle_circle_intersect_2d(c1, r1, c2, r2)
        .into_iter()
        .filter_map(|p| {
            let angle1 = (p.y - c1.y).atan2(p.x - c1.x);
            let angle2 = (p.y - c2.y).atan2(p.x - c2.x);
            let t1 = angle_to_arc_param(angle1, start1, sweep1, slack1)?;
            let t2 = angle_to_arc_param(angle2, start2, sweep2, slack2)?;
            Some((p, t1, t2))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn line_line_perpendicular() {
        let (t, u) = line_line_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Vector2::new(1.0, 0.0),
            &Point2::new(0.5, -1.0),
            &Vector2::new(0.0, 1.0),
        )
        .unwrap();
        assert_abs_diff_eq!(t, 0.5, epsilon = TOLERANCE);
        assert_abs_diff_eq!(u, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn line_line_parallel_returns_none() {
        assert!(line_line_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Vector2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Vector2::new(1.0, 0.0),
        )
        .is_none());
    }

    #[test]
    fn segment_segment_crossing() {
        let (pt, t, u) = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        )
        .unwrap();
        assert_abs_diff_eq!(pt.x, 1.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(pt.y, 1.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(t, 0.5, epsilon = TOLERANCE);
        assert_abs_diff_eq!(u, 0.5, epsilon = TOLERANCE);
    }

    #[test]
    fn segment_segment_no_crossing() {
        assert!(segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn line_circle_unbounded_params() {
        let hits = line_circle_intersect_2d(
            &Point2::new(2.0, 0.0),
            &Point2::new(3.0, 0.0),
            &Point2::origin(),
            1.0,
        );
        assert_eq!(hits.len(), 2);
        assert_abs_diff_eq!(hits[0].1, -3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hits[1].1, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn line_arc_two_crossings() {
        // Horizontal segment through a full turn arc.
        let hits = line_arc_intersect_2d(
            &Point2::new(-2.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::origin(),
            1.0,
            0.0,
            TAU,
        );
        assert_eq!(hits.len(), 2, "hits={hits:?}");
    }

    #[test]
    fn line_arc_tangent() {
        let hits = line_arc_intersect_2d(
            &Point2::new(-1.0, 1.0),
            &Point2::new(1.0, 1.0),
            &Point2::origin(),
            1.0,
            0.0,
            PI,
        );
        assert_eq!(hits.len(), 1, "hits={hits:?}");
        assert_abs_diff_eq!(hits[0].0.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(hits[0].2, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn line_arc_miss_outside_arc_range() {
        let hits = line_arc_intersect_2d(
            &Point2::new(-2.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::origin(),
            1.0,
            PI / 4.0,
            PI / 4.0,
        );
        assert!(hits.is_empty(), "hits={hits:?}");
    }

    #[test]
    fn arc_arc_two_crossings() {
        let hits = arc_arc_intersect_2d(
            &Point2::origin(),
            1.0,
            -PI,
            TAU,
            &Point2::new(1.0, 0.0),
            1.0,
            0.0,
            TAU,
        );
        assert_eq!(hits.len(), 2, "hits={hits:?}");
        let sqrt3_2 = 3.0_f64.sqrt() / 2.0;
        let mut ys: Vec<f64> = hits.iter().map(|h| h.0.y).collect();
        ys.sort_by(f64::total_cmp);
        assert_abs_diff_eq!(ys[0], -sqrt3_2, epsilon = 1e-9);
        assert_abs_diff_eq!(ys[1], sqrt3_2, epsilon = 1e-9);
    }

    #[test]
    fn arc_arc_tangent() {
        let hits = arc_arc_intersect_2d(
            &Point2::origin(),
            1.0,
            -PI / 4.0,
            PI / 2.0,
            &Point2::new(2.0, 0.0),
            1.0,
            PI / 2.0,
            PI,
        );
        assert_eq!(hits.len(), 1, "hits={hits:?}");
        assert_abs_diff_eq!(hits[0].0.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn arc_arc_miss_outside_range() {
        let hits = arc_arc_intersect_2d(
            &Point2::origin(),
            1.0,
            0.0,
            PI / 4.0,
            &Point2::new(1.0, 0.0),
            1.0,
            PI,
            PI / 4.0,
        );
        assert!(hits.is_empty(), "hits={hits:?}");
    }

    #[test]
    fn concentric_circles_do_not_intersect() {
        assert!(circle_circle_intersect_2d(&Point2::origin(), 1.0, &Point2::origin(), 1.0).is_empty());
    }
}
