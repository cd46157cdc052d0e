use super::{cross, Point2, Vector2};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Winding number of the closed polygon `points` around `p`.
///
/// Zero when `p` lies outside. Self-intersecting polygons may give values
/// other than `-1`, `0` and `1`.
#[must_use]
pub fn winding_number_2d(p: &Point2, points: &[Point2]) -> i32 {
    let n = points.len();
    let mut wn = 0;
    for i in 0..n {
        let (a, b) = (&points[i], &points[(i + 1) % n]);
        let side = cross(&(b - a), &(p - a));
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            wn -= 1;
        }
    }
    wn
}

/// Returns the right-pointing normal of a direction vector
/// (the direction rotated 90° clockwise).
#[must_use]
pub fn right_normal(dir: &Vector2) -> Vector2 {
    Vector2::new(dir.y, -dir.x)
}
