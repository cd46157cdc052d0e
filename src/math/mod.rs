pub mod arc_2d;
pub mod distance_2d;
pub mod intersect_2d;
pub mod nurbs;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance used when deciding whether two points coincide.
pub const POINT_TOLERANCE: f64 = 1e-6;

/// Tolerance for deciding that an angular range spans a full turn.
pub const ANGLE_TOLERANCE: f64 = 1e-9;

/// Z component of the 2D cross product `a x b`.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Returns true when `a` and `b` are within `tolerance` of each other.
#[must_use]
pub fn points_close(a: &Point2, b: &Point2, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}
