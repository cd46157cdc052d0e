use thiserror::Error;

/// Top-level error type for the offset engine.
///
/// Public `offset_*` functions never return this directly; they convert it
/// into the `errors` list of an [`OffsetResult`](crate::operations::offset::OffsetResult).
#[derive(Debug, Error)]
pub enum OffsetError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Input invariant violations, detected before any computation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Cannot offset zero-length line")]
    ZeroLengthLine,

    #[error("Degenerate ellipse: {0}")]
    DegenerateEllipse(String),

    #[error("Spline must have at least 2 control points, got {0}")]
    TooFewControlPoints(usize),

    #[error("Invalid spline degree {degree}: must satisfy 0 < degree < {control_points}")]
    InvalidDegree { degree: usize, control_points: usize },

    #[error("Invalid knot vector length: expected {expected}, got {actual}")]
    KnotCount { expected: usize, actual: usize },

    #[error("Invalid knot vector: {0}")]
    KnotVector(String),

    #[error("Invalid weights length: expected {expected}, got {actual}")]
    WeightCount { expected: usize, actual: usize },

    #[error("Invalid spline weight {0}: weights must be positive")]
    NonPositiveWeight(f64),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Failures of an offset operation on valid input.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Offset would create negative radius: {0}")]
    NegativeRadius(f64),

    #[error("Inset distance {distance} exceeds ellipse semi-minor axis {semi_minor}")]
    EllipseCollapse { distance: f64, semi_minor: f64 },

    #[error("Insufficient valid sample points for ellipse offset: {valid} < {required}")]
    InsufficientSamples { valid: usize, required: usize },

    #[error("Curve fitting failed: {0}")]
    Fitting(String),

    #[error("Inset distance collapses chain: {0}")]
    Collapsed(String),

    #[error("Offset cancelled: {0}")]
    Cancelled(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`OffsetError`].
pub type Result<T> = std::result::Result<T, OffsetError>;
