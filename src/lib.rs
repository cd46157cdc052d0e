//! Constant-distance offsets of 2D drawing geometry for CAM toolpaths.
//!
//! Single shapes are offset with [`offset_shape`] (or the per-kind
//! `offset_*` functions); connected chains of shapes with [`offset_chain`].

pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;

pub use error::{GeometryError, OffsetError, OperationError, Result};
pub use geometry::{
    Arc, BoundingBox, BulgeVertex, Chain, Circle, Ellipse, Geometry, Line, Polyline,
    PolylineSegment, Shape, ShapeKind, Spline,
};
pub use math::{Point2, Vector2};
pub use operations::offset::{
    offset_arc, offset_chain, offset_chain_both_sides, offset_circle, offset_ellipse, offset_line,
    offset_polyline, offset_polyline_with_params, offset_shape, offset_shape_with_options,
    offset_spline, offset_spline_with_options, offset_tagged, ChainOffsetMetrics,
    ChainOffsetParameters, ChainOffsetResult, IntersectionKind, IntersectionPoint,
    IntersectionType, OffsetDirection, OffsetResult, SplineOffsetOptions,
};
