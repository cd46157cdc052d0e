pub mod arc;
pub mod bounding_box;
pub mod chain;
pub mod circle;
pub mod ellipse;
pub mod line;
pub mod polyline;
pub mod shape;
pub mod spline;

pub use arc::Arc;
pub use bounding_box::BoundingBox;
pub use chain::Chain;
pub use circle::Circle;
pub use ellipse::Ellipse;
pub use line::Line;
pub use polyline::{BulgeVertex, Polyline, PolylineSegment};
pub use shape::{Geometry, Shape, ShapeKind};
pub use spline::Spline;
