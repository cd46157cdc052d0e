use crate::geometry::{Geometry, Line, Shape};
use crate::math::polygon_2d::right_normal;

use super::{OffsetDirection, OffsetResult};

/// Offsets a line segment by translating both endpoints along its right
/// normal (the direction rotated 90° clockwise).
///
/// Outset moves the line to the right when walking from start to end.
#[must_use]
pub fn offset_line(line: &Line, distance: f64, direction: OffsetDirection) -> OffsetResult {
    if direction.is_noop(distance) {
        return OffsetResult::noop();
    }
    let dir = match line.direction() {
        Ok(d) => d,
        Err(e) => return e.into(),
    };
    let shift = right_normal(&dir) * direction.signed(distance);
    let offset = Line::new(line.start + shift, line.end + shift);
    OffsetResult::ok(vec![Shape::new(Geometry::Line(offset))])
}
