use crate::geometry::{Chain, Geometry, Polyline, PolylineSegment, Shape};

use super::chain::{offset_chain, ChainOffsetParameters};
use super::{OffsetDirection, OffsetResult};

/// Offsets a polyline through the chain engine with default parameters.
///
/// See [`offset_polyline_with_params`].
#[must_use]
pub fn offset_polyline(polyline: &Polyline, distance: f64, direction: OffsetDirection) -> OffsetResult {
    offset_polyline_with_params(polyline, distance, direction, &ChainOffsetParameters::default())
}

/// Offsets a polyline as a one-shape chain.
///
/// The result is a single [`Polyline`] when every offset piece is a line or
/// an arc; otherwise the individual pieces are returned. Callers must accept
/// either form.
#[must_use]
pub fn offset_polyline_with_params(
    polyline: &Polyline,
    distance: f64,
    direction: OffsetDirection,
    params: &ChainOffsetParameters,
) -> OffsetResult {
    if direction.is_noop(distance) {
        return OffsetResult::noop();
    }
    if polyline.segments.is_empty() {
        return OffsetResult::failure("Polyline has no segments to offset");
    }
    let chain = Chain::new(vec![Shape::polyline(polyline.clone())]);
    let result = offset_chain(&chain, direction.signed(distance), params);
    if !result.success {
        return OffsetResult {
            success: false,
            shapes: Vec::new(),
            warnings: result.warnings,
            errors: result.errors,
        };
    }
    let Some(side) = result.single_chain().cloned() else {
        return OffsetResult::failure("Chain offset produced no geometry for the requested side")
            .with_warnings(result.warnings);
    };
    OffsetResult::ok(merge(side, polyline.closed)).with_warnings(result.warnings)
}

/// Folds line and arc shapes back into one polyline.
fn merge(chain: Chain, closed: bool) -> Vec<Shape> {
    let segments: Option<Vec<PolylineSegment>> = chain
        .shapes
        .iter()
        .map(|s| match &s.geometry {
            Geometry::Line(l) => Some(PolylineSegment::Line(*l)),
            Geometry::Arc(a) => Some(PolylineSegment::Arc(*a)),
            _ => None,
        })
        .collect();
    match segments {
        Some(segments) => vec![Shape::polyline(Polyline::new(segments, closed))],
        None => chain.shapes,
    }
}
