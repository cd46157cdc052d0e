//! Offsetting connected chains of shapes.
//!
//! The pipeline runs in stages, each in its own module:
//!
//! 1. [`members`]: reject malformed shapes, flatten polylines and circles,
//!    orient members along the traversal and decide whether the chain is
//!    closed;
//! 2. [`raw_offset`]: offset every member through the shape dispatcher;
//! 3. [`join`]: reconnect neighbouring pieces (trim, extend, snap, round or
//!    bridge);
//! 4. [`self_intersect`], [`slice`], [`filter`], [`stitch`]: cut the chain
//!    where non-neighbouring pieces cross, drop parts that come too close to
//!    the source and stitch the rest;
//! 5. validate the result against the source area and crossings.
//!
//! A closed source that crosses itself has no single outer side. It is
//! offset on both sides and the pieces are sorted by the region its outline
//! encloses, counting every area with a non-zero winding number.

mod filter;
mod join;
mod members;
mod params;
mod piece;
mod raw_offset;
mod result;
mod self_intersect;
mod slice;
mod stitch;

use std::time::Instant;

use tracing::{debug, warn};

use crate::error::{OffsetError, OperationError, Result};
use crate::geometry::Chain;
use crate::math::polygon_2d::{signed_area_2d, winding_number_2d};
use crate::math::Vector2;

use self::join::JoinReport;
use self::members::{Member, SourceProfile};
use self::piece::{outline, Origin, Piece};
use self::raw_offset::Side;
use self::self_intersect::Intersection;

pub use params::{ChainOffsetParameters, IntersectionType};
pub use result::{ChainOffsetMetrics, ChainOffsetResult, IntersectionKind, IntersectionPoint};

/// Step off a source edge used to tell its inside from its outside.
const REGION_STEP: f64 = 1e-6;

/// Offsets a chain by a signed distance.
///
/// A positive distance builds the outer chain, a negative one the inner
/// chain. For closed chains the outer side is the one away from the enclosed
/// area; for open chains it is the right-hand side of the traversal.
///
/// Malformed shapes fail the chain before anything is offset. Any member
/// that cannot be offset fails the whole chain unless `params.allow_gaps` is
/// set.
#[must_use]
pub fn offset_chain(chain: &Chain, distance: f64, params: &ChainOffsetParameters) -> ChainOffsetResult {
    let started = Instant::now();
    let mut result = if distance == 0.0 {
        ChainOffsetResult::noop()
    } else if !distance.is_finite() {
        ChainOffsetResult::failure(format!("Invalid offset distance: {distance}"))
    } else if chain.is_empty() {
        ChainOffsetResult::failure("Chain has no shapes to offset")
    } else {
        let rejected = members::invalid_shapes(chain);
        if rejected.is_empty() {
            let outer = distance > 0.0;
            let mut builder = ChainBuilder::new(chain, distance.abs(), params);
            let outcome = builder.run(outer);
            builder.finish(outcome, outer)
        } else {
            warn!(chain = %chain.id, shapes = rejected.len(), "chain holds malformed shapes");
            ChainOffsetResult {
                errors: rejected,
                ..ChainOffsetResult::default()
            }
        }
    };
    result.metrics.input_shapes = chain.len();
    result.metrics.elapsed = started.elapsed();
    result
}

/// Builds both the outer and the inner chain at `|distance|`.
///
/// A side that fails is left out and its errors are reported as warnings;
/// the call fails only when neither side can be built.
#[must_use]
pub fn offset_chain_both_sides(
    chain: &Chain,
    distance: f64,
    params: &ChainOffsetParameters,
) -> ChainOffsetResult {
    if distance == 0.0 {
        let mut result = ChainOffsetResult::noop();
        result.metrics.input_shapes = chain.len();
        return result;
    }
    let d = distance.abs();
    let outer = offset_chain(chain, d, params);
    let inner = offset_chain(chain, -d, params);

    let mut merged = ChainOffsetResult {
        success: outer.success || inner.success,
        metrics: outer.metrics.merge(&inner.metrics),
        ..ChainOffsetResult::default()
    };
    for (label, side) in [("Outer", outer), ("Inner", inner)] {
        merged.warnings.extend(side.warnings);
        merged.intersection_points.extend(side.intersection_points);
        if side.success {
            merged.outer_chain = merged.outer_chain.or(side.outer_chain);
            merged.inner_chain = merged.inner_chain.or(side.inner_chain);
        } else if merged.success {
            merged
                .warnings
                .extend(side.errors.iter().map(|e| format!("{label} side omitted: {e}")));
        } else {
            merged
                .errors
                .extend(side.errors.iter().map(|e| format!("{label} side: {e}")));
        }
    }
    merged
}

/// Area of the region enclosed by a closed outline that crosses itself.
///
/// The outline is cut at its own crossings; only the parts with the outside
/// on exactly one hand bound the region. `None` when the outline has no
/// crossing.
fn enclosed_region_area(source: &SourceProfile) -> Option<f64> {
    let ring = source.ring();
    let n = ring.len();
    let pieces: Vec<Piece> = (0..n)
        .map(|i| Piece::line(ring[i], ring[(i + 1) % n], Origin::Bridge))
        .filter(|p| p.length() > 1e-12)
        .collect();
    let hits = self_intersect::find_all(&pieces, true, false);
    if hits.is_empty() {
        return None;
    }
    let boundary: Vec<slice::Slice> = slice::build(&pieces, &hits, true)
        .into_iter()
        .filter(|s| {
            let mid = &s.pieces[s.pieces.len() / 2];
            let Some(t) = mid.tangent_at(0.5) else {
                return false;
            };
            let at = mid.point_at(0.5);
            let step = Vector2::new(-t.y, t.x) * REGION_STEP;
            source.contains(&(at + step)) != source.contains(&(at - step))
        })
        .collect();
    let area = stitch::connect(boundary)
        .iter()
        .filter(|l| l.closed)
        .map(|l| signed_area_2d(&outline(&l.pieces)).abs())
        .sum();
    debug!(crossings = hits.len(), area, "source outline crosses itself");
    Some(area)
}

/// Accumulates the state of one chain offset.
struct ChainBuilder<'a> {
    params: &'a ChainOffsetParameters,
    abs_distance: f64,
    members: Vec<Member>,
    closed: bool,
    source: SourceProfile,
    /// Area of the enclosed region when the closed source crosses itself.
    tangled_area: Option<f64>,
    warnings: Vec<String>,
    errors: Vec<String>,
    points: Vec<IntersectionPoint>,
    metrics: ChainOffsetMetrics,
}

impl<'a> ChainBuilder<'a> {
    fn new(chain: &Chain, abs_distance: f64, params: &'a ChainOffsetParameters) -> Self {
        let mut members = members::flatten(chain);
        members::orient(&mut members, params.snap_threshold);
        let closed = members::is_closed(&members, params.snap_threshold);
        let source = SourceProfile::new(&members);
        let tangled_area = if closed {
            enclosed_region_area(&source)
        } else {
            None
        };
        debug!(
            chain = %chain.id,
            members = members.len(),
            closed,
            tangled = tangled_area.is_some(),
            "prepared chain for offset"
        );
        Self {
            params,
            abs_distance,
            members,
            closed,
            source,
            tangled_area,
            warnings: Vec::new(),
            errors: Vec::new(),
            points: Vec::new(),
            metrics: ChainOffsetMetrics::default(),
        }
    }

    fn approximate(&self) -> bool {
        self.params.intersection_type == IntersectionType::Approximate
    }

    /// Traversal side that holds the requested offset.
    fn side(&self, outer: bool) -> Side {
        let outer_side = if !self.closed || self.source.signed_area() > 0.0 {
            Side::Right
        } else {
            Side::Left
        };
        if outer {
            outer_side
        } else {
            outer_side.opposite()
        }
    }

    fn check_deadline(&self, stage: &str) -> Result<()> {
        if self.params.deadline_passed() {
            return Err(OperationError::Cancelled(format!("deadline passed before {stage}")).into());
        }
        Ok(())
    }

    fn run(&mut self, outer: bool) -> Result<Vec<Piece>> {
        if self.members.is_empty() {
            return Err(OperationError::InvalidInput("chain has no offsettable geometry".into()).into());
        }
        if self.tangled_area.is_some() {
            return self.run_tangled(outer);
        }
        let side = self.side(outer);
        debug!(?side, outer, distance = self.abs_distance, "offsetting chain members");

        self.check_deadline("member offsets")?;
        let raw = raw_offset::build(&self.members, side, self.abs_distance, self.params);
        self.warnings.extend(raw.warnings);
        if !raw.errors.is_empty() {
            let failed = raw.errors.len();
            self.errors.extend(raw.errors);
            return Err(OperationError::Failed(format!(
                "{failed} of {} chain members could not be offset",
                self.members.len()
            ))
            .into());
        }
        if raw.pieces.is_empty() {
            return Err(OperationError::Failed("no chain member could be offset".into()).into());
        }

        self.check_deadline("joining")?;
        let joined = self.join(raw.pieces);

        self.check_deadline("self-intersection removal")?;
        let resolved = self.resolve_self_intersections(joined, outer)?;
        self.validate(&resolved, outer)?;
        Ok(resolved)
    }

    /// Offsets a closed source that crosses itself.
    ///
    /// Both sides are offset and joined into separate rings. The left ring is
    /// reversed so that every ring runs with the source on its left. The
    /// rings are cut wherever they cross, and the slices that keep their
    /// distance and lie on the requested side of the enclosed region are
    /// stitched.
    fn run_tangled(&mut self, outer: bool) -> Result<Vec<Piece>> {
        debug!(outer, distance = self.abs_distance, "offsetting self-crossing chain on both sides");
        self.check_deadline("member offsets")?;
        let mut sides = Vec::with_capacity(2);
        for side in [Side::Right, Side::Left] {
            let raw = raw_offset::build(&self.members, side, self.abs_distance, self.params);
            self.warnings.extend(raw.warnings);
            // A member may have no offset on one side (an arc shrinking past
            // its center); the other side still bounds the region there.
            for e in raw.errors {
                debug!(?side, error = %e, "member left out of one side");
                self.warnings.push(format!("{e} (left out of one side)"));
            }
            sides.push((side, raw.pieces));
        }
        if sides.iter().all(|(_, pieces)| pieces.is_empty()) {
            return Err(OperationError::Failed("no chain member could be offset".into()).into());
        }

        self.check_deadline("joining")?;
        let mut pieces: Vec<Piece> = Vec::new();
        let mut rings = Vec::with_capacity(2);
        for (side, raw) in sides {
            let joined = self.join(raw);
            let start = pieces.len();
            match side {
                Side::Right => pieces.extend(joined),
                Side::Left => pieces.extend(joined.iter().rev().map(Piece::reversed)),
            }
            rings.push(start..pieces.len());
        }

        self.check_deadline("self-intersection removal")?;
        let hits = self_intersect::find_in_rings(&pieces, &rings, self.approximate());
        self.record_crossings(&pieces, &hits);
        let slices = slice::build_rings(&pieces, &rings, &hits);
        let kept = filter::apply(slices, &self.source, self.abs_distance, self.params.tolerance);
        let kept = filter::by_region(kept, &self.source, outer);
        if kept.is_empty() {
            return Err(self.collapsed_or_failed(
                outer,
                format!("no part of the offset stays {} from the source", self.abs_distance),
            ));
        }
        let best = self.keep_one(stitch::connect(kept), outer)?;
        self.validate(&best, outer)?;
        Ok(best)
    }

    fn join(&mut self, pieces: Vec<Piece>) -> Vec<Piece> {
        let mut report = JoinReport::default();
        let joined = join::connect(
            pieces,
            &self.members,
            self.closed,
            self.abs_distance,
            self.params,
            &mut report,
        );
        self.metrics.gaps_filled += report.gaps_filled;
        self.metrics.overlaps_trimmed += report.overlaps_trimmed;
        self.points.extend(report.points);
        self.warnings.extend(report.warnings);
        joined
    }

    fn shape_indices(&self, pieces: &[&Piece]) -> Vec<usize> {
        let mut indices: Vec<usize> = pieces
            .iter()
            .filter_map(|p| p.member())
            .map(|m| self.members[m].shape_index)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    fn collapsed_or_failed(&self, outer: bool, message: String) -> OffsetError {
        if outer {
            OperationError::Failed(message).into()
        } else {
            OperationError::Collapsed(message).into()
        }
    }

    fn record_crossings(&mut self, pieces: &[Piece], hits: &[Intersection]) {
        self.metrics.self_intersections += hits.len();
        for hit in hits {
            let shape_indices = self.shape_indices(&[&pieces[hit.piece_i], &pieces[hit.piece_j]]);
            self.points.push(IntersectionPoint {
                point: hit.point,
                kind: IntersectionKind::SelfIntersection,
                shape_indices,
            });
        }
    }

    /// Cuts the chain at crossings between non-neighbouring pieces, drops
    /// the parts closer to the source than the offset distance and stitches
    /// what remains.
    fn resolve_self_intersections(&mut self, pieces: Vec<Piece>, outer: bool) -> Result<Vec<Piece>> {
        let hits = self_intersect::find_all(&pieces, self.closed, self.approximate());
        if hits.is_empty() {
            return Ok(pieces);
        }
        debug!(crossings = hits.len(), "resolving offset self-intersections");
        self.record_crossings(&pieces, &hits);

        let slices = slice::build(&pieces, &hits, self.closed);
        let kept = filter::apply(slices, &self.source, self.abs_distance, self.params.tolerance);
        if kept.is_empty() {
            return Err(self.collapsed_or_failed(
                outer,
                format!("no part of the offset stays {} from the source", self.abs_distance),
            ));
        }
        self.keep_one(stitch::connect(kept), outer)
    }

    /// Keeps the closed loop with the largest area (the longest run for open
    /// chains) and warns about the rest.
    fn keep_one(&mut self, loops: Vec<stitch::Loop>, outer: bool) -> Result<Vec<Piece>> {
        let total = loops.len();
        let best = if self.closed {
            loops
                .into_iter()
                .filter(|l| l.closed)
                .max_by(|a, b| {
                    let area = |l: &stitch::Loop| signed_area_2d(&outline(&l.pieces)).abs();
                    area(a).total_cmp(&area(b))
                })
        } else {
            loops.into_iter().max_by(|a, b| {
                let length = |l: &stitch::Loop| l.pieces.iter().map(Piece::length).sum::<f64>();
                length(a).total_cmp(&length(b))
            })
        };
        let Some(best) = best else {
            return Err(self.collapsed_or_failed(outer, "stitching left no closed loop".into()));
        };
        if total > 1 {
            let discarded = total - 1;
            warn!(discarded, "keeping the largest offset loop");
            self.warnings.push(format!(
                "Offset split into {total} loops; kept the largest and discarded {discarded}"
            ));
        }
        Ok(best.pieces)
    }

    fn validate(&self, pieces: &[Piece], outer: bool) -> Result<()> {
        if pieces.is_empty() {
            return Err(self.collapsed_or_failed(outer, "offset produced no geometry".into()));
        }
        if let Some(region) = self.tangled_area {
            self.validate_region(pieces, region, outer)?;
        } else if self.closed {
            let area = signed_area_2d(&outline(pieces));
            let source_area = self.source.signed_area();
            let same_winding = area.signum() == source_area.signum();
            let min_area = self.params.tolerance * self.params.tolerance;
            if outer {
                if !same_winding || area.abs() <= source_area.abs() {
                    return Err(OperationError::Failed(format!(
                        "outset area {area:.6} does not enclose source area {source_area:.6}"
                    ))
                    .into());
                }
            } else if !same_winding || area.abs() >= source_area.abs() || area.abs() < min_area {
                return Err(OperationError::Collapsed(format!(
                    "distance {} leaves area {area:.6} from source area {source_area:.6}",
                    self.abs_distance
                ))
                .into());
            }
        }
        if let Some(hit) = self_intersect::find_all(pieces, self.closed, self.approximate()).first() {
            return Err(OperationError::Failed(format!(
                "offset chain still self-intersects at ({:.6}, {:.6})",
                hit.point.x, hit.point.y
            ))
            .into());
        }
        Ok(())
    }

    /// Checks an offset of a self-crossing source against the region it
    /// encloses. An outset must cover the whole outline.
    fn validate_region(&self, pieces: &[Piece], region: f64, outer: bool) -> Result<()> {
        let ring = outline(pieces);
        let area = signed_area_2d(&ring).abs();
        if outer {
            let uncovered = self
                .source
                .ring()
                .iter()
                .any(|p| winding_number_2d(p, &ring) == 0);
            if uncovered || area <= region {
                return Err(OperationError::Failed(format!(
                    "outset area {area:.6} does not enclose source region area {region:.6}"
                ))
                .into());
            }
        } else if area >= region || area < self.params.tolerance * self.params.tolerance {
            return Err(OperationError::Collapsed(format!(
                "distance {} leaves area {area:.6} from source region area {region:.6}",
                self.abs_distance
            ))
            .into());
        }
        Ok(())
    }

    fn finish(mut self, outcome: Result<Vec<Piece>>, outer: bool) -> ChainOffsetResult {
        let mut result = ChainOffsetResult::default();
        match outcome {
            Ok(pieces) => {
                let shapes: Vec<_> = pieces.into_iter().map(Piece::into_shape).collect();
                self.metrics.output_shapes = shapes.len();
                let chain = Chain::new(shapes);
                if outer {
                    result.outer_chain = Some(chain);
                } else {
                    result.inner_chain = Some(chain);
                }
                result.success = true;
            }
            Err(e) => {
                warn!(error = %e, "chain offset failed");
                self.errors.push(e.to_string());
            }
        }
        result.warnings = self.warnings;
        result.errors = self.errors;
        result.intersection_points = self.points;
        result.metrics = self.metrics;
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Arc, Geometry, Polyline, Shape};
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;
    use std::time::Duration;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn rectangle(w: f64, h: f64, ccw: bool) -> Chain {
        let mut pts = vec![p(0.0, 0.0), p(w, 0.0), p(w, h), p(0.0, h)];
        if !ccw {
            pts.reverse();
        }
        Chain::new((0..4).map(|i| Shape::line(pts[i], pts[(i + 1) % 4])).collect())
    }

    fn assert_closed_and_connected(chain: &Chain) {
        let n = chain.shapes.len();
        for i in 0..n {
            let end = chain.shapes[i].end_point().unwrap();
            let start = chain.shapes[(i + 1) % n].start_point().unwrap();
            assert!((end - start).norm() < 1e-6, "gap between {i} and {}", (i + 1) % n);
        }
    }

    #[test]
    fn outer_rectangle_is_mitred() {
        for ccw in [true, false] {
            let r = offset_chain(&rectangle(10.0, 6.0, ccw), 1.5, &ChainOffsetParameters::default());
            assert!(r.success, "{:?}", r.errors);
            let outer = r.outer_chain.as_ref().unwrap();
            assert!(r.inner_chain.is_none());
            assert_eq!(outer.len(), 4);
            let bbox = outer.bounding_box().unwrap();
            assert_abs_diff_eq!(bbox.width(), 13.0, epsilon = 1e-9);
            assert_abs_diff_eq!(bbox.height(), 9.0, epsilon = 1e-9);
            assert_closed_and_connected(outer);
            assert_eq!(r.metrics.gaps_filled, 4);
            assert_eq!(r.metrics.input_shapes, 4);
            assert_eq!(r.metrics.output_shapes, 4);
            assert_eq!(outer.is_clockwise(), !ccw);
        }
    }

    #[test]
    fn inner_rectangle_is_trimmed() {
        let r = offset_chain(&rectangle(10.0, 6.0, true), -1.0, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        let inner = r.inner_chain.as_ref().unwrap();
        let bbox = inner.bounding_box().unwrap();
        assert_abs_diff_eq!(bbox.width(), 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.height(), 4.0, epsilon = 1e-9);
        assert_eq!(r.metrics.overlaps_trimmed, 4);
        assert_eq!(r.intersection_points.len(), 4);
        assert!(r.intersection_points.iter().all(|ip| ip.kind == IntersectionKind::Join));
    }

    #[test]
    fn collapsing_inset_fails_explicitly() {
        let r = offset_chain(&rectangle(10.0, 6.0, true), -4.0, &ChainOffsetParameters::default());
        assert!(!r.success);
        assert!(r.inner_chain.is_none());
        assert!(r.errors.iter().any(|e| e.contains("collapses chain")), "{:?}", r.errors);
    }

    #[test]
    fn circle_chain_offsets_radius() {
        let chain = Chain::new(vec![Shape::circle(p(1.0, 1.0), 8.0)]);
        let r = offset_chain(&chain, 4.0, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        let outer = r.outer_chain.unwrap();
        let Geometry::Arc(a) = &outer.shapes[0].geometry else {
            panic!("expected arc")
        };
        assert_abs_diff_eq!(a.radius, 12.0);

        let r = offset_chain(&chain, -9.0, &ChainOffsetParameters::default());
        assert!(!r.success);
        assert!(r.errors[0].starts_with("Shape 0 (circle): Offset would create negative radius"));
    }

    #[test]
    fn open_chain_sides() {
        let chain = Chain::new(vec![
            Shape::line(p(0.0, 0.0), p(10.0, 0.0)),
            Shape::line(p(10.0, 0.0), p(10.0, 10.0)),
        ]);
        let r = offset_chain_both_sides(&chain, 1.0, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        let outer = r.outer_chain.unwrap();
        let inner = r.inner_chain.unwrap();
        // Right of the traversal is below and to the right of the corner.
        assert_abs_diff_eq!((outer.start_point().unwrap() - p(0.0, -1.0)).norm(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!((outer.shapes[0].end_point().unwrap() - p(11.0, -1.0)).norm(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!((inner.shapes[0].end_point().unwrap() - p(9.0, 1.0)).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn reversed_members_are_followed() {
        let chain = Chain::new(vec![
            Shape::line(p(10.0, 0.0), p(0.0, 0.0)),
            Shape::line(p(10.0, 0.0), p(10.0, 10.0)),
        ]);
        let r = offset_chain(&chain, 1.0, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        let outer = r.outer_chain.unwrap();
        assert_eq!(outer.len(), 2);
        assert_abs_diff_eq!((outer.shapes[0].end_point().unwrap() - p(11.0, -1.0)).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn member_failures_are_aggregated() {
        // Slot: two lines joined by semicircles of radius 1.
        let chain = Chain::new(vec![
            Shape::line(p(0.0, 0.0), p(10.0, 0.0)),
            Shape::arc(Arc::new(p(10.0, 1.0), 1.0, -PI / 2.0, PI / 2.0, false)),
            Shape::line(p(10.0, 2.0), p(0.0, 2.0)),
            Shape::arc(Arc::new(p(0.0, 1.0), 1.0, PI / 2.0, 3.0 * PI / 2.0, false)),
        ]);
        let r = offset_chain(&chain, -1.5, &ChainOffsetParameters::default());
        assert!(!r.success);
        let member_errors: Vec<_> = r.errors.iter().filter(|e| e.starts_with("Shape ")).collect();
        assert_eq!(member_errors.len(), 2, "{:?}", r.errors);
        assert!(member_errors[0].starts_with("Shape 1 (arc)"));
        assert!(member_errors[1].starts_with("Shape 3 (arc)"));

        let r = offset_chain(&chain, 0.5, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        assert_closed_and_connected(r.outer_chain.as_ref().unwrap());
    }

    #[test]
    fn polyline_member_is_flattened() {
        let poly = Polyline::from_points(&[p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)], true);
        let r = offset_chain(&Chain::new(vec![Shape::polyline(poly)]), -1.0, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        let inner = r.inner_chain.unwrap();
        assert_eq!(inner.len(), 4);
        assert_abs_diff_eq!(inner.signed_area(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_distance_and_empty_chain() {
        let r = offset_chain(&rectangle(1.0, 1.0, true), 0.0, &ChainOffsetParameters::default());
        assert!(r.success && r.outer_chain.is_none() && r.inner_chain.is_none());
        let r = offset_chain(&Chain::new(Vec::new()), 1.0, &ChainOffsetParameters::default());
        assert!(!r.success);
        assert_eq!(r.errors, vec!["Chain has no shapes to offset".to_owned()]);
    }

    #[test]
    fn passed_deadline_cancels() {
        let params = ChainOffsetParameters {
            deadline: Some(Instant::now().checked_sub(Duration::from_millis(1)).unwrap_or_else(Instant::now)),
            ..ChainOffsetParameters::default()
        };
        let r = offset_chain(&rectangle(4.0, 4.0, true), 1.0, &params);
        assert!(!r.success);
        assert!(r.errors[0].starts_with("Offset cancelled"), "{:?}", r.errors);
    }

    #[test]
    fn both_sides_of_closed_chain() {
        let r = offset_chain_both_sides(&rectangle(10.0, 6.0, true), -1.0, &ChainOffsetParameters::default());
        assert!(r.success);
        assert!(r.outer_chain.is_some() && r.inner_chain.is_some());

        let r = offset_chain_both_sides(&rectangle(10.0, 6.0, true), 4.0, &ChainOffsetParameters::default());
        assert!(r.success);
        assert!(r.outer_chain.is_some());
        assert!(r.inner_chain.is_none());
        assert!(r.warnings.iter().any(|w| w.starts_with("Inner side omitted")), "{:?}", r.warnings);
    }

    #[test]
    fn deep_notch_self_intersection_is_removed() {
        // A U-shaped outline whose slot is narrower than twice the inset.
        let pts = [
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 10.0),
            p(6.0, 10.0),
            p(6.0, 2.0),
            p(4.0, 2.0),
            p(4.0, 10.0),
            p(0.0, 10.0),
        ];
        let chain = Chain::new(
            (0..pts.len())
                .map(|i| Shape::line(pts[i], pts[(i + 1) % pts.len()]))
                .collect(),
        );
        let r = offset_chain(&chain, -1.5, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        let inner = r.inner_chain.unwrap();
        assert!(inner.signed_area() > 0.0);
        assert!(inner.signed_area() < chain.signed_area());
        assert_closed_and_connected(&inner);
        assert!(r.metrics.self_intersections > 0);
        assert!(r
            .intersection_points
            .iter()
            .any(|ip| ip.kind == IntersectionKind::SelfIntersection));
    }

    fn closed_lines(pts: &[Point2]) -> Chain {
        Chain::new(
            (0..pts.len())
                .map(|i| Shape::line(pts[i], pts[(i + 1) % pts.len()]))
                .collect(),
        )
    }

    fn pentagram(radius: f64) -> Chain {
        let pts: Vec<Point2> = (0..5)
            .map(|i| {
                let angle = PI / 2.0 + f64::from(i) * 4.0 * PI / 5.0;
                p(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        closed_lines(&pts)
    }

    #[test]
    fn malformed_spline_members_fail_cleanly() {
        use crate::geometry::Spline;
        let cps = vec![p(10.0, 0.0), p(12.0, 3.0), p(14.0, -3.0), p(16.0, 0.0)];
        let cases = [
            (Spline::new(cps, 3, vec![0.0, 0.0, 1.0]), "Invalid knot vector length: expected 8, got 3"),
            (
                Spline::new(vec![p(10.0, 0.0), p(12.0, 0.0)], 4, vec![0.0; 7]),
                "Invalid spline degree 4",
            ),
            (
                Spline::new(vec![p(10.0, 0.0)], 3, vec![0.0, 1.0]),
                "Spline must have at least 2 control points",
            ),
        ];
        for (spline, message) in cases {
            let chain = Chain::new(vec![Shape::line(p(0.0, 0.0), p(10.0, 0.0)), Shape::spline(spline)]);
            let r = offset_chain(&chain, 1.0, &ChainOffsetParameters::default());
            assert!(!r.success);
            assert!(r.outer_chain.is_none());
            assert_eq!(r.errors.len(), 1, "{:?}", r.errors);
            assert!(r.errors[0].starts_with(&format!("Shape 1 (spline): {message}")), "{:?}", r.errors);
            assert_eq!(r.metrics.input_shapes, 2);

            let both = offset_chain_both_sides(&chain, 1.0, &ChainOffsetParameters::default());
            assert!(!both.success);
            assert!(both.errors.iter().all(|e| e.contains("Shape 1 (spline)")));
        }
    }

    #[test]
    fn bow_tie_outset_wraps_both_lobes() {
        let chain = closed_lines(&[p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)]);
        assert_abs_diff_eq!(chain.signed_area(), 0.0, epsilon = 1e-9);
        let r = offset_chain(&chain, 1.0, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        let outer = r.outer_chain.as_ref().unwrap();
        assert_closed_and_connected(outer);
        let bbox = outer.bounding_box().unwrap();
        let miter = 1.0 + 2.0_f64.sqrt();
        assert_abs_diff_eq!(bbox.width(), 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.height(), 10.0 + 2.0 * miter, epsilon = 1e-9);
        // Both lobes (25 each) are inside.
        assert!(outer.signed_area().abs() > 50.0);
        assert!(r.metrics.self_intersections > 0);
    }

    #[test]
    fn bow_tie_inset_keeps_one_lobe() {
        let chain = closed_lines(&[p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)]);
        let r = offset_chain(&chain, -1.0, &ChainOffsetParameters::default());
        assert!(r.success, "{:?}", r.errors);
        let inner = r.inner_chain.as_ref().unwrap();
        assert_closed_and_connected(inner);
        let bbox = inner.bounding_box().unwrap();
        let sqrt2 = 2.0_f64.sqrt();
        assert_abs_diff_eq!(bbox.width(), 4.0 - sqrt2, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.height(), 8.0 - 2.0 * sqrt2, epsilon = 1e-9);
        assert!(r.warnings.iter().any(|w| w.starts_with("Offset split into 2 loops")), "{:?}", r.warnings);
    }

    #[test]
    fn pentagram_outset_follows_its_outline() {
        let chain = pentagram(10.0);
        for d in [0.2, 0.5, 0.7, 0.8, 1.5] {
            let r = offset_chain(&chain, d, &ChainOffsetParameters::default());
            assert!(r.success, "outset {d}: {:?}", r.errors);
            let outer = r.outer_chain.as_ref().unwrap();
            assert_closed_and_connected(outer);
            // The star outline alone encloses about 112.26.
            assert!(outer.signed_area().abs() > 112.3, "outset {d}");
            let bbox = outer.bounding_box().unwrap();
            let tip = 10.0 + d / (PI / 10.0).sin();
            assert_abs_diff_eq!(bbox.max.y, tip, epsilon = 1e-9);
        }
    }

    #[test]
    fn pentagram_region_area_counts_the_core_once() {
        let chain = pentagram(10.0);
        let mut members = members::flatten(&chain);
        members::orient(&mut members, 0.5);
        let source = SourceProfile::new(&members);
        // Net signed area counts the inner pentagon twice.
        assert!(source.signed_area() > 146.0);
        let region = enclosed_region_area(&source).unwrap();
        let inner_radius = 10.0 * (2.0 * PI / 5.0).cos() / (PI / 5.0).cos();
        let star = 5.0 * 10.0 * inner_radius * (PI / 5.0).sin();
        assert_abs_diff_eq!(region, star, epsilon = 1e-6);

        let square = rectangle(4.0, 4.0, true);
        let mut members = members::flatten(&square);
        members::orient(&mut members, 0.5);
        assert!(enclosed_region_area(&SourceProfile::new(&members)).is_none());
    }
}
