use super::members::SourceProfile;
use super::piece::Origin;
use super::slice::Slice;

/// Parameters sampled on each offset piece of a slice.
const SAMPLE_PARAMS: [f64; 3] = [0.25, 0.5, 0.75];

/// Keeps slices that stay at least `|distance| - tolerance` from the source.
///
/// Only offset pieces are sampled. A slice made of connectors alone is kept
/// when its midpoint is at least half the offset distance away.
#[must_use]
pub(super) fn apply(
    slices: Vec<Slice>,
    source: &SourceProfile,
    abs_distance: f64,
    tolerance: f64,
) -> Vec<Slice> {
    let threshold = abs_distance - tolerance;
    slices
        .into_iter()
        .filter(|s| {
            let offset_samples: Vec<f64> = s
                .pieces
                .iter()
                .filter(|p| matches!(p.origin, Origin::Offset(_)))
                .flat_map(|p| SAMPLE_PARAMS.iter().map(move |&t| source.distance(&p.point_at(t))))
                .collect();
            if offset_samples.is_empty() {
                let mid = &s.pieces[s.pieces.len() / 2];
                return source.distance(&mid.point_at(0.5)) >= abs_distance * 0.5;
            }
            offset_samples.into_iter().fold(f64::INFINITY, f64::min) >= threshold
        })
        .collect()
}

/// Keeps slices outside the region enclosed by the source when `outside`
/// is set, otherwise the slices inside it.
///
/// Each slice is judged by the midpoint of its first offset piece, or of its
/// middle piece when it holds only connectors.
#[must_use]
pub(super) fn by_region(slices: Vec<Slice>, source: &SourceProfile, outside: bool) -> Vec<Slice> {
    slices
        .into_iter()
        .filter(|s| {
            let sample = s
                .pieces
                .iter()
                .find(|p| matches!(p.origin, Origin::Offset(_)))
                .or_else(|| s.pieces.get(s.pieces.len() / 2));
            sample.is_some_and(|p| source.contains(&p.point_at(0.5)) != outside)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::members::{flatten, orient};
    use super::super::piece::Piece;
    use super::*;
    use crate::geometry::{Chain, Shape};
    use crate::math::Point2;

    #[test]
    fn drops_slices_too_close_to_source() {
        let chain = Chain::new(vec![Shape::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0))]);
        let mut members = flatten(&chain);
        orient(&mut members, 0.5);
        let source = SourceProfile::new(&members);
        let near = Slice {
            pieces: vec![Piece::line(Point2::new(0.0, 0.5), Point2::new(10.0, 0.5), Origin::Offset(0))],
            start_hit: None,
            end_hit: None,
        };
        let far = Slice {
            pieces: vec![Piece::line(Point2::new(0.0, 1.0), Point2::new(10.0, 1.0), Origin::Offset(0))],
            start_hit: None,
            end_hit: None,
        };
        let kept = apply(vec![near, far], &source, 1.0, 0.1);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].pieces[0].start_point().y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn region_split_follows_winding() {
        let pts = [(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)];
        let chain = Chain::new(
            (0..4)
                .map(|i| {
                    let (a, b) = (pts[i], pts[(i + 1) % 4]);
                    Shape::line(Point2::new(a.0, a.1), Point2::new(b.0, b.1))
                })
                .collect(),
        );
        let mut members = flatten(&chain);
        orient(&mut members, 0.5);
        let source = SourceProfile::new(&members);
        let slice = |x: f64| Slice {
            pieces: vec![Piece::line(Point2::new(x, 4.0), Point2::new(x, 6.0), Origin::Offset(0))],
            start_hit: None,
            end_hit: None,
        };
        // Inside the clockwise lobe, inside the counter-clockwise lobe, outside.
        let slices = vec![slice(8.0), slice(2.0), slice(-1.0)];
        let outside = by_region(slices.clone(), &source, true);
        assert_eq!(outside.len(), 1);
        assert!((outside[0].pieces[0].start_point().x + 1.0).abs() < 1e-12);
        assert_eq!(by_region(slices, &source, false).len(), 2);
    }
}
