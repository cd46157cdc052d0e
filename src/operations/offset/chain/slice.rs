use std::cmp::Ordering;
use std::ops::Range;

use super::piece::Piece;
use super::self_intersect::Intersection;

/// Part of an offset chain between two cut points.
#[derive(Debug, Clone)]
pub(super) struct Slice {
    pub pieces: Vec<Piece>,
    /// Crossing the slice starts at; `None` for the head of an open chain.
    pub start_hit: Option<usize>,
    /// Crossing the slice ends at; `None` for the tail of an open chain.
    pub end_hit: Option<usize>,
}

/// Position on the chain: piece index and parameter.
type Cut = (usize, f64);

/// Cut points on pieces as `(piece, t, hit)`, ordered along the chain.
fn cut_points(hits: &[Intersection], keep: impl Fn(usize) -> bool) -> Vec<(usize, f64, usize)> {
    let mut splits: Vec<(usize, f64, usize)> = Vec::with_capacity(hits.len() * 2);
    for (idx, hit) in hits.iter().enumerate() {
        for (piece, t) in [(hit.piece_i, hit.t_i), (hit.piece_j, hit.t_j)] {
            if keep(piece) {
                splits.push((piece, t, idx));
            }
        }
    }
    splits.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
    });
    splits
}

/// Cuts the chain at every crossing.
///
/// Closed chains give one slice per cut point, wrapping around the end.
/// Open chains also give a head and a tail slice running to the chain ends.
#[must_use]
pub(super) fn build(pieces: &[Piece], hits: &[Intersection], closed: bool) -> Vec<Slice> {
    if hits.is_empty() || pieces.is_empty() {
        return Vec::new();
    }
    let all = 0..pieces.len();
    if closed {
        return build_rings(pieces, &[all], hits);
    }
    let splits = cut_points(hits, |_| true);
    let mut slices = Vec::with_capacity(splits.len() + 1);
    let last = pieces.len() - 1;
    let (s, t0, h0) = splits[0];
    push_slice(&mut slices, pieces, &all, hits, (0, 0.0), (s, t0), false, None, Some(h0));
    for w in splits.windows(2) {
        let ((s, t0, h0), (e, t1, h1)) = (w[0], w[1]);
        push_slice(&mut slices, pieces, &all, hits, (s, t0), (e, t1), false, Some(h0), Some(h1));
    }
    let (e, t1, h1) = splits[splits.len() - 1];
    push_slice(&mut slices, pieces, &all, hits, (e, t1), (last, 1.0), false, Some(h1), None);
    slices
}

/// Cuts closed rings of pieces at every crossing, one slice per cut point
/// and ring. A ring without cuts is returned whole.
#[must_use]
pub(super) fn build_rings(pieces: &[Piece], rings: &[Range<usize>], hits: &[Intersection]) -> Vec<Slice> {
    let mut slices = Vec::new();
    for ring in rings.iter().filter(|r| !r.is_empty()) {
        let splits = cut_points(hits, |piece| ring.contains(&piece));
        if splits.is_empty() {
            slices.push(Slice {
                pieces: pieces[ring.clone()].to_vec(),
                start_hit: None,
                end_hit: None,
            });
            continue;
        }
        for k in 0..splits.len() {
            let (s, t0, h0) = splits[k];
            let (e, t1, h1) = splits[(k + 1) % splits.len()];
            let wraps = k + 1 == splits.len();
            push_slice(&mut slices, pieces, ring, hits, (s, t0), (e, t1), wraps, Some(h0), Some(h1));
        }
    }
    slices
}

#[allow(clippy::too_many_arguments)]
fn push_slice(
    slices: &mut Vec<Slice>,
    pieces: &[Piece],
    ring: &Range<usize>,
    hits: &[Intersection],
    from: Cut,
    to: Cut,
    wraps: bool,
    start_hit: Option<usize>,
    end_hit: Option<usize>,
) {
    let mut out = walk(pieces, ring, from, to, wraps);
    if let (Some(h), Some(first)) = (start_hit, out.first_mut()) {
        first.set_start(hits[h].point);
    }
    if let (Some(h), Some(last)) = (end_hit, out.last_mut()) {
        last.set_end(hits[h].point);
    }
    out.retain(|p| p.length() > 1e-9);
    if !out.is_empty() {
        slices.push(Slice {
            pieces: out,
            start_hit,
            end_hit,
        });
    }
}

/// Pieces from `from` to `to`, walking forward within `ring` (and around
/// its end when `wraps` is set).
fn walk(pieces: &[Piece], ring: &Range<usize>, from: Cut, to: Cut, wraps: bool) -> Vec<Piece> {
    let ((s, t0), (e, t1)) = (from, to);
    if s == e && !(wraps && t1 <= t0) {
        return vec![pieces[s].sub(t0, t1)];
    }
    let next = |k: usize| if k + 1 == ring.end { ring.start } else { k + 1 };
    let mut out = vec![pieces[s].sub(t0, 1.0)];
    let mut k = next(s);
    while k != e {
        out.push(pieces[k].clone());
        k = next(k);
    }
    out.push(pieces[e].sub(0.0, t1));
    out
}
