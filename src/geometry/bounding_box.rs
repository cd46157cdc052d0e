use crate::math::Point2;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl BoundingBox {
    /// Creates a bounding box from two corners in any order.
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest box containing all `points`, or `None` when empty.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            min: *first,
            max: *first,
        };
        for p in &points[1..] {
            bbox.include(p);
        }
        Some(bbox)
    }

    /// Grows the box to contain `p`.
    pub fn include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Length of the diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }

    /// Whether the boxes overlap once both are grown by `margin`.
    #[must_use]
    pub fn overlaps(&self, other: &Self, margin: f64) -> bool {
        self.min.x - margin <= other.max.x + margin
            && other.min.x - margin <= self.max.x + margin
            && self.min.y - margin <= other.max.y + margin
            && other.min.y - margin <= self.max.y + margin
    }
}
