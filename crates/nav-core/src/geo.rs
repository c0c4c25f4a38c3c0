//! Planar coordinate type and the segment geometry used by the locator,
//! the planners and the travel executor.
//!
//! `Coord` uses `f64` projected coordinates (metres in a local CRS).  All
//! distances are Euclidean.  Equality and hashing compare bit patterns with
//! `-0.0` folded into `0.0`, so a `Coord` is usable as a map key: the graph
//! builder deduplicates junctions by exact coordinate and the caches key on
//! raw origin/destination pairs.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A projected 2-D coordinate.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    fn bits(self) -> (u64, u64) {
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance.
    #[inline]
    pub fn distance(self, other: Coord) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Bearing from `self` to `other` in radians, measured counter-clockwise
    /// from the +x axis, in `(-π, π]`.
    #[inline]
    pub fn bearing(self, other: Coord) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// The point `step` units from `self` along the straight line to
    /// `toward`.  Never overshoots `toward`.
    pub fn step_toward(self, toward: Coord, step: f64) -> Coord {
        let d = self.distance(toward);
        if d <= step || d == 0.0 {
            return toward;
        }
        let f = step / d;
        Coord::new(self.x + (toward.x - self.x) * f, self.y + (toward.y - self.y) * f)
    }

    /// Closest point to `self` on segment `a`–`b`, plus the distance to it.
    pub fn project_onto_segment(self, a: Coord, b: Coord) -> (Coord, f64) {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return (a, self.distance(a));
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len2).clamp(0.0, 1.0);
        let p = Coord::new(a.x + t * dx, a.y + t * dy);
        (p, self.distance(p))
    }

    /// Total order (x, then y) usable where `Ord` is needed, e.g. to
    /// normalise an unordered coordinate pair.
    pub fn total_cmp(&self, other: &Coord) -> Ordering {
        (self.x + 0.0)
            .total_cmp(&(other.x + 0.0))
            .then((self.y + 0.0).total_cmp(&(other.y + 0.0)))
    }
}

impl PartialEq for Coord {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Coord {}

impl Hash for Coord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Angle at `tail` between the rays `tail → tip1` and `tail → tip2`, in
/// `[0, π]`.  Returns `None` when either ray has zero length.
pub fn angle_between(tail: Coord, tip1: Coord, tip2: Coord) -> Option<f64> {
    if tail == tip1 || tail == tip2 {
        return None;
    }
    let mut a = (tail.bearing(tip1) - tail.bearing(tip2)).abs();
    if a > std::f64::consts::PI {
        a = 2.0 * std::f64::consts::PI - a;
    }
    Some(a)
}

/// Length of a polyline.
pub fn polyline_length(points: &[Coord]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
