//! Transport modes and per-agent mode sets.
//!
//! Speeds are expressed as multipliers of walking pace.  A network edge lists
//! the modes allowed on it; an agent carries a [`TransportSet`] of the modes
//! it may use.  The route planner intersects the two and picks the fastest.

use std::fmt;

/// Extra multiplier a car gets on roads flagged as major.
pub const MAJOR_ROAD_ADVANTAGE: f64 = 3.0;

/// A means of travel.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TransportMode {
    Walk,
    Car,
    Bus,
    Train,
}

impl TransportMode {
    /// Every mode, fastest first.
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Train,
        TransportMode::Car,
        TransportMode::Bus,
        TransportMode::Walk,
    ];

    /// Speed relative to walking.
    #[inline]
    pub fn multiplier(self) -> f64 {
        match self {
            TransportMode::Walk  => 1.0,
            TransportMode::Bus   => 2.0,
            TransportMode::Car   => 5.0,
            TransportMode::Train => 10.0,
        }
    }

    /// Bus and train follow a fixed line: an agent riding one cannot leave
    /// it between stations.
    #[inline]
    pub fn is_transit(self) -> bool {
        matches!(self, TransportMode::Bus | TransportMode::Train)
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Walk  => "walk",
            TransportMode::Car   => "car",
            TransportMode::Bus   => "bus",
            TransportMode::Train => "train",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TransportSet ──────────────────────────────────────────────────────────────

/// An unordered set of [`TransportMode`]s stored as a bitmask.
///
/// Two sets built from the same modes in any order compare and hash equal,
/// which is what the route caches rely on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportSet(u8);

impl TransportSet {
    pub const EMPTY: TransportSet = TransportSet(0);

    pub fn walk_only() -> Self {
        Self::EMPTY.with(TransportMode::Walk)
    }

    pub fn all() -> Self {
        TransportMode::ALL.into_iter().collect()
    }

    #[must_use]
    pub fn with(mut self, mode: TransportMode) -> Self {
        self.insert(mode);
        self
    }

    pub fn insert(&mut self, mode: TransportMode) {
        self.0 |= mode.bit();
    }

    #[inline]
    pub fn contains(self, mode: TransportMode) -> bool {
        self.0 & mode.bit() != 0
    }

    #[inline]
    pub fn intersection(self, other: TransportSet) -> TransportSet {
        TransportSet(self.0 & other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The subset an agent can use between stations (no bus, no train).
    #[inline]
    pub fn non_transit(self) -> TransportSet {
        self.iter().filter(|m| !m.is_transit()).collect()
    }

    /// Modes in the set, fastest first.
    pub fn iter(self) -> impl Iterator<Item = TransportMode> {
        TransportMode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<TransportMode> for TransportSet {
    fn from_iter<I: IntoIterator<Item = TransportMode>>(iter: I) -> Self {
        let mut set = TransportSet::EMPTY;
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl fmt::Debug for TransportSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for TransportSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, mode) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(mode.as_str())?;
        }
        f.write_str("}")
    }
}
