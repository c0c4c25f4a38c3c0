//! Nearest-road locator.
//!
//! # Search
//!
//! The locator looks for the closest point on any road segment inside a
//! square window of half-width `r` around the query.  A hit is only trusted
//! when its distance is `<= r`: a segment further away than that might be
//! beaten by one lying just outside the window.  Otherwise `r` doubles and
//! the search repeats, up to `max_attempts` windows.
//!
//! Ties (two segments at exactly the same distance, e.g. a point sitting on
//! a junction) resolve to the lowest `RoadId`, then the lowest segment index.
//!
//! # Pre-computed cache
//!
//! Agents' origins and destinations are mostly building centroids, a
//! bounded set known at startup.  [`NearestRoadCache`] holds their snaps so
//! the hot path is a hash lookup; it is usually persisted with
//! [`load_or_build`][crate::load_or_build] and installed once via
//! [`RoadNetwork::install_nearest_cache`].

use std::collections::HashMap;

use rstar::AABB;
use serde::{Deserialize, Serialize};
use tracing::debug;

use nav_core::{Coord, RoadId};

use crate::store::{CacheStatus, CacheStore, Fingerprint, load_or_build};
use crate::{RoadNetwork, SpatialError, SpatialResult};

/// A coordinate projected onto the road network.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snap {
    /// Closest on-road point.
    pub point:    Coord,
    pub road:     RoadId,
    /// The point lies on `vertices[segment]..vertices[segment + 1]`.
    pub segment:  usize,
    /// Distance from the query coordinate to `point`.
    pub distance: f64,
}

impl Snap {
    fn beats(&self, other: &Snap) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance
                && (self.road, self.segment) < (other.road, other.segment))
    }
}

/// Search window parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocatorParams {
    pub search_radius: f64,
    pub max_attempts:  u32,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self { search_radius: 20.0, max_attempts: 10 }
    }
}

impl From<&nav_core::NavConfig> for LocatorParams {
    fn from(cfg: &nav_core::NavConfig) -> Self {
        Self {
            search_radius: cfg.search_radius,
            max_attempts:  cfg.max_search_attempts,
        }
    }
}

impl RoadNetwork {
    /// Nearest on-road point to `coord`, using the installed cache when it
    /// holds `coord`.
    pub fn nearest_road(&self, coord: Coord) -> SpatialResult<Snap> {
        if let Some(snap) = self.nearest_cache.get().and_then(|c| c.get(coord)) {
            return Ok(snap);
        }
        self.search_nearest_road(coord)
    }

    /// Nearest on-road point to `coord` by expanding-window search, ignoring
    /// any installed cache.
    pub fn search_nearest_road(&self, coord: Coord) -> SpatialResult<Snap> {
        let LocatorParams { search_radius, max_attempts } = self.locator;
        let mut radius = search_radius;

        for attempt in 1..=max_attempts {
            let window = AABB::from_corners(
                [coord.x - radius, coord.y - radius],
                [coord.x + radius, coord.y + radius],
            );
            let mut best: Option<Snap> = None;
            for seg in self.segment_idx.locate_in_envelope_intersecting(&window) {
                let (point, distance) = coord.project_onto_segment(seg.a, seg.b);
                let candidate = Snap { point, road: seg.road, segment: seg.segment, distance };
                if best.as_ref().is_none_or(|b| candidate.beats(b)) {
                    best = Some(candidate);
                }
            }
            if let Some(snap) = best.filter(|s| s.distance <= radius) {
                if attempt > 1 {
                    debug!(%coord, attempt, radius, "nearest road found after widening");
                }
                return Ok(snap);
            }
            radius *= 2.0;
        }

        Err(SpatialError::NoRoadFound {
            coord,
            attempts: max_attempts,
            radius: radius / 2.0,
        })
    }

    /// Install a pre-computed nearest-road cache.  Only the first call has
    /// any effect; returns `false` if a cache was already installed.
    pub fn install_nearest_cache(&self, cache: NearestRoadCache) -> bool {
        self.nearest_cache.set(cache).is_ok()
    }

    pub fn nearest_cache(&self) -> Option<&NearestRoadCache> {
        self.nearest_cache.get()
    }

    /// Load the nearest-road cache for `seeds` from `store` (rebuilding it
    /// when missing or stale) and install it.
    pub fn prepare_nearest_cache<S, I>(
        &self,
        store: &S,
        fingerprint: &Fingerprint,
        seeds: I,
    ) -> SpatialResult<CacheStatus>
    where
        S: CacheStore<NearestRoadCache> + ?Sized,
        I: IntoIterator<Item = Coord>,
    {
        let (cache, status) =
            load_or_build(store, fingerprint, || NearestRoadCache::build(self, seeds))?;
        let entries = cache.len();
        if !self.install_nearest_cache(cache) {
            debug!("nearest-road cache already installed; keeping the first one");
        }
        debug!(entries, ?status, "nearest-road cache ready");
        Ok(status)
    }
}

// ── NearestRoadCache ──────────────────────────────────────────────────────────

/// Coordinate → [`Snap`] for a fixed set of seed coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(Coord, Snap)>", into = "Vec<(Coord, Snap)>")]
pub struct NearestRoadCache {
    entries: HashMap<Coord, Snap>,
}

impl NearestRoadCache {
    /// Snap every seed.  Fails on the first seed with no road in reach.
    pub fn build<I>(network: &RoadNetwork, seeds: I) -> SpatialResult<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut entries = HashMap::new();
        for seed in seeds {
            if entries.contains_key(&seed) {
                continue;
            }
            let snap = network.search_nearest_road(seed)?;
            entries.insert(seed, snap);
        }
        Ok(Self { entries })
    }

    #[inline]
    pub fn get(&self, coord: Coord) -> Option<Snap> {
        self.entries.get(&coord).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<(Coord, Snap)>> for NearestRoadCache {
    fn from(v: Vec<(Coord, Snap)>) -> Self {
        Self { entries: v.into_iter().collect() }
    }
}

impl From<NearestRoadCache> for Vec<(Coord, Snap)> {
    fn from(cache: NearestRoadCache) -> Self {
        let mut v: Vec<_> = cache.entries.into_iter().collect();
        v.sort_by(|a, b| a.0.total_cmp(&b.0));
        v
    }
}
