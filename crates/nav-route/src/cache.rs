//! Shared route and distance memoisation.
//!
//! # Locking
//!
//! Both maps sit behind an `RwLock`.  Lookups take the read lock only.  On a
//! miss the planner runs with *no* lock held; the result is then inserted
//! under the write lock with `entry().or_insert`, so when two agents race on
//! the same key the first insert wins and both get the stored value.  Stored
//! routes are `Arc`s and never mutated; callers always receive their own
//! clone.
//!
//! Planning failures are not cached.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use nav_core::{Coord, TransportSet};

use crate::{Route, RoutePlanner, RouteResult};

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

/// Key for the route map.  Routes are directional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub origin:      Coord,
    pub destination: Coord,
    pub modes:       TransportSet,
}

impl RouteKey {
    pub fn new(origin: Coord, destination: Coord, modes: TransportSet) -> Self {
        Self { origin, destination, modes }
    }
}

/// Key for the distance map.  Distances are symmetric, so the two ends are
/// stored in a canonical order and `(a, b)` shares an entry with `(b, a)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DistanceKey {
    a:     Coord,
    b:     Coord,
    modes: TransportSet,
}

impl DistanceKey {
    pub fn new(p: Coord, q: Coord, modes: TransportSet) -> Self {
        if p.total_cmp(&q).is_le() {
            Self { a: p, b: q, modes }
        } else {
            Self { a: q, b: p, modes }
        }
    }
}

/// Hit and miss counts since construction (or the last [`RouteCache::clear`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits:   u64,
    pub misses: u64,
}

/// Memoises a [`RoutePlanner`] across every agent in the simulation.
pub struct RouteCache<P> {
    planner:   P,
    routes:    RwLock<Map<RouteKey, Arc<Route>>>,
    distances: RwLock<Map<DistanceKey, f64>>,
    hits:      AtomicU64,
    misses:    AtomicU64,
}

impl<P: RoutePlanner> RouteCache<P> {
    pub fn new(planner: P) -> Self {
        Self {
            planner,
            routes: RwLock::new(Map::default()),
            distances: RwLock::new(Map::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    /// A route from `origin` to `destination`, planned at most once per key.
    pub fn get_route(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<Route> {
        let key = RouteKey::new(origin, destination, modes);
        if let Some(hit) = self.routes.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Route::clone(hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let planned = Arc::new(self.planner.plan(origin, destination, modes)?);
        debug!(%origin, %destination, %modes, waypoints = planned.len(), "route cached");

        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        let stored = routes.entry(key).or_insert(planned);
        Ok(Route::clone(stored))
    }

    /// Route distance between two points.  Never materialises a route.
    pub fn get_distance(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<f64> {
        let key = DistanceKey::new(origin, destination, modes);
        if let Some(&d) = self.distances.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(d);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let d = self.planner.distance(key.a, key.b, modes)?;
        let mut distances = self.distances.write().unwrap_or_else(PoisonError::into_inner);
        Ok(*distances.entry(key).or_insert(d))
    }

    /// Plan every key on the Rayon pool.  Failures are skipped; they will
    /// surface again when the key is requested for real.
    #[cfg(feature = "parallel")]
    pub fn prefetch(&self, keys: &[RouteKey]) -> usize {
        use rayon::prelude::*;

        let planned = keys
            .par_iter()
            .filter(|k| self.get_route(k.origin, k.destination, k.modes).is_ok())
            .count();
        debug!(requested = keys.len(), planned, "route cache prefetched");
        planned
    }

    /// Drop every cached route and distance.  Only called on a full
    /// simulation reset.
    pub fn clear(&self) {
        self.routes.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.distances.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn route_count(&self) -> usize {
        self.routes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn distance_count(&self) -> usize {
        self.distances.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits:   self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
