//! Telling the behaviour layer what an agent has walked past.
//!
//! Each road knows the buildings closest to it and the communities those
//! buildings belong to.  When a walking or driving agent moves onto a new
//! road, the executor hands that road's features to an [`AwarenessSink`]
//! once.  Dwelling on a long road (many waypoints) does not repeat the
//! notification, and riding transit reports nothing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use nav_core::{AgentId, Coord, FeatureId, RoadId};
use nav_spatial::{CacheStatus, CacheStore, Fingerprint, RoadNetwork, SpatialResult, load_or_build};

/// Buildings and communities associated with one road.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadFeatures {
    /// In input order.
    pub buildings:   Vec<FeatureId>,
    /// Sorted, no duplicates.
    pub communities: Vec<FeatureId>,
}

impl RoadFeatures {
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty() && self.communities.is_empty()
    }
}

static NO_FEATURES: RoadFeatures = RoadFeatures { buildings: Vec::new(), communities: Vec::new() };

/// Receives "features passed" events from the travel executor.
///
/// The default implementation ignores everything, so implementors only
/// override what they record.
pub trait AwarenessSink {
    fn features_passed(&mut self, _agent: AgentId, _road: RoadId, _features: &RoadFeatures) {}
}

/// An [`AwarenessSink`] that does nothing.
pub struct NoopSink;

impl AwarenessSink for NoopSink {}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct AwarenessLog {
    pub events: Vec<(AgentId, RoadId)>,
    /// Buildings seen, summed over all events.
    pub buildings_seen: usize,
}

impl AwarenessSink for AwarenessLog {
    fn features_passed(&mut self, agent: AgentId, road: RoadId, features: &RoadFeatures) {
        self.events.push((agent, road));
        self.buildings_seen += features.buildings.len();
    }
}

// ── FeatureIndex ──────────────────────────────────────────────────────────────

/// Road → features, derived from building positions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(RoadId, RoadFeatures)>", into = "Vec<(RoadId, RoadFeatures)>")]
pub struct FeatureIndex {
    by_road: HashMap<RoadId, RoadFeatures>,
}

impl FeatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign each `(building, position, community)` to the road nearest
    /// its position.
    pub fn from_points(
        network: &RoadNetwork,
        points:  &[(FeatureId, Coord, Option<FeatureId>)],
    ) -> SpatialResult<Self> {
        let mut by_road: HashMap<RoadId, RoadFeatures> = HashMap::new();
        for &(building, pos, community) in points {
            let road = network.nearest_road(pos)?.road;
            let entry = by_road.entry(road).or_default();
            entry.buildings.push(building);
            if let Some(c) = community {
                if let Err(at) = entry.communities.binary_search(&c) {
                    entry.communities.insert(at, c);
                }
            }
        }
        debug!(buildings = points.len(), roads = by_road.len(), "feature index built");
        Ok(Self { by_road })
    }

    /// As [`from_points`](Self::from_points), reusing a persisted index when
    /// `fingerprint` still matches.
    pub fn load_or_build<S>(
        network:     &RoadNetwork,
        store:       &S,
        fingerprint: &Fingerprint,
        points:      &[(FeatureId, Coord, Option<FeatureId>)],
    ) -> SpatialResult<(Self, CacheStatus)>
    where
        S: CacheStore<FeatureIndex> + ?Sized,
    {
        load_or_build(store, fingerprint, || Self::from_points(network, points))
    }

    /// Features of `road`; empty for a road with none.
    pub fn get(&self, road: RoadId) -> &RoadFeatures {
        self.by_road.get(&road).unwrap_or(&NO_FEATURES)
    }

    /// Number of roads with at least one feature.
    pub fn len(&self) -> usize {
        self.by_road.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_road.is_empty()
    }
}

impl From<Vec<(RoadId, RoadFeatures)>> for FeatureIndex {
    fn from(v: Vec<(RoadId, RoadFeatures)>) -> Self {
        Self { by_road: v.into_iter().collect() }
    }
}

impl From<FeatureIndex> for Vec<(RoadId, RoadFeatures)> {
    fn from(index: FeatureIndex) -> Self {
        let mut v: Vec<_> = index.by_road.into_iter().collect();
        v.sort_unstable_by_key(|(road, _)| *road);
        v
    }
}
