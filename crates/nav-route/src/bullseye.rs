//! Bulls-eye search routes.
//!
//! Instead of heading for a destination, a searching agent circles a target.
//! At every junction the next road is picked by
//!
//!   score = sin(angle) / (visits + 1)
//!
//! where `angle` is between the bearing to the target and the bearing of the
//! road's first segment.  `sin` peaks for a right-angle turn (orbit) and
//! vanishes when heading straight at or away from the target; dividing by
//! visits steers the walk onto fresh roads.  The target's own road starts
//! with one visit.  The road just arrived on is excluded unless it is a
//! dead end.
//!
//! The walk stops on accumulated length, not on step count, so the same
//! budget gives the same route whatever the tick granularity.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use nav_core::geo::angle_between;
use nav_core::{AgentRng, Coord, EdgeId, NavConfig, TransportMode};
use nav_spatial::RoadNetwork;

use crate::route::{Leg, Route, RouteBuilder};
use crate::RouteResult;

pub struct BullsEyeSearch {
    network:   Arc<RoadNetwork>,
    overshoot: f64,
}

impl BullsEyeSearch {
    pub fn new(network: Arc<RoadNetwork>, overshoot: f64) -> Self {
        Self { network, overshoot }
    }

    pub fn from_config(network: Arc<RoadNetwork>, config: &NavConfig) -> Self {
        Self::new(network, config.bullseye_overshoot)
    }

    /// A walking route around `target` lasting roughly `budget_ticks` ticks
    /// at `speed` distance units per tick.
    pub fn search(&self, target: Coord, budget_ticks: u32, speed: f64, rng: &mut AgentRng) -> RouteResult<Route> {
        self.walk(target, budget_ticks, speed, rng).map(|(route, _)| route)
    }

    /// As [`search`](Self::search), also returning the edges taken in order.
    pub(crate) fn walk(
        &self,
        target:       Coord,
        budget_ticks: u32,
        speed:        f64,
        rng:          &mut AgentRng,
    ) -> RouteResult<(Route, Vec<EdgeId>)> {
        let net = &*self.network;
        let walk = TransportMode::Walk.multiplier();
        let budget = f64::from(budget_ticks) * speed * self.overshoot;

        let snap = net.nearest_road(target)?;
        let road = net.road(snap.road);
        let ends = [road.start, road.end];
        let mut at = rng.choose(&ends).copied().unwrap_or(road.start);

        let mut b = RouteBuilder::default();
        b.push_leg(&road.walk_to(&snap, at), Leg::street(walk, road.id));
        let mut length = road.distance_to(&snap, at);
        let mut prev = road.edge;
        let mut visits: HashMap<EdgeId, u32> = HashMap::from([(road.edge, 1)]);
        let mut taken = Vec::new();

        while length < budget {
            let here = net.junction(at).pos;
            let options: Vec<EdgeId> = net
                .incident_edges(at)
                .iter()
                .copied()
                .filter(|&e| net.edge(e).road().is_some())
                .collect();
            let fresh: Vec<EdgeId> = options.iter().copied().filter(|&e| e != prev).collect();
            let candidates = if fresh.is_empty() { options } else { fresh };

            let mut best: Option<(f64, EdgeId)> = None;
            for e in candidates {
                let Some(rid) = net.edge(e).road() else {
                    continue;
                };
                let verts = net.road(rid).vertices_from(at);
                let heading = verts.get(1).copied().unwrap_or(here);
                let f = angle_between(here, target, heading).map_or(1.0, f64::sin);
                let score = f / f64::from(visits.get(&e).copied().unwrap_or(0) + 1);
                if best.is_none_or(|(s, _)| score > s) {
                    best = Some((score, e));
                }
            }
            let Some((_, e)) = best else {
                break;
            };

            let edge = net.edge(e);
            if let Some(rid) = edge.road() {
                b.push_leg(&net.road(rid).vertices_from(at), Leg::street(walk, rid));
            }
            *visits.entry(e).or_insert(0) += 1;
            length += edge.length;
            taken.push(e);
            prev = e;
            at = edge.other(at);
        }

        debug!(%target, budget, length, edges = taken.len(), "bulls-eye route generated");
        Ok((b.finish(), taken))
    }
}
