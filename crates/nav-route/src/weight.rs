//! Edge weighting.
//!
//! The cost of an edge depends only on the edge and the agent's mode set.
//! There is no ambient "current agent": planners pass the set explicitly,
//! so the same network can be searched concurrently for different agents.

use nav_core::{TransportSet, TransportMode};
use nav_spatial::NetworkEdge;

use crate::route::Leg;

/// Walking-pace-equivalent cost of `edge` for an agent that may use
/// `modes`: length divided by the fastest usable mode's multiplier.
///
/// `None` means the agent cannot use the edge at all; planners skip it
/// rather than treating it as merely expensive.
#[inline]
pub fn edge_weight(edge: &NetworkEdge, modes: TransportSet) -> Option<f64> {
    edge.best_mode(modes).map(|(_, m)| edge.length / m)
}

/// The leg an agent rides when traversing `edge` end to end.
pub(crate) fn traverse_leg(edge: &NetworkEdge, modes: TransportSet) -> Leg {
    match edge.best_mode(modes) {
        Some((mode, m)) if mode.is_transit() => Leg::transit(m, edge.road()),
        Some((_, m)) => street_or_transit(edge, m),
        None => street_or_transit(edge, TransportMode::Walk.multiplier()),
    }
}

/// The leg for part of a road, between a junction and a snapped point.
/// Buses and trains only stop at junctions, so transit modes are ignored;
/// if nothing else is allowed the agent walks.  Callers have already
/// checked that the road is usable.
pub(crate) fn partial_leg(edge: &NetworkEdge, modes: TransportSet) -> Leg {
    let m = edge
        .best_mode(modes.non_transit())
        .map_or(TransportMode::Walk.multiplier(), |(_, m)| m);
    street_or_transit(edge, m)
}

fn street_or_transit(edge: &NetworkEdge, multiplier: f64) -> Leg {
    match edge.road() {
        Some(road) => Leg::street(multiplier, road),
        None => Leg::transit(multiplier, None),
    }
}
