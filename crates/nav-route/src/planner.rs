//! The route-planning capability and its configured variants.

use std::sync::Arc;

use nav_core::{Coord, PlannerKind, TransportSet};
use nav_spatial::RoadNetwork;

use crate::{GridPlanner, NetworkPlanner, Route, RouteResult};

/// Anything that can turn an origin/destination pair into a route.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: one planner is shared by the
/// route cache across every agent (and every Rayon worker when prefetching).
pub trait RoutePlanner: Send + Sync {
    /// Plan a route for an agent limited to `modes`.
    ///
    /// `origin == destination` yields an empty route, not an error.
    fn plan(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<Route>;

    /// Geometric length of the route `plan` would return, without building
    /// its waypoints.
    fn distance(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<f64>;
}

// ── FixedDelayPlanner ─────────────────────────────────────────────────────────

/// Ignores geometry entirely: every journey takes `ticks` advances.
#[derive(Clone, Copy, Debug)]
pub struct FixedDelayPlanner {
    pub ticks: u32,
}

impl RoutePlanner for FixedDelayPlanner {
    fn plan(&self, origin: Coord, destination: Coord, _modes: TransportSet) -> RouteResult<Route> {
        if origin == destination {
            return Ok(Route::new());
        }
        Ok(Route::fixed_delay(destination, self.ticks))
    }

    fn distance(&self, origin: Coord, destination: Coord, _modes: TransportSet) -> RouteResult<f64> {
        Ok(if origin == destination { 0.0 } else { 1.0 })
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

/// The planner variant chosen by configuration.
#[derive(Clone)]
pub enum Planner {
    Network(NetworkPlanner),
    Grid(GridPlanner),
    FixedDelay(FixedDelayPlanner),
}

impl Planner {
    pub fn from_config(kind: PlannerKind, network: Arc<RoadNetwork>) -> Self {
        match kind {
            PlannerKind::Network => Planner::Network(NetworkPlanner::new(network)),
            PlannerKind::Grid => Planner::Grid(GridPlanner::new(network)),
            PlannerKind::FixedDelay { ticks } => Planner::FixedDelay(FixedDelayPlanner { ticks }),
        }
    }
}

impl RoutePlanner for Planner {
    fn plan(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<Route> {
        match self {
            Planner::Network(p) => p.plan(origin, destination, modes),
            Planner::Grid(p) => p.plan(origin, destination, modes),
            Planner::FixedDelay(p) => p.plan(origin, destination, modes),
        }
    }

    fn distance(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<f64> {
        match self {
            Planner::Network(p) => p.distance(origin, destination, modes),
            Planner::Grid(p) => p.distance(origin, destination, modes),
            Planner::FixedDelay(p) => p.distance(origin, destination, modes),
        }
    }
}
