//! The travel executor: starts journeys and moves agents along them.

use tracing::{debug, warn};

use nav_core::{AgentId, Coord, TransportSet};
use nav_route::{Route, RouteCache, RoutePlanner};

use crate::awareness::{AwarenessSink, FeatureIndex};
use crate::{TravelError, TravelResult, TravelState, TravelStore};

/// What one call to [`TravelEngine::advance`] achieved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Budget used up with waypoints still to go.
    Moving,
    /// Final waypoint reached; the route is gone.
    Arrived,
    /// Got off at a transit stop after a release request; the route is gone.
    Released,
}

/// Per-tick tallies from [`TravelEngine::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub moving:   usize,
    pub arrived:  usize,
    pub released: usize,
    pub failed:   usize,
}

/// Wraps a [`RouteCache`] and a [`TravelStore`].
///
/// # Type parameter
///
/// `P` is the planner behind the cache, usually
/// [`nav_route::Planner`] as picked by configuration.
pub struct TravelEngine<P: RoutePlanner> {
    pub routes:   RouteCache<P>,
    pub store:    TravelStore,
    pub features: FeatureIndex,
}

impl<P: RoutePlanner> TravelEngine<P> {
    /// All agents unplaced, no road features.
    pub fn new(planner: P, agent_count: usize) -> Self {
        Self {
            routes:   RouteCache::new(planner),
            store:    TravelStore::new(agent_count),
            features: FeatureIndex::new(),
        }
    }

    #[must_use]
    pub fn with_features(mut self, features: FeatureIndex) -> Self {
        self.features = features;
        self
    }

    /// Put `agent` at `position` without travelling (initial placement).
    pub fn place(&mut self, agent: AgentId, position: Coord) -> TravelResult<()> {
        self.store.place(agent, position)
    }

    /// Start `agent` travelling to `destination` using `modes`.
    ///
    /// Returns `false` when the agent is already there and nothing was
    /// started.  A journey in progress is replaced, unless the agent is on
    /// a bus or train.
    pub fn begin_travel(&mut self, agent: AgentId, destination: Coord, modes: TransportSet) -> TravelResult<bool> {
        let from = {
            let state = self.store.state(agent)?;
            if state.locked {
                return Err(TravelError::AlreadyInTransit(agent));
            }
            state.position
        };
        let route = self.routes.get_route(from, destination, modes)?;
        debug!(%agent, %from, %destination, waypoints = route.len(), "journey started");
        self.assign_route(agent, route)
    }

    /// Make `agent` follow `route` (e.g. a bulls-eye search route).
    pub fn assign_route(&mut self, agent: AgentId, route: Route) -> TravelResult<bool> {
        let state = self.store.state_mut(agent)?;
        if state.locked {
            return Err(TravelError::AlreadyInTransit(agent));
        }
        state.stop();
        if route.is_empty() {
            self.store.routes.remove(&agent);
            return Ok(false);
        }
        self.store.routes.insert(agent, route);
        Ok(true)
    }

    /// Ask `agent` to leave its journey at the next transit stop.
    pub fn request_release(&mut self, agent: AgentId) -> TravelResult<()> {
        self.store.state_mut(agent)?.awaiting_release = true;
        Ok(())
    }

    /// Move `agent` along its route by `budget` walking-pace distance.
    ///
    /// # Errors
    ///
    /// `EmptyRoute` if the agent has nothing to travel; `MissingRoad` if a
    /// street leg was planned without its road.  Both leave the agent where
    /// it is.
    pub fn advance<S>(&mut self, agent: AgentId, budget: f64, sink: &mut S) -> TravelResult<AdvanceOutcome>
    where
        S: AwarenessSink + ?Sized,
    {
        let TravelStore { states, routes } = &mut self.store;
        let state = states
            .get_mut(agent.index())
            .filter(|s| s.placed)
            .ok_or(TravelError::NotPlaced(agent))?;
        let route = routes
            .get_mut(&agent)
            .filter(|r| !r.is_empty())
            .ok_or(TravelError::EmptyRoute { agent })?;
        if let Some(index) = route.first_unmapped_street() {
            return Err(TravelError::MissingRoad {
                agent,
                index,
                route: format!("{:?}", route.coords()),
            });
        }

        let outcome = if route.delay().is_some() {
            wait_out(state, route)
        } else {
            walk(agent, state, route, budget, &self.features, sink)
        };

        if outcome != AdvanceOutcome::Moving {
            self.store.finish(agent);
            debug!(%agent, ?outcome, "journey ended");
        }
        Ok(outcome)
    }

    /// Advance every travelling agent once, in ascending id order.
    ///
    /// A failure for one agent is logged and counted; that agent does not
    /// move this tick and the others carry on.
    pub fn tick<S>(&mut self, budget: f64, sink: &mut S) -> TickSummary
    where
        S: AwarenessSink + ?Sized,
    {
        let mut summary = TickSummary::default();
        for agent in self.store.travelling_agents() {
            match self.advance(agent, budget, sink) {
                Ok(AdvanceOutcome::Moving) => summary.moving += 1,
                Ok(AdvanceOutcome::Arrived) => summary.arrived += 1,
                Ok(AdvanceOutcome::Released) => summary.released += 1,
                Err(e) => {
                    warn!(%agent, error = %e, "travel step failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

/// Fixed-delay journeys: count a tick, then appear at the destination.
fn wait_out(state: &mut TravelState, route: &mut Route) -> AdvanceOutcome {
    if !route.tick_delay() {
        return AdvanceOutcome::Moving;
    }
    if let Some(dest) = route.destination() {
        state.position = dest;
    }
    AdvanceOutcome::Arrived
}

fn walk<S>(
    agent:    AgentId,
    state:    &mut TravelState,
    route:    &mut Route,
    budget:   f64,
    features: &FeatureIndex,
    sink:     &mut S,
) -> AdvanceOutcome
where
    S: AwarenessSink + ?Sized,
{
    let mut remaining = budget;
    while let Some(next) = route.front().copied() {
        let scaled = state.position.distance(next.coord) / state.leg.multiplier;
        if scaled > remaining {
            let step = remaining * state.leg.multiplier;
            state.position = state.position.step_toward(next.coord, step);
            return AdvanceOutcome::Moving;
        }

        remaining -= scaled;
        state.position = next.coord;
        route.pop_front();

        if !state.locked {
            if let Some(road) = state.leg.road {
                if state.last_road != Some(road) {
                    sink.features_passed(agent, road, features.get(road));
                    state.last_road = Some(road);
                }
            }
        }
        state.board(next.leg);

        if route.is_empty() {
            return AdvanceOutcome::Arrived;
        }
        if state.locked && state.awaiting_release {
            return AdvanceOutcome::Released;
        }
    }
    AdvanceOutcome::Arrived
}
