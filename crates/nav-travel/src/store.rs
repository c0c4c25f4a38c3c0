//! The `TravelStore` — per-agent travel state plus sparse remaining routes.

use std::collections::HashMap;

use nav_core::{AgentId, Coord};
use nav_route::Route;

use crate::{TravelError, TravelResult, TravelState};

/// Holds travel state for every agent plus the routes of agents currently
/// travelling.
///
/// `states` is indexed by `AgentId` and always `agent_count` long.  `routes`
/// is sparse: only travelling agents have an entry, removed on arrival or
/// release.
pub struct TravelStore {
    pub states: Vec<TravelState>,
    pub routes: HashMap<AgentId, Route>,
}

impl TravelStore {
    /// Every agent unplaced.
    pub fn new(agent_count: usize) -> Self {
        Self {
            states: vec![TravelState::unplaced(); agent_count],
            routes: HashMap::new(),
        }
    }

    pub fn agent_count(&self) -> usize {
        self.states.len()
    }

    /// Put `agent` at `position`, dropping any journey in progress.
    pub fn place(&mut self, agent: AgentId, position: Coord) -> TravelResult<()> {
        let state = self
            .states
            .get_mut(agent.index())
            .ok_or(TravelError::NotPlaced(agent))?;
        *state = TravelState::at(position);
        self.routes.remove(&agent);
        Ok(())
    }

    /// State of a placed agent.
    pub fn state(&self, agent: AgentId) -> TravelResult<&TravelState> {
        self.states
            .get(agent.index())
            .filter(|s| s.placed)
            .ok_or(TravelError::NotPlaced(agent))
    }

    pub(crate) fn state_mut(&mut self, agent: AgentId) -> TravelResult<&mut TravelState> {
        self.states
            .get_mut(agent.index())
            .filter(|s| s.placed)
            .ok_or(TravelError::NotPlaced(agent))
    }

    #[inline]
    pub fn position(&self, agent: AgentId) -> Option<Coord> {
        self.state(agent).ok().map(|s| s.position)
    }

    #[inline]
    pub fn travelling(&self, agent: AgentId) -> bool {
        self.routes.contains_key(&agent)
    }

    /// Remaining route of a travelling agent.
    pub fn route(&self, agent: AgentId) -> Option<&Route> {
        self.routes.get(&agent)
    }

    /// Agents with a route, in ascending id order.
    pub fn travelling_agents(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.routes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// End `agent`'s journey where it stands.
    pub(crate) fn finish(&mut self, agent: AgentId) {
        self.routes.remove(&agent);
        if let Some(state) = self.states.get_mut(agent.index()) {
            state.stop();
        }
    }
}
