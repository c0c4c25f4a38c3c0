//! Per-agent travel state.

use nav_core::{Coord, RoadId};
use nav_route::{Leg, LegKind};

/// Where an agent is and how it is moving.
///
/// The remaining route is held separately by
/// [`TravelStore`][crate::TravelStore]; this is the part that survives
/// between journeys.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelState {
    /// `false` until the agent is first placed.
    pub placed: bool,

    pub position: Coord,

    /// The leg the agent is on now, i.e. the one that carries it to the
    /// next waypoint.  Walking pace between journeys.
    pub leg: Leg,

    /// `true` while riding a bus or train.  Awareness is suppressed and
    /// rerouting refused until the agent gets off.
    pub locked: bool,

    /// Set by the behaviour layer to leave the current journey at the next
    /// transit stop.
    pub awaiting_release: bool,

    /// The road most recently reported to the awareness sink.
    pub last_road: Option<RoadId>,
}

impl TravelState {
    pub fn unplaced() -> Self {
        Self {
            placed:           false,
            position:         Coord::new(0.0, 0.0),
            leg:              Leg::ACCESS,
            locked:           false,
            awaiting_release: false,
            last_road:        None,
        }
    }

    pub fn at(position: Coord) -> Self {
        Self { placed: true, position, ..Self::unplaced() }
    }

    /// Adopt the leg leaving a waypoint just reached.
    #[inline]
    pub(crate) fn board(&mut self, leg: Leg) {
        self.leg = leg;
        self.locked = leg.kind == LegKind::Transit;
    }

    /// Back to standing still: walking pace, not riding, no pending release.
    pub(crate) fn stop(&mut self) {
        self.leg = Leg::ACCESS;
        self.locked = false;
        self.awaiting_release = false;
    }
}
