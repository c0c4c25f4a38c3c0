//! Planned routes.
//!
//! A [`Route`] is the sequence of points an agent still has to reach.  Each
//! [`Waypoint`] carries the [`Leg`] used to travel *from* it toward the next
//! waypoint: how fast (multiplier), on what kind of infrastructure, and
//! along which road.  The leg of the last waypoint is never used.
//!
//! The agent's position is not part of the route: the first waypoint is
//! reached with whatever leg the agent is currently on (walking pace for a
//! fresh route).

use std::collections::VecDeque;

use nav_core::{Coord, RoadId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegKind {
    /// Off-network hop between a raw coordinate and its nearest road.
    Access,
    /// Along a road, walking or driving.
    Street,
    /// Riding a bus or train between stations.
    Transit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub kind:       LegKind,
    /// Speed relative to walking pace; always `>= 1`.
    pub multiplier: f64,
    pub road:       Option<RoadId>,
}

impl Leg {
    pub const ACCESS: Leg = Leg { kind: LegKind::Access, multiplier: 1.0, road: None };

    pub fn street(multiplier: f64, road: RoadId) -> Self {
        Self { kind: LegKind::Street, multiplier: multiplier.max(1.0), road: Some(road) }
    }

    pub fn transit(multiplier: f64, road: Option<RoadId>) -> Self {
        Self { kind: LegKind::Transit, multiplier: multiplier.max(1.0), road }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub coord: Coord,
    pub leg:   Leg,
}

/// An ordered, consumable list of waypoints.
///
/// Returned by value from planners and caches; every caller owns its copy,
/// so consuming a route never affects anyone else's.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    waypoints: VecDeque<Waypoint>,
    /// Fixed-delay routes: advances left before the agent is placed at the
    /// (single) waypoint.
    delay:     Option<u32>,
}

impl Route {
    /// The empty route (origin == destination).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_waypoints(waypoints: impl IntoIterator<Item = Waypoint>) -> Self {
        Self { waypoints: waypoints.into_iter().collect(), delay: None }
    }

    /// A route with no geometry that completes after `ticks` advances.
    pub fn fixed_delay(destination: Coord, ticks: u32) -> Self {
        Self {
            waypoints: VecDeque::from([Waypoint { coord: destination, leg: Leg::ACCESS }]),
            delay:     Some(ticks),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn front(&self) -> Option<&Waypoint> {
        self.waypoints.front()
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<Waypoint> {
        self.waypoints.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn coords(&self) -> Vec<Coord> {
        self.waypoints.iter().map(|w| w.coord).collect()
    }

    pub fn destination(&self) -> Option<Coord> {
        self.waypoints.back().map(|w| w.coord)
    }

    /// Advances left on a fixed-delay route; `None` for geometric routes.
    #[inline]
    pub fn delay(&self) -> Option<u32> {
        self.delay
    }

    /// Count one advance off a fixed-delay route.  Returns `true` once the
    /// delay has fully elapsed.
    pub fn tick_delay(&mut self) -> bool {
        match &mut self.delay {
            Some(0) | None => true,
            Some(n) => {
                *n -= 1;
                *n == 0
            }
        }
    }

    /// Geometric length from `start` through every waypoint.
    pub fn length_from(&self, start: Coord) -> f64 {
        let mut prev = start;
        let mut total = 0.0;
        for w in &self.waypoints {
            total += prev.distance(w.coord);
            prev = w.coord;
        }
        total
    }

    /// Geometric length through the waypoints only.
    pub fn length(&self) -> f64 {
        self.waypoints.front().map_or(0.0, |w| self.length_from(w.coord))
    }

    /// Walking-pace-equivalent length from `start`, reaching the first
    /// waypoint at `multiplier` and each following one at the previous
    /// waypoint's leg multiplier.
    pub fn effective_length_from(&self, start: Coord, multiplier: f64) -> f64 {
        let mut prev = start;
        let mut speed = multiplier;
        let mut total = 0.0;
        for w in &self.waypoints {
            total += prev.distance(w.coord) / speed;
            prev = w.coord;
            speed = w.leg.multiplier;
        }
        total
    }

    /// Index of the first street leg with no road recorded, if any.
    pub fn first_unmapped_street(&self) -> Option<usize> {
        self.waypoints
            .iter()
            .position(|w| w.leg.kind == LegKind::Street && w.leg.road.is_none())
    }
}

// ── RouteBuilder ──────────────────────────────────────────────────────────────

/// Accumulates legs into a route, collapsing consecutive duplicate points.
///
/// When a point repeats, the later leg annotation replaces the earlier one:
/// the shared junction between two legs carries the leg that leaves it.
#[derive(Default)]
pub(crate) struct RouteBuilder {
    waypoints: Vec<Waypoint>,
}

impl RouteBuilder {
    pub(crate) fn push(&mut self, coord: Coord, leg: Leg) {
        match self.waypoints.last_mut() {
            Some(last) if last.coord == coord => last.leg = leg,
            _ => self.waypoints.push(Waypoint { coord, leg }),
        }
    }

    pub(crate) fn push_leg(&mut self, points: &[Coord], leg: Leg) {
        for &p in points {
            self.push(p, leg);
        }
    }

    pub(crate) fn finish(mut self) -> Route {
        if let Some(last) = self.waypoints.last_mut() {
            last.leg = Leg::ACCESS;
        }
        Route::from_waypoints(self.waypoints)
    }
}
