//! Unit tests for nav-travel.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use nav_core::{AgentId, Coord, TransportMode, TransportSet};
    use nav_route::NetworkPlanner;
    use nav_spatial::{NetworkBuilder, RoadNetwork, RoadSpec, TransitSpec};

    use crate::TravelEngine;

    pub fn walk() -> TransportSet {
        TransportSet::walk_only()
    }

    /// `(0,0) ─0─ (10,0) ─1─ (20,0) ─2─ (30,0)`, walk + car.
    pub fn line() -> Arc<RoadNetwork> {
        let mut b = NetworkBuilder::new();
        for x in [0.0, 10.0, 20.0] {
            b.add_road(RoadSpec::new(vec![Coord::new(x, 0.0), Coord::new(x + 10.0, 0.0)]));
        }
        Arc::new(b.build().unwrap())
    }

    /// Three walk-only islands joined by one bus line stopping at
    /// `(10,0)`, `(50,0)` and `(100,0)`.
    pub fn islands() -> Arc<RoadNetwork> {
        let mut b = NetworkBuilder::new();
        for x in [0.0, 50.0, 100.0] {
            b.add_road(RoadSpec::new(vec![Coord::new(x, 0.0), Coord::new(x + 10.0, 0.0)]).modes(walk()));
        }
        b.add_transit(TransitSpec::new(
            "shuttle",
            TransportMode::Bus,
            vec![Coord::new(10.0, 0.0), Coord::new(50.0, 0.0), Coord::new(100.0, 0.0)],
        ));
        Arc::new(b.build().unwrap())
    }

    pub fn engine(net: Arc<RoadNetwork>, agents: usize) -> TravelEngine<NetworkPlanner> {
        TravelEngine::new(NetworkPlanner::new(net), agents)
    }

    /// Walking-pace distance `agent` still has to cover.
    pub fn remaining(engine: &TravelEngine<NetworkPlanner>, agent: AgentId) -> f64 {
        let state = engine.store.state(agent).unwrap();
        engine
            .store
            .route(agent)
            .map_or(0.0, |r| r.effective_length_from(state.position, state.leg.multiplier))
    }
}

// ── TravelStore ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod travel_store {
    use nav_core::{AgentId, Coord};
    use nav_route::Route;

    use crate::{TravelError, TravelStore};

    #[test]
    fn new_all_unplaced() {
        let store = TravelStore::new(3);
        assert_eq!(store.agent_count(), 3);
        for i in 0..3 {
            assert!(!store.states[i].placed);
            assert!(matches!(store.state(AgentId(i as u32)), Err(TravelError::NotPlaced(_))));
        }
        assert!(store.routes.is_empty());
    }

    #[test]
    fn place_sets_position_and_drops_route() {
        let mut store = TravelStore::new(2);
        store.routes.insert(AgentId(1), Route::fixed_delay(Coord::new(1.0, 1.0), 3));
        store.place(AgentId(1), Coord::new(4.0, 2.0)).unwrap();
        assert_eq!(store.position(AgentId(1)), Some(Coord::new(4.0, 2.0)));
        assert!(!store.travelling(AgentId(1)));
    }

    #[test]
    fn place_out_of_range_fails() {
        let mut store = TravelStore::new(1);
        assert!(store.place(AgentId(5), Coord::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn travelling_agents_in_id_order() {
        let mut store = TravelStore::new(4);
        for a in [3, 0, 2] {
            store.routes.insert(AgentId(a), Route::fixed_delay(Coord::new(1.0, 1.0), 1));
        }
        assert_eq!(store.travelling_agents(), vec![AgentId(0), AgentId(2), AgentId(3)]);
    }
}

// ── Advancing along a route ───────────────────────────────────────────────────

#[cfg(test)]
mod advance {
    use nav_core::{AgentId, Coord, TransportMode};

    use super::helpers::{engine, line, remaining, walk};
    use crate::{AdvanceOutcome, NoopSink};

    const A: AgentId = AgentId(0);

    #[test]
    fn walks_then_arrives() {
        let mut e = engine(line(), 1);
        e.place(A, Coord::new(0.0, 0.0)).unwrap();
        assert!(e.begin_travel(A, Coord::new(30.0, 0.0), walk()).unwrap());

        assert_eq!(e.advance(A, 7.0, &mut NoopSink).unwrap(), AdvanceOutcome::Moving);
        assert_eq!(e.store.position(A), Some(Coord::new(7.0, 0.0)));
        assert_eq!(e.advance(A, 7.0, &mut NoopSink).unwrap(), AdvanceOutcome::Moving);
        assert_eq!(e.store.position(A), Some(Coord::new(14.0, 0.0)));

        assert_eq!(e.advance(A, 100.0, &mut NoopSink).unwrap(), AdvanceOutcome::Arrived);
        assert_eq!(e.store.position(A), Some(Coord::new(30.0, 0.0)));
        assert!(!e.store.travelling(A));
    }

    #[test]
    fn arrives_exactly_at_a_destination_just_off_the_road() {
        let mut e = engine(line(), 1);
        e.place(A, Coord::new(0.0, 0.0)).unwrap();
        let dest = Coord::new(25.0, 1e-12);
        e.begin_travel(A, dest, walk()).unwrap();
        assert_eq!(e.advance(A, 100.0, &mut NoopSink).unwrap(), AdvanceOutcome::Arrived);
        assert_eq!(e.store.position(A), Some(dest));
    }

    #[test]
    fn budget_is_conserved() {
        let mut e = engine(line(), 1);
        e.place(A, Coord::new(0.0, 0.0)).unwrap();
        e.begin_travel(A, Coord::new(30.0, 0.0), walk().with(TransportMode::Car)).unwrap();

        let budget = 0.7;
        loop {
            let before = remaining(&e, A);
            match e.advance(A, budget, &mut NoopSink).unwrap() {
                AdvanceOutcome::Moving => {
                    let after = remaining(&e, A);
                    assert!((before - after - budget).abs() < 1e-9, "{before} -> {after}");
                }
                AdvanceOutcome::Arrived => {
                    assert!(before <= budget + 1e-9);
                    break;
                }
                AdvanceOutcome::Released => unreachable!(),
            }
        }
        assert_eq!(e.store.position(A), Some(Coord::new(30.0, 0.0)));
    }

    #[test]
    fn driving_covers_more_ground() {
        let mut e = engine(line(), 2);
        e.place(AgentId(0), Coord::new(0.0, 0.0)).unwrap();
        e.place(AgentId(1), Coord::new(0.0, 0.0)).unwrap();
        e.begin_travel(AgentId(0), Coord::new(30.0, 0.0), walk()).unwrap();
        e.begin_travel(AgentId(1), Coord::new(30.0, 0.0), walk().with(TransportMode::Car)).unwrap();
        e.tick(2.0, &mut NoopSink);
        assert_eq!(e.store.position(AgentId(0)), Some(Coord::new(2.0, 0.0)));
        assert_eq!(e.store.position(AgentId(1)), Some(Coord::new(10.0, 0.0)));
    }

    #[test]
    fn already_there_starts_nothing() {
        let mut e = engine(line(), 1);
        e.place(A, Coord::new(10.0, 0.0)).unwrap();
        assert!(!e.begin_travel(A, Coord::new(10.0, 0.0), walk()).unwrap());
        assert!(!e.store.travelling(A));
    }

    #[test]
    fn fixed_delay_appears_after_ticks() {
        use crate::TravelEngine;
        use nav_route::FixedDelayPlanner;

        let mut e = TravelEngine::new(FixedDelayPlanner { ticks: 2 }, 1);
        e.place(A, Coord::new(0.0, 0.0)).unwrap();
        e.begin_travel(A, Coord::new(500.0, 500.0), walk()).unwrap();
        assert_eq!(e.advance(A, 1.0, &mut NoopSink).unwrap(), AdvanceOutcome::Moving);
        assert_eq!(e.store.position(A), Some(Coord::new(0.0, 0.0)));
        assert_eq!(e.advance(A, 1.0, &mut NoopSink).unwrap(), AdvanceOutcome::Arrived);
        assert_eq!(e.store.position(A), Some(Coord::new(500.0, 500.0)));
    }
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod failures {
    use nav_core::{AgentId, Coord};
    use nav_route::{Leg, LegKind, Route, RouteError, Waypoint};

    use super::helpers::{engine, islands, line, walk};
    use crate::{AwarenessLog, NoopSink, TickSummary, TravelError};

    fn unmapped_route() -> Route {
        let street_without_road = Leg { kind: LegKind::Street, multiplier: 1.0, road: None };
        Route::from_waypoints([
            Waypoint { coord: Coord::new(0.0, 0.0), leg: street_without_road },
            Waypoint { coord: Coord::new(10.0, 0.0), leg: Leg::ACCESS },
        ])
    }

    #[test]
    fn advancing_without_route_is_an_error() {
        let mut e = engine(line(), 1);
        e.place(AgentId(0), Coord::new(0.0, 0.0)).unwrap();
        let err = e.advance(AgentId(0), 5.0, &mut NoopSink).unwrap_err();
        assert!(matches!(err, TravelError::EmptyRoute { agent } if agent == AgentId(0)));
    }

    #[test]
    fn unplaced_agent_is_an_error() {
        let mut e = engine(line(), 1);
        let err = e.advance(AgentId(0), 5.0, &mut NoopSink).unwrap_err();
        assert!(matches!(err, TravelError::NotPlaced(_)));
        assert!(e.begin_travel(AgentId(0), Coord::new(5.0, 0.0), walk()).is_err());
    }

    #[test]
    fn missing_road_reports_context() {
        let mut e = engine(line(), 1);
        e.place(AgentId(0), Coord::new(0.0, 0.0)).unwrap();
        e.assign_route(AgentId(0), unmapped_route()).unwrap();
        let err = e.advance(AgentId(0), 5.0, &mut NoopSink).unwrap_err();
        match &err {
            TravelError::MissingRoad { agent, index, route } => {
                assert_eq!(*agent, AgentId(0));
                assert_eq!(*index, 0);
                assert!(route.contains("10.0"));
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(e.store.position(AgentId(0)), Some(Coord::new(0.0, 0.0)));
    }

    #[test]
    fn unreachable_destination_surfaces_routing_error() {
        let mut e = engine(islands(), 1);
        e.place(AgentId(0), Coord::new(0.0, 0.0)).unwrap();
        let err = e.begin_travel(AgentId(0), Coord::new(110.0, 0.0), walk()).unwrap_err();
        assert!(matches!(err, TravelError::Routing(RouteError::Unreachable { .. })));
        assert!(!e.store.travelling(AgentId(0)));
    }

    #[test]
    fn one_bad_agent_does_not_stop_the_tick() {
        let mut e = engine(line(), 3);
        for a in 0..3 {
            e.place(AgentId(a), Coord::new(0.0, 0.0)).unwrap();
        }
        e.begin_travel(AgentId(0), Coord::new(30.0, 0.0), walk()).unwrap();
        e.assign_route(AgentId(1), unmapped_route()).unwrap();
        e.begin_travel(AgentId(2), Coord::new(30.0, 0.0), walk()).unwrap();

        let mut log = AwarenessLog::default();
        let summary = e.tick(5.0, &mut log);
        assert_eq!(summary, TickSummary { moving: 2, arrived: 0, released: 0, failed: 1 });
        assert_eq!(e.store.position(AgentId(0)), Some(Coord::new(5.0, 0.0)));
        assert_eq!(e.store.position(AgentId(1)), Some(Coord::new(0.0, 0.0)));
        assert_eq!(e.store.position(AgentId(2)), Some(Coord::new(5.0, 0.0)));
    }
}

// ── Transit locking and release ───────────────────────────────────────────────

#[cfg(test)]
mod transit {
    use nav_core::{AgentId, Coord, RoadId, TransportMode};

    use super::helpers::{engine, islands, walk};
    use crate::{AdvanceOutcome, AwarenessLog, NoopSink, TravelError};

    const A: AgentId = AgentId(0);

    fn riding() -> crate::TravelEngine<nav_route::NetworkPlanner> {
        let mut e = engine(islands(), 1);
        e.place(A, Coord::new(0.0, 0.0)).unwrap();
        e.begin_travel(A, Coord::new(110.0, 0.0), walk().with(TransportMode::Bus)).unwrap();
        e
    }

    #[test]
    fn boarding_locks_the_agent() {
        let mut e = riding();
        // 10 to the stop, then 10 of budget at bus speed (×2).
        assert_eq!(e.advance(A, 20.0, &mut NoopSink).unwrap(), AdvanceOutcome::Moving);
        let state = e.store.state(A).unwrap();
        assert!(state.locked);
        assert_eq!(state.position, Coord::new(30.0, 0.0));

        let err = e.begin_travel(A, Coord::new(0.0, 0.0), walk()).unwrap_err();
        assert!(matches!(err, TravelError::AlreadyInTransit(_)));
    }

    #[test]
    fn riding_reports_no_roads() {
        let mut e = riding();
        let mut log = AwarenessLog::default();
        assert_eq!(e.advance(A, 1000.0, &mut log).unwrap(), AdvanceOutcome::Arrived);
        assert_eq!(log.events, vec![(A, RoadId(0)), (A, RoadId(2))]);
        assert!(!e.store.state(A).unwrap().locked);
    }

    #[test]
    fn release_at_boarding() {
        let mut e = riding();
        e.request_release(A).unwrap();
        assert_eq!(e.advance(A, 1000.0, &mut NoopSink).unwrap(), AdvanceOutcome::Released);
        let state = e.store.state(A).unwrap();
        assert_eq!(state.position, Coord::new(10.0, 0.0));
        assert!(!state.locked);
        assert!(!state.awaiting_release);
        assert!(!e.store.travelling(A));
    }

    #[test]
    fn release_mid_ride_waits_for_the_next_stop() {
        let mut e = riding();
        e.advance(A, 20.0, &mut NoopSink).unwrap();
        e.request_release(A).unwrap();
        // Still between stops: a small step only moves the bus along.
        assert_eq!(e.advance(A, 5.0, &mut NoopSink).unwrap(), AdvanceOutcome::Moving);
        assert_eq!(e.store.position(A), Some(Coord::new(40.0, 0.0)));

        assert_eq!(e.advance(A, 1000.0, &mut NoopSink).unwrap(), AdvanceOutcome::Released);
        assert_eq!(e.store.position(A), Some(Coord::new(50.0, 0.0)));
    }
}

// ── Awareness ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod awareness {
    use std::sync::Arc;

    use nav_core::{AgentId, Coord, FeatureId, RoadId};
    use nav_spatial::{CacheStatus, Fingerprint, JsonFileStore, NetworkBuilder, RoadSpec, SourceStamp};

    use super::helpers::{engine, line, walk};
    use crate::{AwarenessLog, FeatureIndex};

    const A: AgentId = AgentId(0);

    fn points() -> Vec<(FeatureId, Coord, Option<FeatureId>)> {
        vec![
            (FeatureId(1), Coord::new(5.0, 2.0), Some(FeatureId(90))),
            (FeatureId(2), Coord::new(6.0, -2.0), Some(FeatureId(80))),
            (FeatureId(3), Coord::new(4.0, 1.0), Some(FeatureId(90))),
            (FeatureId(4), Coord::new(25.0, 3.0), None),
        ]
    }

    #[test]
    fn features_grouped_by_nearest_road() {
        let net = line();
        let index = FeatureIndex::from_points(&net, &points()).unwrap();
        assert_eq!(index.len(), 2);
        let first = index.get(RoadId(0));
        assert_eq!(first.buildings, vec![FeatureId(1), FeatureId(2), FeatureId(3)]);
        assert_eq!(first.communities, vec![FeatureId(80), FeatureId(90)]);
        assert_eq!(index.get(RoadId(2)).buildings, vec![FeatureId(4)]);
        assert!(index.get(RoadId(1)).is_empty());
    }

    #[test]
    fn one_event_per_road_change() {
        let mut e = engine(line(), 1);
        e.features = FeatureIndex::from_points(&line(), &points()).unwrap();
        e.place(A, Coord::new(0.0, 0.0)).unwrap();
        e.begin_travel(A, Coord::new(30.0, 0.0), walk()).unwrap();

        let mut log = AwarenessLog::default();
        while e.store.travelling(A) {
            e.advance(A, 1.0, &mut log).unwrap();
        }
        assert_eq!(log.events, vec![(A, RoadId(0)), (A, RoadId(1)), (A, RoadId(2))]);
        assert_eq!(log.buildings_seen, 4);
    }

    #[test]
    fn long_road_reported_once() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![
            Coord::new(0.0, 0.0),
            Coord::new(5.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(15.0, 0.0),
        ]));
        let mut e = engine(Arc::new(b.build().unwrap()), 1);
        e.place(A, Coord::new(0.0, 0.0)).unwrap();
        e.begin_travel(A, Coord::new(15.0, 0.0), walk()).unwrap();
        assert_eq!(e.store.route(A).unwrap().len(), 4);

        let mut log = AwarenessLog::default();
        e.advance(A, 100.0, &mut log).unwrap();
        assert_eq!(log.events, vec![(A, RoadId(0))]);
    }

    #[test]
    fn same_road_next_journey_not_repeated() {
        let mut e = engine(line(), 1);
        e.place(A, Coord::new(0.0, 0.0)).unwrap();
        let mut log = AwarenessLog::default();
        e.begin_travel(A, Coord::new(4.0, 0.0), walk()).unwrap();
        e.advance(A, 100.0, &mut log).unwrap();
        e.begin_travel(A, Coord::new(8.0, 0.0), walk()).unwrap();
        e.advance(A, 100.0, &mut log).unwrap();
        assert_eq!(log.events, vec![(A, RoadId(0))]);
    }

    #[test]
    fn index_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("features.json"));
        let fp = Fingerprint::from_stamps(vec![SourceStamp {
            path:           "buildings.shp".into(),
            modified_secs:  1_700_000_000,
            modified_nanos: 0,
        }]);
        let net = line();

        let (built, status) = FeatureIndex::load_or_build(&net, &store, &fp, &points()).unwrap();
        assert_eq!(status, CacheStatus::Rebuilt);
        let (loaded, status) = FeatureIndex::load_or_build(&net, &store, &fp, &[]).unwrap();
        assert_eq!(status, CacheStatus::Loaded);
        assert_eq!(loaded, built);

        let moved = Fingerprint::from_stamps(vec![SourceStamp {
            path:           "buildings.shp".into(),
            modified_secs:  1_700_000_001,
            modified_nanos: 0,
        }]);
        let (rebuilt, status) = FeatureIndex::load_or_build(&net, &store, &moved, &[]).unwrap();
        assert_eq!(status, CacheStatus::Rebuilt);
        assert!(rebuilt.is_empty());
    }
}
