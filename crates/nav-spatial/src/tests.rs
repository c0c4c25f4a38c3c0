//! Unit tests for nav-spatial.
//!
//! All tests use hand-crafted networks; persisted caches go to temp dirs.

#[cfg(test)]
pub(crate) mod helpers {
    use nav_core::Coord;

    use crate::{LocatorParams, NetworkBuilder, RoadNetwork, RoadSpec};

    pub const N: Coord = Coord::new(0.0, 10.0);
    pub const E: Coord = Coord::new(10.0, 10.0);
    pub const S: Coord = Coord::new(10.0, 0.0);
    pub const W: Coord = Coord::new(0.0, 0.0);

    /// Four junctions on a 10×10 square, joined by four length-10 roads:
    ///
    /// ```text
    ///   N ──0── E
    ///   │       │
    ///   3       1
    ///   │       │
    ///   W ──2── S
    /// ```
    pub fn square() -> RoadNetwork {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, E]));
        b.add_road(RoadSpec::new(vec![E, S]));
        b.add_road(RoadSpec::new(vec![S, W]));
        b.add_road(RoadSpec::new(vec![W, N]));
        b.build().unwrap()
    }

    /// A single length-10 road along the x axis, with a tight search window.
    pub fn single_road(radius: f64, attempts: u32) -> RoadNetwork {
        let mut b = NetworkBuilder::new().locator(LocatorParams {
            search_radius: radius,
            max_attempts:  attempts,
        });
        b.add_road(RoadSpec::new(vec![Coord::new(0.0, 0.0), Coord::new(10.0, 0.0)]));
        b.build().unwrap()
    }
}

// ── Graph builder ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use nav_core::{Coord, EdgeId, JunctionId, RoadId, TransportMode, TransportSet};

    use super::helpers::{E, N, S, W, square};
    use crate::{BuilderError, EdgeKind, NetworkBuilder, RoadSpec, SpatialError, TransitSpec};

    #[test]
    fn empty_build() {
        let net = NetworkBuilder::new().build().unwrap();
        assert!(net.is_empty());
        assert_eq!(net.edge_count(), 0);
    }

    #[test]
    fn shared_endpoints_become_one_junction() {
        let net = square();
        assert_eq!(net.junction_count(), 4);
        assert_eq!(net.road_count(), 4);
        assert_eq!(net.edge_count(), 4);
        for j in &net.junctions {
            assert_eq!(j.roads.len(), 2, "{} should touch two roads", j.id);
            assert_eq!(j.edges.len(), 2);
        }
        assert_eq!(net.junction(JunctionId(0)).pos, N);
    }

    #[test]
    fn road_edge_weighted_by_polyline_length() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![
            Coord::new(0.0, 0.0),
            Coord::new(3.0, 4.0),
            Coord::new(3.0, 10.0),
        ]));
        let net = b.build().unwrap();
        let road = net.road(RoadId(0));
        assert!((road.length - 11.0).abs() < 1e-12);
        assert!((net.edge(road.edge).length - 11.0).abs() < 1e-12);
        assert_eq!(net.edge(road.edge).kind, EdgeKind::Road(RoadId(0)));
    }

    #[test]
    fn short_road_is_rejected() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, E]));
        b.add_road(RoadSpec::new(vec![S]));
        let err = b.build().unwrap_err();
        assert!(matches!(
            err,
            SpatialError::Builder(BuilderError::RoadTooShort { road: RoadId(1), vertices: 1 })
        ));
    }

    #[test]
    fn self_loop_is_rejected() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, E, S, N]));
        let err = b.build().unwrap_err();
        assert!(matches!(err, SpatialError::Builder(BuilderError::SelfLoop { .. })));
    }

    #[test]
    fn non_finite_vertex_is_rejected() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, Coord::new(f64::NAN, 1.0), E]));
        let err = b.build().unwrap_err();
        assert!(matches!(err, SpatialError::Builder(BuilderError::NonFinite { .. })));
    }

    #[test]
    fn stations_snap_to_nearest_junction() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, E]));
        b.add_road(RoadSpec::new(vec![S, W]));
        b.add_transit(TransitSpec::new(
            "line 1",
            TransportMode::Train,
            vec![Coord::new(0.5, 9.5), Coord::new(0.4, 0.3)],
        ));
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 3);
        let line = &net.lines[0];
        assert_eq!(line.stations, vec![JunctionId(0), JunctionId(3)]);
        let e = net.edge(EdgeId(2));
        assert!(matches!(e.kind, EdgeKind::Transit(_)));
        assert_eq!(e.modes, TransportSet::EMPTY.with(TransportMode::Train));
        assert!((e.length - 10.0).abs() < 1e-12);
        assert_eq!(net.edge_between(JunctionId(3), JunctionId(0)), Some(EdgeId(2)));
    }

    #[test]
    fn transit_along_existing_edge_merges_mode() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, E]));
        b.add_road(RoadSpec::new(vec![E, S]));
        // Reverse orientation of road 0 on purpose.
        b.add_transit(TransitSpec::new("bus", TransportMode::Bus, vec![S, E, N]));
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 2, "no parallel edges");
        for e in &net.edges {
            assert!(e.modes.contains(TransportMode::Bus));
            assert!(e.modes.contains(TransportMode::Walk));
        }
    }

    #[test]
    fn numbered_stations_are_sorted() {
        let spec = TransitSpec::from_numbered("x", TransportMode::Bus, vec![(3, E), (1, N), (2, W)]);
        assert_eq!(spec.stations, vec![N, W, E]);
    }

    #[test]
    fn transit_errors() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, E]));
        b.add_transit(TransitSpec::new("short", TransportMode::Bus, vec![N]));
        assert!(matches!(
            b.build(),
            Err(SpatialError::Builder(BuilderError::TransitTooShort { .. }))
        ));

        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, E]));
        b.add_transit(TransitSpec::new(
            "stutter",
            TransportMode::Bus,
            vec![N, Coord::new(0.1, 10.0), E],
        ));
        assert!(matches!(
            b.build(),
            Err(SpatialError::Builder(BuilderError::TransitSelfLoop { station: 0, .. }))
        ));

        let mut b = NetworkBuilder::new();
        b.add_transit(TransitSpec::new("nowhere", TransportMode::Train, vec![N, E]));
        assert!(matches!(
            b.build(),
            Err(SpatialError::Builder(BuilderError::NoJunctionForStation { station: 0, .. }))
        ));
    }

    #[test]
    fn best_mode_respects_major_roads() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![N, E]).major());
        b.add_road(RoadSpec::new(vec![E, S]).modes(TransportSet::walk_only()));
        let net = b.build().unwrap();
        let major = net.edge(EdgeId(0));
        let path = net.edge(EdgeId(1));

        assert_eq!(major.best_mode(TransportSet::all()), Some((TransportMode::Car, 15.0)));
        assert_eq!(major.best_mode(TransportSet::walk_only()), Some((TransportMode::Walk, 1.0)));
        assert_eq!(path.best_mode(TransportSet::all()), Some((TransportMode::Walk, 1.0)));
        assert_eq!(path.best_mode(TransportSet::EMPTY.with(TransportMode::Car)), None);
    }
}

// ── Nearest-road locator ──────────────────────────────────────────────────────

#[cfg(test)]
mod locator {
    use nav_core::{Coord, RoadId};

    use super::helpers::{N, S, single_road, square};
    use crate::{NearestRoadCache, NetworkBuilder, RoadSpec, SpatialError};

    #[test]
    fn off_road_point_snaps_to_midpoint() {
        let net = single_road(20.0, 4);
        let snap = net.nearest_road(Coord::new(5.0, 2.0)).unwrap();
        assert_eq!(snap.point, Coord::new(5.0, 0.0));
        assert_eq!(snap.road, RoadId(0));
        assert!((snap.distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn window_widens_until_a_road_is_in_reach() {
        let net = single_road(1.0, 5);
        // Needs r = 8 (1 → 2 → 4 → 8).
        let snap = net.nearest_road(Coord::new(5.0, 7.0)).unwrap();
        assert_eq!(snap.point, Coord::new(5.0, 0.0));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let net = single_road(1.0, 3);
        let err = net.nearest_road(Coord::new(5.0, 100.0)).unwrap_err();
        assert!(matches!(err, SpatialError::NoRoadFound { attempts: 3, .. }));
    }

    #[test]
    fn closer_segment_outside_first_window_wins() {
        // Road 0's bbox reaches the first window, road 1 lies just outside it
        // but is closer to the query point.
        let mut b = NetworkBuilder::new().locator(crate::LocatorParams {
            search_radius: 1.0,
            max_attempts:  6,
        });
        b.add_road(RoadSpec::new(vec![Coord::new(-20.0, -20.0), Coord::new(20.0, 20.5)]));
        b.add_road(RoadSpec::new(vec![Coord::new(1.5, -5.0), Coord::new(1.5, 5.0)]));
        let net = b.build().unwrap();
        let snap = net.nearest_road(Coord::new(0.0, 3.0)).unwrap();
        assert_eq!(snap.road, RoadId(1));
        assert!((snap.distance - 1.5).abs() < 1e-12);
    }

    #[test]
    fn junction_tie_prefers_lowest_road() {
        let net = square();
        let at_n = net.nearest_road(N).unwrap();
        assert_eq!(at_n.road, RoadId(0));
        assert_eq!(at_n.distance, 0.0);
        let at_s = net.nearest_road(S).unwrap();
        assert_eq!(at_s.road, RoadId(1));
    }

    #[test]
    fn installed_cache_is_consulted_and_set_once() {
        let net = single_road(20.0, 4);
        let seed = Coord::new(2.0, 3.0);
        let cache = NearestRoadCache::build(&net, [seed, seed]).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(net.install_nearest_cache(cache.clone()));
        assert!(!net.install_nearest_cache(NearestRoadCache::default()));
        assert_eq!(net.nearest_cache().map(|c| c.len()), Some(1));
        assert_eq!(net.nearest_road(seed).unwrap(), cache.get(seed).unwrap());
    }

    #[test]
    fn road_walks_follow_the_polyline() {
        let mut b = NetworkBuilder::new();
        b.add_road(RoadSpec::new(vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(10.0, 10.0),
            Coord::new(20.0, 10.0),
        ]));
        let net = b.build().unwrap();
        let road = net.road(RoadId(0));
        let a = net.nearest_road(Coord::new(4.0, 1.0)).unwrap();
        let c = net.nearest_road(Coord::new(15.0, 11.0)).unwrap();

        assert!((road.offset_of(&a) - 4.0).abs() < 1e-12);
        assert!((road.distance_to(&c, road.end) - 5.0).abs() < 1e-12);
        assert_eq!(
            road.walk_to(&a, road.start),
            vec![Coord::new(4.0, 0.0), Coord::new(0.0, 0.0)]
        );
        assert_eq!(
            road.walk_between(&c, &a),
            vec![
                Coord::new(15.0, 10.0),
                Coord::new(10.0, 10.0),
                Coord::new(10.0, 0.0),
                Coord::new(4.0, 0.0),
            ]
        );
        assert_eq!(
            road.walk_from(road.end, &c),
            vec![Coord::new(20.0, 10.0), Coord::new(15.0, 10.0)]
        );
    }
}

// ── Persisted caches ──────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use std::cell::Cell;
    use std::fs;

    use nav_core::Coord;

    use super::helpers::single_road;
    use crate::{
        CacheStatus, CacheStore, Fingerprint, JsonFileStore, NearestRoadCache, NoStore,
        SourceStamp, load_or_build,
    };

    fn fp(secs: u64) -> Fingerprint {
        Fingerprint::from_stamps(vec![SourceStamp {
            path:           "roads.shp".into(),
            modified_secs:  secs,
            modified_nanos: 0,
        }])
    }

    #[test]
    fn matching_fingerprint_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("c.json"));
        store.save(&vec![1u32, 2, 3], &fp(10)).unwrap();
        let got: Option<Vec<u32>> = store.load(&fp(10)).unwrap();
        assert_eq!(got, Some(vec![1, 2, 3]));
    }

    #[test]
    fn stale_fingerprint_discards_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        let store = JsonFileStore::new(&path);
        store.save(&42u32, &fp(10)).unwrap();
        let got: Option<u32> = store.load(&fp(11)).unwrap();
        assert_eq!(got, None);
        assert!(!path.exists());
    }

    #[test]
    fn version_mismatch_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        JsonFileStore::new(&path).save(&"old".to_string(), &fp(1)).unwrap();
        let newer = JsonFileStore::new(&path).with_version(2);
        let got: Option<String> = newer.load(&fp(1)).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn corrupt_file_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        let (v, status) = load_or_build(&store, &fp(1), || Ok(7u32)).unwrap();
        assert_eq!((v, status), (7, CacheStatus::Rebuilt));
        let (v, status) = load_or_build(&store, &fp(1), || Ok(0u32)).unwrap();
        assert_eq!((v, status), (7, CacheStatus::Loaded));
    }

    #[test]
    fn missing_file_and_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("a/b/c.json"));
        let got: Option<u8> = store.load(&fp(1)).unwrap();
        assert!(got.is_none());
        store.save(&1u8, &fp(1)).unwrap();
        assert_eq!(store.peek::<u8>().unwrap(), 1);
    }

    #[test]
    fn no_store_always_builds() {
        let builds = Cell::new(0);
        for _ in 0..2 {
            let (_, status) = load_or_build(&NoStore, &fp(1), || {
                builds.set(builds.get() + 1);
                Ok(())
            })
            .unwrap();
            assert_eq!(status, CacheStatus::Rebuilt);
        }
        assert_eq!(builds.get(), 2);
    }

    #[test]
    fn fingerprint_from_real_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("roads.geojson");
        fs::write(&a, b"{}").unwrap();
        let f1 = Fingerprint::from_paths(&[&a]).unwrap();
        let f2 = Fingerprint::from_paths(&[&a]).unwrap();
        assert_eq!(f1, f2);
        assert_eq!(f1.sources.len(), 1);
        assert!(Fingerprint::from_paths(&[dir.path().join("missing")]).is_err());
    }

    #[test]
    fn nearest_cache_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nearest.json"));
        let seeds = [Coord::new(1.0, 1.0), Coord::new(8.0, -3.0)];

        let first = single_road(20.0, 4);
        let status = first.prepare_nearest_cache(&store, &fp(5), seeds).unwrap();
        assert_eq!(status, CacheStatus::Rebuilt);

        let second = single_road(20.0, 4);
        let status = second.prepare_nearest_cache(&store, &fp(5), seeds).unwrap();
        assert_eq!(status, CacheStatus::Loaded);
        let snap = second.nearest_road(Coord::new(8.0, -3.0)).unwrap();
        assert_eq!(snap.point, Coord::new(8.0, 0.0));
        assert_eq!(second.nearest_cache(), first.nearest_cache());

        let loaded: NearestRoadCache = store.peek().unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn reloaded_cache_finds_fractional_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nearest.json"));
        let seeds: Vec<Coord> = (0..2000)
            .map(|i| {
                let i = f64::from(i);
                Coord::new(i * 0.007_123_456_789_1 / 3.0 - 1.0, (i / 7.0).sin() * 1.9)
            })
            .collect();

        let net = single_road(20.0, 4);
        net.prepare_nearest_cache(&store, &fp(5), seeds.iter().copied()).unwrap();

        let loaded: NearestRoadCache = store.peek().unwrap();
        assert_eq!(loaded.len(), seeds.len());
        let missing = seeds.iter().filter(|&&s| loaded.get(s).is_none()).count();
        assert_eq!(missing, 0, "seeds lost their exact key on reload");
    }
}
