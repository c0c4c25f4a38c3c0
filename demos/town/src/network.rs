//! Synthetic grid town.
//!
//! `blocks × blocks` square blocks of side `spacing`.  Every street has a
//! midpoint vertex so the along-road legs are real polylines.  The middle
//! avenue in each direction is a major road.  A bus loops along the south
//! and east edges, stopping every second junction, and a train crosses the
//! north edge every fourth.
//!
//! Two buildings sit in each block, one facing the south street and one
//! the west street.  The town is split into four community quadrants.

use nav_core::{Coord, FeatureId, TransportMode};
use nav_spatial::{LocatorParams, NetworkBuilder, RoadNetwork, RoadSpec, SpatialResult, TransitSpec};

pub type Building = (FeatureId, Coord, Option<FeatureId>);

pub fn build_town(blocks: usize, spacing: f64, locator: LocatorParams) -> SpatialResult<(RoadNetwork, Vec<Building>)> {
    let at = |i: usize, j: usize| Coord::new(i as f64 * spacing, j as f64 * spacing);
    let middle = blocks / 2;

    let mut b = NetworkBuilder::with_capacity(2 * blocks * (blocks + 1)).locator(locator);
    for j in 0..=blocks {
        for i in 0..blocks {
            let (a, z) = (at(i, j), at(i + 1, j));
            let spec = RoadSpec::new(vec![a, midpoint(a, z), z]);
            b.add_road(if j == middle { spec.major() } else { spec });
        }
    }
    for i in 0..=blocks {
        for j in 0..blocks {
            let (a, z) = (at(i, j), at(i, j + 1));
            let spec = RoadSpec::new(vec![a, midpoint(a, z), z]);
            b.add_road(if i == middle { spec.major() } else { spec });
        }
    }

    let mut bus: Vec<Coord> = (0..=blocks).step_by(2).map(|i| at(i, 0)).collect();
    let east = blocks - blocks % 2;
    bus.extend((2..=blocks).step_by(2).map(|j| at(east, j)));
    b.add_transit(TransitSpec::new("loop", TransportMode::Bus, bus));

    if blocks >= 4 {
        let train = (0..=blocks).step_by(4).map(|i| at(i, blocks)).collect();
        b.add_transit(TransitSpec::new("north line", TransportMode::Train, train));
    }

    let mut buildings = Vec::with_capacity(2 * blocks * blocks);
    for j in 0..blocks {
        for i in 0..blocks {
            let community = FeatureId(1_000 + u32::from(i >= middle) + 2 * u32::from(j >= middle));
            let origin = at(i, j);
            let south = Coord::new(origin.x + 0.5 * spacing, origin.y + 0.15 * spacing);
            let west = Coord::new(origin.x + 0.15 * spacing, origin.y + 0.6 * spacing);
            for pos in [south, west] {
                buildings.push((FeatureId(buildings.len() as u32), pos, Some(community)));
            }
        }
    }

    Ok((b.build()?, buildings))
}

fn midpoint(a: Coord, b: Coord) -> Coord {
    Coord::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}
