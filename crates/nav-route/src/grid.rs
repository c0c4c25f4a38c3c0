//! Route planning for grid towns.
//!
//! In a grid environment every road cell is a junction, so there are no
//! polylines to follow and no along-road partial legs: agents walk to the
//! nearest junction, hop junction to junction, then step to the target.

use std::sync::Arc;

use nav_core::{Coord, EdgeId, JunctionId, TransportSet};
use nav_spatial::RoadNetwork;

use crate::dijkstra::shortest_paths;
use crate::route::{Leg, Route, RouteBuilder};
use crate::weight::traverse_leg;
use crate::{RouteError, RoutePlanner, RouteResult};

struct GridPath {
    from: JunctionId,
    to:   JunctionId,
    path: Vec<(EdgeId, JunctionId)>,
}

#[derive(Clone)]
pub struct GridPlanner {
    network: Arc<RoadNetwork>,
}

impl GridPlanner {
    pub fn new(network: Arc<RoadNetwork>) -> Self {
        Self { network }
    }

    /// Cheapest path between any junction tied for nearest to `origin` and
    /// any tied for nearest to `destination`.  First strict minimum wins.
    fn best_path(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<GridPath> {
        let net = &*self.network;
        let sources = net.nearest_junctions(origin);
        let targets = net.nearest_junctions(destination);

        let mut best: Option<(f64, GridPath)> = None;
        for &from in &sources {
            let tree = shortest_paths(net, from, modes, &targets);
            for &to in &targets {
                let Some(cost) = tree.cost(to) else {
                    continue;
                };
                if best.as_ref().is_none_or(|(b, _)| cost < *b) {
                    best = Some((cost, GridPath { from, to, path: tree.path_to(net, to) }));
                }
            }
        }
        best.map(|(_, p)| p)
            .ok_or(RouteError::Unreachable { origin, destination, modes })
    }
}

impl RoutePlanner for GridPlanner {
    fn plan(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<Route> {
        if origin == destination {
            return Ok(Route::new());
        }
        let net = &*self.network;
        let GridPath { from, path, .. } = self.best_path(origin, destination, modes)?;

        let mut b = RouteBuilder::default();
        let first_leg = path
            .first()
            .map_or(Leg::ACCESS, |&(e, _)| traverse_leg(net.edge(e), modes));
        b.push(net.junction(from).pos, first_leg);
        for (i, &(e, entered)) in path.iter().enumerate() {
            let next_leg = path
                .get(i + 1)
                .map_or(Leg::ACCESS, |&(n, _)| traverse_leg(net.edge(n), modes));
            b.push(net.junction(net.edge(e).other(entered)).pos, next_leg);
        }
        b.push(destination, Leg::ACCESS);
        Ok(b.finish())
    }

    fn distance(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<f64> {
        if origin == destination {
            return Ok(0.0);
        }
        let net = &*self.network;
        let GridPath { from, to, path } = self.best_path(origin, destination, modes)?;
        let along: f64 = path.iter().map(|&(e, _)| net.edge(e).length).sum();
        Ok(origin.distance(net.junction(from).pos) + along + net.junction(to).pos.distance(destination))
    }
}
