//! Route planning over the street + transit graph.
//!
//! # Algorithm
//!
//! 1. Snap origin and destination to their nearest roads.  An end that is
//!    already on a road gets no access hop.  A snapped road with no mode
//!    in common with the agent makes the trip unreachable.
//! 2. Each snapped road offers two candidate junctions, its start and end.
//! 3. One Dijkstra run per origin candidate gives the cost to both
//!    destination candidates.  A candidate's total cost is the along-road
//!    part to the origin junction, the graph path, and the along-road part
//!    from the destination junction.  Candidates are tried origin start/end
//!    × destination start/end and the first strictly cheapest one wins.
//!    When both ends snap to the same road, walking straight along it is
//!    tried before any junction pair.
//! 4. The winner is stitched into waypoints, each tagged with its leg.

use std::sync::Arc;

use tracing::debug;

use nav_core::{Coord, EdgeId, JunctionId, TransportSet};
use nav_spatial::{EdgeKind, Road, RoadNetwork, Snap};

use crate::dijkstra::shortest_paths;
use crate::route::{Leg, Route, RouteBuilder};
use crate::weight::{edge_weight, partial_leg, traverse_leg};
use crate::{RouteError, RoutePlanner, RouteResult};

struct Anchor {
    raw:  Coord,
    snap: Snap,
}

impl Anchor {
    fn off_network(&self) -> bool {
        self.raw != self.snap.point
    }
}

enum Connection {
    /// Both ends on the same road; walk along it.
    Direct,
    Via {
        from: JunctionId,
        to:   JunctionId,
        path: Vec<(EdgeId, JunctionId)>,
    },
}

struct Plan {
    origin:      Anchor,
    destination: Anchor,
    connection:  Connection,
}

/// Planner for towns with a continuous street network and transit lines.
#[derive(Clone)]
pub struct NetworkPlanner {
    network: Arc<RoadNetwork>,
}

impl NetworkPlanner {
    pub fn new(network: Arc<RoadNetwork>) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    fn anchor(&self, raw: Coord) -> RouteResult<Anchor> {
        Ok(Anchor { raw, snap: self.network.nearest_road(raw)? })
    }

    fn resolve(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<Plan> {
        let net = &*self.network;
        let o = self.anchor(origin)?;
        let d = self.anchor(destination)?;
        let o_road = net.road(o.snap.road);
        let d_road = net.road(d.snap.road);
        let usable = |road: &Road| edge_weight(net.edge(road.edge), modes).is_some();
        if !usable(o_road) || !usable(d_road) {
            return Err(RouteError::Unreachable { origin, destination, modes });
        }
        let o_speed = partial_leg(net.edge(o_road.edge), modes).multiplier;
        let d_speed = partial_leg(net.edge(d_road.edge), modes).multiplier;

        let mut best: Option<(f64, Connection)> = None;

        if o.snap.road == d.snap.road {
            let along = (o_road.offset_of(&o.snap) - o_road.offset_of(&d.snap)).abs();
            best = Some((along / o_speed, Connection::Direct));
        }

        let targets = [d_road.start, d_road.end];
        for from in [o_road.start, o_road.end] {
            let tree = shortest_paths(net, from, modes, &targets);
            let head = o_road.distance_to(&o.snap, from) / o_speed;
            for to in targets {
                let Some(mid) = tree.cost(to) else {
                    continue;
                };
                let tail = d_road.distance_to(&d.snap, to) / d_speed;
                let cost = head + mid + tail;
                if best.as_ref().is_none_or(|(b, _)| cost < *b) {
                    let path = tree.path_to(net, to);
                    best = Some((cost, Connection::Via { from, to, path }));
                }
            }
        }

        match best {
            Some((cost, connection)) => {
                debug!(%origin, %destination, %modes, cost, "route resolved");
                Ok(Plan { origin: o, destination: d, connection })
            }
            None => Err(RouteError::Unreachable { origin, destination, modes }),
        }
    }

    fn stitch(&self, plan: &Plan, modes: TransportSet) -> Route {
        let net = &*self.network;
        let o_road = net.road(plan.origin.snap.road);
        let d_road = net.road(plan.destination.snap.road);
        let o_leg = partial_leg(net.edge(o_road.edge), modes);
        let d_leg = partial_leg(net.edge(d_road.edge), modes);

        let mut b = RouteBuilder::default();
        match &plan.connection {
            Connection::Direct => {
                b.push_leg(&o_road.walk_between(&plan.origin.snap, &plan.destination.snap), o_leg);
            }
            Connection::Via { from, to, path } => {
                b.push_leg(&o_road.walk_to(&plan.origin.snap, *from), o_leg);
                for &(e, entered) in path {
                    let edge = net.edge(e);
                    let leg = traverse_leg(edge, modes);
                    match edge.kind {
                        EdgeKind::Road(r) => b.push_leg(&net.road(r).vertices_from(entered), leg),
                        EdgeKind::Transit(_) => b.push_leg(
                            &[net.junction(entered).pos, net.junction(edge.other(entered)).pos],
                            leg,
                        ),
                    }
                }
                b.push_leg(&d_road.walk_from(*to, &plan.destination.snap), d_leg);
            }
        }
        if plan.destination.off_network() {
            // Stepping off the road to the raw destination is on foot.
            b.push(plan.destination.snap.point, Leg::ACCESS);
            b.push(plan.destination.raw, Leg::ACCESS);
        }
        b.finish()
    }

    /// Geometric length of the route `stitch` would produce, from the raw
    /// origin to the raw destination.
    fn length(&self, plan: &Plan) -> f64 {
        let net = &*self.network;
        let o_road: &Road = net.road(plan.origin.snap.road);
        let d_road: &Road = net.road(plan.destination.snap.road);
        let along = match &plan.connection {
            Connection::Direct => {
                (o_road.offset_of(&plan.origin.snap) - o_road.offset_of(&plan.destination.snap)).abs()
            }
            Connection::Via { from, to, path } => {
                o_road.distance_to(&plan.origin.snap, *from)
                    + path.iter().map(|&(e, _)| net.edge(e).length).sum::<f64>()
                    + d_road.distance_to(&plan.destination.snap, *to)
            }
        };
        plan.origin.snap.distance + along + plan.destination.snap.distance
    }
}

impl RoutePlanner for NetworkPlanner {
    fn plan(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<Route> {
        if origin == destination {
            return Ok(Route::new());
        }
        let plan = self.resolve(origin, destination, modes)?;
        Ok(self.stitch(&plan, modes))
    }

    fn distance(&self, origin: Coord, destination: Coord, modes: TransportSet) -> RouteResult<f64> {
        if origin == destination {
            return Ok(0.0);
        }
        let plan = self.resolve(origin, destination, modes)?;
        Ok(self.length(&plan))
    }
}
