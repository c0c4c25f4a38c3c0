//! Dijkstra over the undirected junction graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nav_core::{EdgeId, JunctionId, TransportSet};
use nav_spatial::RoadNetwork;

use crate::weight::edge_weight;

/// Min-heap entry.  Ties on cost pop the lower `JunctionId` first so runs
/// are reproducible.
#[derive(Clone, Copy, PartialEq)]
struct Queued {
    cost: f64,
    node: JunctionId,
}

impl Eq for Queued {}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Costs and predecessor edges from one source junction.
pub(crate) struct ShortestPaths {
    dist: Vec<f64>,
    prev: Vec<EdgeId>,
}

impl ShortestPaths {
    /// Cost to reach `j`; `None` if unreachable (or not settled before the
    /// search stopped).
    pub(crate) fn cost(&self, j: JunctionId) -> Option<f64> {
        let d = self.dist[j.index()];
        d.is_finite().then_some(d)
    }

    /// Edges from the source to `target`, each paired with the junction it
    /// is entered from.
    pub(crate) fn path_to(&self, network: &RoadNetwork, target: JunctionId) -> Vec<(EdgeId, JunctionId)> {
        let mut path = Vec::new();
        let mut cur = target;
        loop {
            let e = self.prev[cur.index()];
            if e == EdgeId::INVALID {
                break;
            }
            let from = network.edge(e).other(cur);
            path.push((e, from));
            cur = from;
        }
        path.reverse();
        path
    }
}

/// Run Dijkstra from `source`, stopping once every junction in `targets`
/// has been settled.
pub(crate) fn shortest_paths(
    network: &RoadNetwork,
    source:  JunctionId,
    modes:   TransportSet,
    targets: &[JunctionId],
) -> ShortestPaths {
    let n = network.junction_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![EdgeId::INVALID; n];
    let mut settled = vec![false; n];
    let mut remaining = targets.len();

    dist[source.index()] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(Queued { cost: 0.0, node: source });

    while let Some(Queued { cost, node }) = heap.pop() {
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;
        if targets.contains(&node) {
            remaining -= targets.iter().filter(|&&t| t == node).count();
            if remaining == 0 {
                break;
            }
        }

        for &e in network.incident_edges(node) {
            let edge = network.edge(e);
            let Some(w) = edge_weight(edge, modes) else {
                continue;
            };
            let next = edge.other(node);
            let new_cost = cost + w;
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev[next.index()] = e;
                heap.push(Queued { cost: new_cost, node: next });
            }
        }
    }

    // Only settled distances are final.
    for (d, s) in dist.iter_mut().zip(&settled) {
        if !s {
            *d = f64::INFINITY;
        }
    }
    ShortestPaths { dist, prev }
}
