//! Graph construction from road polylines and transit station sequences.

use std::collections::HashMap;
use std::sync::OnceLock;

use rstar::RTree;
use tracing::{debug, info};

use nav_core::{Coord, EdgeId, JunctionId, RoadId, TransitRouteId, TransportMode, TransportSet};

use crate::locator::LocatorParams;
use crate::network::{
    EdgeKind, Junction, JunctionEntry, NetworkEdge, Road, RoadNetwork, SegmentEntry, TransitLine,
};
use crate::{BuilderError, SpatialResult};

// ── Inputs ────────────────────────────────────────────────────────────────────

/// One road polyline as delivered by the geometry loader.
#[derive(Clone, Debug)]
pub struct RoadSpec {
    pub vertices: Vec<Coord>,
    pub modes:    TransportSet,
    pub major:    bool,
}

impl RoadSpec {
    /// A minor road open to walking and driving.
    pub fn new(vertices: Vec<Coord>) -> Self {
        Self {
            vertices,
            modes: TransportSet::walk_only().with(TransportMode::Car),
            major: false,
        }
    }

    #[must_use]
    pub fn modes(mut self, modes: TransportSet) -> Self {
        self.modes = modes;
        self
    }

    #[must_use]
    pub fn major(mut self) -> Self {
        self.major = true;
        self
    }
}

/// A named transit line: stations in travel order.
#[derive(Clone, Debug)]
pub struct TransitSpec {
    pub name:     String,
    pub mode:     TransportMode,
    pub stations: Vec<Coord>,
}

impl TransitSpec {
    pub fn new(name: impl Into<String>, mode: TransportMode, stations: Vec<Coord>) -> Self {
        Self { name: name.into(), mode, stations }
    }

    /// Build from `(station_number, position)` pairs in any order; stations
    /// are linked in ascending station number.
    pub fn from_numbered(
        name: impl Into<String>,
        mode: TransportMode,
        mut stations: Vec<(u32, Coord)>,
    ) -> Self {
        stations.sort_by_key(|(n, _)| *n);
        Self::new(name, mode, stations.into_iter().map(|(_, c)| c).collect())
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Collect roads and transit lines, then call [`build`](Self::build).
///
/// Roads are processed first, in input order, so `RoadId(i)` is the i-th
/// road added and junction ids follow first appearance.  Transit lines are
/// resolved afterwards against the finished road junctions.
///
/// # Example
///
/// ```
/// use nav_core::Coord;
/// use nav_spatial::{NetworkBuilder, RoadSpec};
///
/// let mut b = NetworkBuilder::new();
/// b.add_road(RoadSpec::new(vec![Coord::new(0.0, 0.0), Coord::new(10.0, 0.0)]));
/// b.add_road(RoadSpec::new(vec![Coord::new(10.0, 0.0), Coord::new(10.0, 10.0)]));
/// let net = b.build().unwrap();
/// assert_eq!(net.junction_count(), 3); // shared corner is one junction
/// assert_eq!(net.edge_count(), 2);
/// ```
#[derive(Default)]
pub struct NetworkBuilder {
    roads:   Vec<RoadSpec>,
    transit: Vec<TransitSpec>,
    locator: LocatorParams,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(roads: usize) -> Self {
        Self { roads: Vec::with_capacity(roads), ..Self::default() }
    }

    /// Search parameters the finished network's locator will use.
    #[must_use]
    pub fn locator(mut self, params: LocatorParams) -> Self {
        self.locator = params;
        self
    }

    pub fn add_road(&mut self, spec: RoadSpec) -> RoadId {
        let id = RoadId(self.roads.len() as u32);
        self.roads.push(spec);
        id
    }

    pub fn add_transit(&mut self, spec: TransitSpec) -> TransitRouteId {
        let id = TransitRouteId(self.transit.len() as u32);
        self.transit.push(spec);
        id
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// # Errors
    ///
    /// Any [`BuilderError`] aborts the whole build.
    pub fn build(self) -> SpatialResult<RoadNetwork> {
        let mut g = GraphParts::default();

        for (i, spec) in self.roads.into_iter().enumerate() {
            g.add_road(RoadId(i as u32), spec)?;
        }

        let junction_idx = RTree::bulk_load(
            g.junctions
                .iter()
                .map(|j| JunctionEntry { point: [j.pos.x, j.pos.y], id: j.id })
                .collect(),
        );

        for (i, spec) in self.transit.into_iter().enumerate() {
            g.add_transit(TransitRouteId(i as u32), spec, &junction_idx)?;
        }

        let segments: Vec<SegmentEntry> = g
            .roads
            .iter()
            .flat_map(|r| {
                r.vertices.windows(2).enumerate().map(move |(i, w)| SegmentEntry {
                    a:       w[0],
                    b:       w[1],
                    road:    r.id,
                    segment: i,
                })
            })
            .collect();
        let segment_idx = RTree::bulk_load(segments);

        info!(
            junctions = g.junctions.len(),
            roads = g.roads.len(),
            edges = g.edges.len(),
            lines = g.lines.len(),
            "road network built"
        );

        Ok(RoadNetwork {
            junctions: g.junctions,
            roads: g.roads,
            edges: g.edges,
            lines: g.lines,
            segment_idx,
            junction_idx,
            locator: self.locator,
            nearest_cache: OnceLock::new(),
        })
    }
}

// ── Build-time state ──────────────────────────────────────────────────────────

#[derive(Default)]
struct GraphParts {
    junctions: Vec<Junction>,
    roads:     Vec<Road>,
    edges:     Vec<NetworkEdge>,
    lines:     Vec<TransitLine>,
    by_coord:  HashMap<Coord, JunctionId>,
}

impl GraphParts {
    fn junction_at(&mut self, pos: Coord) -> JunctionId {
        if let Some(&id) = self.by_coord.get(&pos) {
            return id;
        }
        let id = JunctionId(self.junctions.len() as u32);
        self.junctions.push(Junction { id, pos, roads: Vec::new(), edges: Vec::new() });
        self.by_coord.insert(pos, id);
        id
    }

    fn push_edge(&mut self, mut edge: NetworkEdge) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        edge.id = id;
        self.junctions[edge.a.index()].edges.push(id);
        self.junctions[edge.b.index()].edges.push(id);
        self.edges.push(edge);
        id
    }

    fn add_road(&mut self, id: RoadId, spec: RoadSpec) -> Result<(), BuilderError> {
        let RoadSpec { vertices, modes, major } = spec;
        if vertices.len() < 2 {
            return Err(BuilderError::RoadTooShort { road: id, vertices: vertices.len() });
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(BuilderError::NonFinite { road: id });
        }
        let first = vertices[0];
        let last = vertices[vertices.len() - 1];
        if first == last {
            return Err(BuilderError::SelfLoop { road: id, at: first });
        }

        let start = self.junction_at(first);
        let end = self.junction_at(last);

        let mut cumulative = Vec::with_capacity(vertices.len());
        let mut acc = 0.0;
        cumulative.push(acc);
        for w in vertices.windows(2) {
            acc += w[0].distance(w[1]);
            cumulative.push(acc);
        }

        let edge = self.push_edge(NetworkEdge {
            id: EdgeId::INVALID,
            a: start,
            b: end,
            kind: EdgeKind::Road(id),
            modes,
            major,
            length: acc,
        });

        self.junctions[start.index()].roads.push(id);
        self.junctions[end.index()].roads.push(id);
        self.roads.push(Road {
            id,
            vertices,
            start,
            end,
            modes,
            major,
            length: acc,
            edge,
            cumulative,
        });
        Ok(())
    }

    fn add_transit(
        &mut self,
        id: TransitRouteId,
        spec: TransitSpec,
        junction_idx: &RTree<JunctionEntry>,
    ) -> Result<(), BuilderError> {
        let TransitSpec { name, mode, stations } = spec;
        if stations.len() < 2 {
            return Err(BuilderError::TransitTooShort { route: name });
        }

        let mut resolved = Vec::with_capacity(stations.len());
        for (i, s) in stations.iter().enumerate() {
            match junction_idx.nearest_neighbor(&[s.x, s.y]) {
                Some(e) => resolved.push(e.id),
                None => {
                    return Err(BuilderError::NoJunctionForStation { route: name, station: i });
                }
            }
        }

        for (i, pair) in resolved.windows(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                return Err(BuilderError::TransitSelfLoop { route: name, station: i, junction: a });
            }
            let existing = self.junctions[a.index()]
                .edges
                .iter()
                .copied()
                .find(|&e| self.edges[e.index()].other(a) == b);
            match existing {
                Some(e) => {
                    debug!(route = %name, edge = %e, %mode, "merging transit mode into existing edge");
                    self.edges[e.index()].modes.insert(mode);
                }
                None => {
                    let length = self.junctions[a.index()].pos.distance(self.junctions[b.index()].pos);
                    self.push_edge(NetworkEdge {
                        id: EdgeId::INVALID,
                        a,
                        b,
                        kind: EdgeKind::Transit(id),
                        modes: TransportSet::EMPTY.with(mode),
                        major: false,
                        length,
                    });
                }
            }
        }

        self.lines.push(TransitLine { id, name, mode, stations: resolved });
        Ok(())
    }
}
