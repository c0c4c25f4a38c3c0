//! Road/transit network representation.
//!
//! # Data layout
//!
//! Junctions, roads, edges and transit lines live in dense `Vec`s indexed by
//! their typed ids.  Edges are **undirected**: each stores its two end
//! junctions `a`/`b` and appears in both junctions' incidence lists.  A road
//! owns exactly one road-backed edge; a transit line owns one transit-backed
//! edge per consecutive station pair, unless that pair was already joined by
//! an edge, in which case the line's mode was merged into it.
//!
//! # Spatial indexes
//!
//! Two R-trees (via `rstar`) are bulk-loaded at build time:
//!
//! - road segments, for the nearest-road locator;
//! - junction positions, for station snapping and the grid planner.

use std::sync::OnceLock;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use nav_core::{
    Coord, EdgeId, JunctionId, MAJOR_ROAD_ADVANTAGE, RoadId, TransitRouteId, TransportMode,
    TransportSet,
};

use crate::locator::{LocatorParams, NearestRoadCache, Snap};

// ── R-tree entries ────────────────────────────────────────────────────────────

/// One straight piece of a road polyline.
#[derive(Clone, Debug)]
pub(crate) struct SegmentEntry {
    pub(crate) a:       Coord,
    pub(crate) b:       Coord,
    pub(crate) road:    RoadId,
    pub(crate) segment: usize,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.a.x, self.a.y], [self.b.x, self.b.y])
    }
}

#[derive(Clone, Debug)]
pub(crate) struct JunctionEntry {
    pub(crate) point: [f64; 2],
    pub(crate) id:    JunctionId,
}

impl RTreeObject for JunctionEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for JunctionEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Graph elements ────────────────────────────────────────────────────────────

/// A graph vertex at a road end-point.
#[derive(Clone, Debug)]
pub struct Junction {
    pub id:    JunctionId,
    pub pos:   Coord,
    /// Roads that start or end here, in input order.
    pub roads: Vec<RoadId>,
    /// Incident edges in creation order (road edges first, then transit).
    pub edges: Vec<EdgeId>,
}

/// A road polyline between two junctions.
#[derive(Clone, Debug)]
pub struct Road {
    pub id:       RoadId,
    pub vertices: Vec<Coord>,
    pub start:    JunctionId,
    pub end:      JunctionId,
    /// Modes allowed on this road.
    pub modes:    TransportSet,
    pub major:    bool,
    pub length:   f64,
    /// The road-backed edge carrying this road.
    pub edge:     EdgeId,
    /// `cumulative[i]` = polyline length from `vertices[0]` to `vertices[i]`.
    pub(crate) cumulative: Vec<f64>,
}

impl Road {
    /// The junction at the other end from `j`.
    #[inline]
    pub fn other_end(&self, j: JunctionId) -> JunctionId {
        if j == self.start { self.end } else { self.start }
    }

    /// Distance along the polyline from `vertices[0]` to the snapped point.
    pub fn offset_of(&self, snap: &Snap) -> f64 {
        self.cumulative[snap.segment] + self.vertices[snap.segment].distance(snap.point)
    }

    /// Distance along the road from the snapped point to end junction `j`.
    pub fn distance_to(&self, snap: &Snap, j: JunctionId) -> f64 {
        let offset = self.offset_of(snap);
        if j == self.start { offset } else { self.length - offset }
    }

    /// Points from the snapped point to junction `j`, following the road.
    pub fn walk_to(&self, snap: &Snap, j: JunctionId) -> Vec<Coord> {
        let mut out = vec![snap.point];
        if j == self.start {
            out.extend(self.vertices[..=snap.segment].iter().rev());
        } else {
            out.extend(&self.vertices[snap.segment + 1..]);
        }
        out
    }

    /// Points from junction `j` to the snapped point, following the road.
    pub fn walk_from(&self, j: JunctionId, snap: &Snap) -> Vec<Coord> {
        let mut out = self.walk_to(snap, j);
        out.reverse();
        out
    }

    /// Points between two snapped points on this road.
    pub fn walk_between(&self, from: &Snap, to: &Snap) -> Vec<Coord> {
        if self.offset_of(from) > self.offset_of(to) {
            let mut out = self.walk_between(to, from);
            out.reverse();
            return out;
        }
        let mut out = vec![from.point];
        if to.segment > from.segment {
            out.extend(&self.vertices[from.segment + 1..=to.segment]);
        }
        out.push(to.point);
        out
    }

    /// All vertices, oriented so the walk starts at junction `from`.
    pub fn vertices_from(&self, from: JunctionId) -> Vec<Coord> {
        let mut out = self.vertices.clone();
        if from != self.start {
            out.reverse();
        }
        out
    }
}

/// What an edge is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    Road(RoadId),
    Transit(TransitRouteId),
}

/// An undirected connection between two distinct junctions.
#[derive(Clone, Debug)]
pub struct NetworkEdge {
    pub id:     EdgeId,
    pub a:      JunctionId,
    pub b:      JunctionId,
    pub kind:   EdgeKind,
    /// Every mode that may traverse this edge.
    pub modes:  TransportSet,
    pub major:  bool,
    /// Geometric length (polyline length, or station-to-station distance).
    pub length: f64,
}

impl NetworkEdge {
    #[inline]
    pub fn other(&self, j: JunctionId) -> JunctionId {
        if j == self.a { self.b } else { self.a }
    }

    #[inline]
    pub fn road(&self) -> Option<RoadId> {
        match self.kind {
            EdgeKind::Road(r) => Some(r),
            EdgeKind::Transit(_) => None,
        }
    }

    /// Speed multiplier for `mode` on this edge; `None` if `mode` may not use it.
    pub fn multiplier(&self, mode: TransportMode) -> Option<f64> {
        if !self.modes.contains(mode) {
            return None;
        }
        let base = mode.multiplier();
        Some(if mode == TransportMode::Car && self.major {
            base * MAJOR_ROAD_ADVANTAGE
        } else {
            base
        })
    }

    /// The fastest mode from `available` usable on this edge, with its
    /// multiplier.  `None` if the agent cannot use the edge at all.
    pub fn best_mode(&self, available: TransportSet) -> Option<(TransportMode, f64)> {
        available
            .intersection(self.modes)
            .iter()
            .filter_map(|m| self.multiplier(m).map(|x| (m, x)))
            .fold(None, |best, (m, x)| match best {
                Some((_, bx)) if bx >= x => best,
                _ => Some((m, x)),
            })
    }
}

/// A named bus or train line.
#[derive(Clone, Debug)]
pub struct TransitLine {
    pub id:       TransitRouteId,
    pub name:     String,
    pub mode:     TransportMode,
    /// Junctions the stations snapped to, in travel order.
    pub stations: Vec<JunctionId>,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// The read-only street + transit graph.  Build with
/// [`NetworkBuilder`][crate::NetworkBuilder].
#[derive(Debug)]
pub struct RoadNetwork {
    pub junctions: Vec<Junction>,
    pub roads:     Vec<Road>,
    pub edges:     Vec<NetworkEdge>,
    pub lines:     Vec<TransitLine>,

    pub(crate) segment_idx:   RTree<SegmentEntry>,
    pub(crate) junction_idx:  RTree<JunctionEntry>,
    pub(crate) locator:       LocatorParams,
    pub(crate) nearest_cache: OnceLock<NearestRoadCache>,
}

impl RoadNetwork {
    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    #[inline]
    pub fn junction(&self, id: JunctionId) -> &Junction {
        &self.junctions[id.index()]
    }

    #[inline]
    pub fn road(&self, id: RoadId) -> &Road {
        &self.roads[id.index()]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &NetworkEdge {
        &self.edges[id.index()]
    }

    /// Edges incident to `j`, in creation order.
    #[inline]
    pub fn incident_edges(&self, j: JunctionId) -> &[EdgeId] {
        &self.junctions[j.index()].edges
    }

    /// The first edge joining `a` and `b` in either orientation.
    pub fn edge_between(&self, a: JunctionId, b: JunctionId) -> Option<EdgeId> {
        self.incident_edges(a)
            .iter()
            .copied()
            .find(|&e| self.edge(e).other(a) == b)
    }

    /// Every junction tied for nearest to `pos`, in ascending id order.
    pub fn nearest_junctions(&self, pos: Coord) -> Vec<JunctionId> {
        let query = [pos.x, pos.y];
        let mut iter = self
            .junction_idx
            .nearest_neighbor_iter(&query)
            .map(|e| (e, e.distance_2(&query)));
        let Some((first, best)) = iter.next() else {
            return Vec::new();
        };
        let tolerance = best * 1e-9 + 1e-12;
        let mut out = vec![first.id];
        out.extend(iter.take_while(|(_, d2)| *d2 <= best + tolerance).map(|(e, _)| e.id));
        out.sort_unstable();
        out
    }
}
