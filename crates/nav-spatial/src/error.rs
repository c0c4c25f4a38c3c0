//! Spatial-subsystem error types.

use thiserror::Error;

use nav_core::{Coord, JunctionId, RoadId};

/// Malformed input rejected while building the network.  Always fatal:
/// the builder never produces a partial graph.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("road {road} has {vertices} vertices; at least 2 are required")]
    RoadTooShort { road: RoadId, vertices: usize },

    #[error("road {road} starts and ends at the same point {at}")]
    SelfLoop { road: RoadId, at: Coord },

    #[error("road {road} has a non-finite vertex")]
    NonFinite { road: RoadId },

    #[error("transit route {route:?} has fewer than 2 stations")]
    TransitTooShort { route: String },

    #[error("transit route {route:?}: station {station} has no junction to snap to")]
    NoJunctionForStation { route: String, station: usize },

    #[error("transit route {route:?}: station {station} and the next one both snap to {junction}")]
    TransitSelfLoop { route: String, station: usize, junction: JunctionId },
}

/// Errors produced by `nav-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("network build failed: {0}")]
    Builder(#[from] BuilderError),

    #[error("no road within {radius} of {coord} after {attempts} attempts")]
    NoRoadFound { coord: Coord, attempts: u32, radius: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
