use thiserror::Error;

use nav_core::{Coord, TransportSet};
use nav_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no route from {origin} to {destination} using {modes}")]
    Unreachable {
        origin:      Coord,
        destination: Coord,
        modes:       TransportSet,
    },

    #[error("spatial lookup failed: {0}")]
    Spatial(#[from] SpatialError),
}

pub type RouteResult<T> = Result<T, RouteError>;
