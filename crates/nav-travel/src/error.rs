use nav_core::AgentId;
use nav_route::RouteError;
use nav_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TravelError {
    /// `advance` was called for an agent with nothing left to travel.
    #[error("{agent} has no route to advance along")]
    EmptyRoute { agent: AgentId },

    #[error("{agent}: street leg at waypoint {index} has no road recorded; route: {route}")]
    MissingRoad {
        agent: AgentId,
        index: usize,
        route: String,
    },

    #[error("{0} has not been placed")]
    NotPlaced(AgentId),

    #[error("{0} is riding transit and cannot be rerouted until it gets off")]
    AlreadyInTransit(AgentId),

    #[error("routing failed: {0}")]
    Routing(#[from] RouteError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type TravelResult<T> = Result<T, TravelError>;
