//! `nav-core` — foundational types for the `nav` routing engine.
//!
//! Every other `nav-*` crate depends on this one.  It has no `nav-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `JunctionId`, `RoadId`, `EdgeId`, `FeatureId`, `TransitRouteId` |
//! | [`geo`]         | `Coord`, segment projection, bearing and angle helpers     |
//! | [`transport`]   | `TransportMode`, `TransportSet`                            |
//! | [`config`]      | `NavConfig`, `PlannerKind`                                 |
//! | [`rng`]         | `AgentRng` (per-agent, deterministic)                      |
//! | [`error`]       | `NavError`, `NavResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{NavConfig, PlannerKind};
pub use error::{NavError, NavResult};
pub use geo::Coord;
pub use ids::{AgentId, EdgeId, FeatureId, JunctionId, RoadId, TransitRouteId};
pub use rng::AgentRng;
pub use transport::{MAJOR_ROAD_ADVANTAGE, TransportMode, TransportSet};
