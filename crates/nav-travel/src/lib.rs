//! `nav-travel` — moving agents along planned routes, tick by tick.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`state`]     | `TravelState` — position, current leg, transit lock flags       |
//! | [`store`]     | `TravelStore` — `Vec<TravelState>` + sparse remaining routes    |
//! | [`engine`]    | `TravelEngine<P>` — begin travel, `advance`, per-tick `tick`    |
//! | [`awareness`] | `AwarenessSink`, `FeatureIndex` — roads → buildings/communities |
//! | [`error`]     | `TravelError`, `TravelResult<T>`                                |
//!
//! # Movement model
//!
//! Each tick an agent gets a fixed walking-pace budget.  Distance to the
//! next waypoint is divided by the current leg's multiplier, so a car leg
//! (×5) covers five times the ground for the same budget.  Whole waypoints
//! are consumed while the budget lasts; the remainder moves the agent
//! partway along the straight line to the next one.
//!
//! Boarding a bus or train locks the agent: it stops reporting roads and
//! cannot be rerouted.  A release request is honoured at the next transit
//! stop, never between stops.

pub mod awareness;
pub mod engine;
pub mod error;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use awareness::{AwarenessLog, AwarenessSink, FeatureIndex, NoopSink, RoadFeatures};
pub use engine::{AdvanceOutcome, TickSummary, TravelEngine};
pub use error::{TravelError, TravelResult};
pub use state::TravelState;
pub use store::TravelStore;
