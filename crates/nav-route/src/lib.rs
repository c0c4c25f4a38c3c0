//! `nav-route` — turning origin/destination pairs into routes.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`route`]    | `Route`, `Waypoint`, `Leg`, `LegKind`                           |
//! | [`weight`]   | `edge_weight` — the pure `(edge, modes) → cost` function        |
//! | [`planner`]  | `RoutePlanner` trait, `Planner` enum, `FixedDelayPlanner`       |
//! | [`network`]  | `NetworkPlanner` — street + transit graph with access legs      |
//! | [`grid`]     | `GridPlanner` — grid towns, junction-to-junction                |
//! | [`cache`]    | `RouteCache<P>` — shared route and distance memoisation         |
//! | [`bullseye`] | `BullsEyeSearch` — orbiting search routes around a target       |
//! | [`error`]    | `RouteError`, `RouteResult<T>`                                  |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | `RouteCache::prefetch` plans keys on the Rayon pool.      |
//! | `fx-hash`  | FxHash instead of SipHash for the cache maps.             |

pub mod bullseye;
pub mod cache;
pub mod error;
pub mod grid;
pub mod network;
pub mod planner;
pub mod route;
pub mod weight;

mod dijkstra;


pub use bullseye::BullsEyeSearch;
pub use cache::{CacheStats, DistanceKey, RouteCache, RouteKey};
pub use error::{RouteError, RouteResult};
pub use grid::GridPlanner;
pub use network::NetworkPlanner;
pub use planner::{FixedDelayPlanner, Planner, RoutePlanner};
pub use route::{Leg, LegKind, Route, Waypoint};
pub use weight::edge_weight;
