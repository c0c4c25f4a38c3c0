//! `nav-spatial` — the street/transit graph, the nearest-road locator, and
//! the on-disk cache plumbing they share.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`network`] | `RoadNetwork`, `Junction`, `Road`, `NetworkEdge`, `TransitLine` |
//! | [`builder`] | `NetworkBuilder`, `RoadSpec`, `TransitSpec`                     |
//! | [`locator`] | `Snap`, `LocatorParams`, `NearestRoadCache`                     |
//! | [`store`]   | `CacheStore`, `JsonFileStore`, `Fingerprint`, `load_or_build`   |
//! | [`error`]   | `BuilderError`, `SpatialError`, `SpatialResult<T>`              |
//!
//! The network is built once and is read-only afterwards.  The only later
//! mutation is installing a pre-computed [`NearestRoadCache`], which happens
//! at most once behind a `OnceLock`.

pub mod builder;
pub mod error;
pub mod locator;
pub mod network;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::{NetworkBuilder, RoadSpec, TransitSpec};
pub use error::{BuilderError, SpatialError, SpatialResult};
pub use locator::{LocatorParams, NearestRoadCache, Snap};
pub use network::{EdgeKind, Junction, NetworkEdge, Road, RoadNetwork, TransitLine};
pub use store::{
    CacheStatus, CacheStore, Fingerprint, JsonFileStore, NoStore, SourceStamp, load_or_build,
};
