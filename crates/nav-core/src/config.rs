//! Engine configuration.
//!
//! Typically loaded from a TOML file by the application and handed to the
//! network builder, planner and travel engine.  Every field has a default so
//! a config file only needs to list what it overrides.

use std::path::PathBuf;

use crate::{NavError, NavResult};

/// Which route planner variant to construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum PlannerKind {
    /// Street + transit graph with off-network access legs.
    #[default]
    Network,
    /// Grid town: every road cell is a junction.
    Grid,
    /// No geometry: every journey takes `ticks` advances.
    FixedDelay { ticks: u32 },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Walking-pace distance an agent may cover per tick.
    pub travel_per_tick: f64,

    /// Initial half-width of the nearest-road search window.
    pub search_radius: f64,

    /// How many times the search window may double before giving up.
    pub max_search_attempts: u32,

    /// Bulls-eye routes stop once their length reaches
    /// `ticks * travel_per_tick * bullseye_overshoot`.
    pub bullseye_overshoot: f64,

    pub planner: PlannerKind,

    /// Directory for persisted caches.  `None` disables persistence.
    pub cache_dir: Option<PathBuf>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            travel_per_tick:     120.0,
            search_radius:       20.0,
            max_search_attempts: 10,
            bullseye_overshoot:  1.1,
            planner:             PlannerKind::Network,
            cache_dir:           None,
        }
    }
}

impl NavConfig {
    pub fn validate(&self) -> NavResult<()> {
        if !(self.travel_per_tick > 0.0) {
            return Err(NavError::Config(format!(
                "travel_per_tick must be positive, got {}",
                self.travel_per_tick
            )));
        }
        if !(self.search_radius > 0.0) {
            return Err(NavError::Config(format!(
                "search_radius must be positive, got {}",
                self.search_radius
            )));
        }
        if self.max_search_attempts == 0 {
            return Err(NavError::Config("max_search_attempts must be at least 1".into()));
        }
        if !(self.bullseye_overshoot >= 1.0) {
            return Err(NavError::Config(format!(
                "bullseye_overshoot must be >= 1, got {}",
                self.bullseye_overshoot
            )));
        }
        if let PlannerKind::FixedDelay { ticks: 0 } = self.planner {
            return Err(NavError::Config("fixed_delay planner needs ticks >= 1".into()));
        }
        Ok(())
    }
}
