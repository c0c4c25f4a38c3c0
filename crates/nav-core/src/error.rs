//! Core error type.
//!
//! Sub-crates define their own error enums; this one only covers what
//! `nav-core` itself can fail on (configuration validation).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `nav-core`.
pub type NavResult<T> = Result<T, NavError>;
