#![forbid(unsafe_code)]

//! Error types.
//!
//! Nothing in the solver is fatal. Sizing requests that cannot be honored
//! are rejected with [`SizesError`] and leave state untouched; config files
//! that cannot be read surface as [`ConfigError`].

use thiserror::Error;

use crate::config::SizeUnit;

/// Why a batch of visible-area sizes was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizesError {
    #[error("expected {expected} sizes (one per displayed area), got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("sizes are not valid for {} unit", .unit.as_str())]
    InvalidForUnit { unit: SizeUnit },
}

/// Failure to load a [`SplitConfig`](crate::config::SplitConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config")]
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "config")]
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}
