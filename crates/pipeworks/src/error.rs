//! Application errors.

use std::path::PathBuf;

use pipeworks_core::SimError;
use pipeworks_rendering::{MeshError, RenderError};
use thiserror::Error;

/// Errors surfaced by the application layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`AppConfig`](crate::AppConfig).
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Simulation failure, including invalid `[world]` values.
    #[error(transparent)]
    Simulation(#[from] SimError),

    /// Render failure, including invalid `[render]` values.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Mesh generation failure.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Bad command-line usage.
    #[error("{0}")]
    Usage(String),
}

/// Result type for the application layer.
pub type AppResult<T> = Result<T, AppError>;
