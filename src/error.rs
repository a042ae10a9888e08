//! Error types for the fallible edges of the engine.
//!
//! Rendering itself never fails: faults inside the pixel loop or a landmark
//! search are contained and logged. These types cover configuration loading,
//! worker pool startup, placement oracles and image export.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a [`MagicMapConfig`](crate::config::MagicMapConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors reported by a landmark placement oracle for a single chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandmarkError {
    #[error("landmark generation failed for chunk ({chunk_x}, {chunk_z}): {reason}")]
    Generation {
        chunk_x: i32,
        chunk_z: i32,
        reason: String,
    },
    #[error("landmark search panicked for chunk ({chunk_x}, {chunk_z})")]
    Panicked { chunk_x: i32, chunk_z: i32 },
}

/// Errors raised while writing a rendered map to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("export scale must be at least 1")]
    InvalidScale,
}

/// Errors raised while constructing a [`MagicMapEngine`](crate::engine::MagicMapEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start landmark search workers: {0}")]
    WorkerPool(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
