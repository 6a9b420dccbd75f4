//! Error types for streamtrace.

use glam::UVec3;
use thiserror::Error;

/// The main error type for streamtrace operations.
#[derive(Error, Debug)]
pub enum StreamtraceError {
    /// A grid dimension is zero.
    #[error("grid dimensions must be non-zero, got {0}")]
    EmptyDimensions(UVec3),

    /// The voxel count of the grid does not fit in memory addressing.
    #[error("grid dimensions {0} are too large")]
    DimensionsTooLarge(UVec3),

    /// Sample buffer length does not match the grid dimensions.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Dimensions supplied by a caller disagree with the field's own.
    #[error("dimension mismatch: field is {expected}, caller asked for {actual}")]
    DimensionMismatch { expected: UVec3, actual: UVec3 },

    /// Wrong number of components per voxel for the requested volume kind.
    #[error("invalid number of components per voxel: expected {expected}, got {actual}")]
    InvalidComponents { expected: usize, actual: usize },

    /// Tracer or seeding parameters are out of range.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The volume source could not supply its data.
    #[error("volume load error: {0}")]
    LoadError(String),

    /// The dedicated tracing worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for streamtrace operations.
pub type Result<T> = std::result::Result<T, StreamtraceError>;
