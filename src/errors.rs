//! Error types shared by every stage of the position pipeline

use crate::time::TimeError;
use thiserror::Error;

/// Main error type for the skypath library
#[derive(Debug, Error)]
pub enum SkypathError {
    /// Light-time iteration did not settle within its pass budget
    #[error(
        "light-travel time failed to converge after {iterations} iterations \
         (largest change {max_delta_days:e} days)"
    )]
    Convergence {
        iterations: usize,
        max_delta_days: f64,
    },

    #[error("Invalid time: {0}")]
    InvalidTime(#[from] TimeError),

    /// A quantity was asked for in units inconsistent with its kind
    #[error("Unit mismatch: {0}")]
    UnitMismatch(String),

    #[error("Geometry precondition failed: {0}")]
    GeometryPrecondition(String),

    /// Failure reported by an ephemeris source
    #[error("Ephemeris error: {0}")]
    Ephemeris(String),

    /// Failure reported by a satellite propagator
    #[error("Propagation error: {0}")]
    Propagation(String),

    /// A nutation coefficient table could not be read
    #[error("Nutation table error: {0}")]
    NutationTable(String),

    #[error("Series length mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Result type for skypath operations
pub type Result<T> = std::result::Result<T, SkypathError>;
