//! Animation error types

use thiserror::Error;

/// Errors returned when registering a task with the driver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// Duration was zero, negative or not finite
    #[error("task duration must be positive and finite, got {0}")]
    InvalidDuration(f64),

    /// Delay was negative or not finite
    #[error("task delay must be non-negative and finite, got {0}")]
    InvalidDelay(f64),
}

/// Errors a sink may report while writing a frame.
///
/// The driver logs these and keeps ticking; they never abort a frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SinkError {
    /// The element the sink writes to no longer exists
    #[error("sink target detached: {0}")]
    Detached(&'static str),

    /// Generic sink failure
    #[error("sink failed: {0}")]
    Other(String),
}

/// Result type for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;
