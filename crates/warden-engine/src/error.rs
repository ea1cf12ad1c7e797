//! Engine error types

use thiserror::Error;

/// Errors raised when constructing an engine.
///
/// Evaluation never fails once an engine exists.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine configuration violates one of its invariants.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
