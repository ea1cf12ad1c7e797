//! Policy document error types

use thiserror::Error;

/// Errors raised while loading or validating policy documents.
///
/// Evaluation itself never fails; these only surface when an
/// administrator hands the engine a document to check.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Failed to parse JSON policy document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML policy document: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported policy document format: {0}")]
    UnsupportedFormat(String),

    #[error("Policy '{name}' has an empty id")]
    EmptyId { name: String },

    #[error("Duplicate policy id: {0}")]
    DuplicateId(String),

    #[error("Policy '{policy}' references unknown field '{field}'")]
    UnknownField { policy: String, field: String },

    #[error("Policy '{policy}' uses unknown operator '{operator}'")]
    UnknownOperator { policy: String, operator: String },

    #[error("Policy '{policy}' uses unknown action type '{action}'")]
    UnknownAction { policy: String, action: String },

    #[error("Policy '{policy}' has an invalid operand for '{field}': {reason}")]
    InvalidOperand {
        policy: String,
        field: String,
        reason: String,
    },

    #[error("Policy '{policy}' has an invalid regex '{pattern}': {source}")]
    InvalidRegex {
        policy: String,
        pattern: String,
        source: regex::Error,
    },
}

/// Result type for policy document operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
