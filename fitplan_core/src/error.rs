//! Error types for the fitplan_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitplan_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// A value was rejected before being stored
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Profile is missing fields required for the requested operation
    #[error("Profile is incomplete, missing: {}", .missing.join(", "))]
    IncompleteProfile { missing: Vec<&'static str> },

    /// Non-positive or non-finite body measurement
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// No exercise survived filtering
    #[error("No eligible exercises: {0}")]
    InsufficientExercises(String),

    /// Document not found in the store
    #[error("{collection} document '{id}' not found")]
    NotFound { collection: &'static str, id: String },

    /// Document store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_profile_lists_fields() {
        let err = Error::IncompleteProfile {
            missing: vec!["age", "fitness_goal"],
        };
        assert_eq!(
            err.to_string(),
            "Profile is incomplete, missing: age, fitness_goal"
        );
    }

    #[test]
    fn test_validation_joins_messages() {
        let err = Error::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Validation failed: a; b");
    }
}
