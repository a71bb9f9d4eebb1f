//! Core domain errors.

use thiserror::Error;

/// Validation errors raised before anything is sent to the platform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Job name not in the known job set.
    #[error("Unknown job name '{0}'. Available jobs: crow, falcon, owl, phoenix")]
    InvalidJobName(String),

    /// Query text is empty or whitespace only.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// Task identifier to continue from is empty.
    #[error("Previous task ID must not be empty")]
    EmptyTaskId,

    /// Agent configuration value out of range.
    #[error("Invalid agent configuration: {0}")]
    InvalidConfig(String),
}
