//! Error types for the routing RL crates

use thiserror::Error;

/// Core error type for RL operations
#[derive(Error, Debug)]
pub enum RlError {
    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(String),

    /// Agent-related errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// Invalid action index
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Replay memory holds fewer transitions than a sample requires
    #[error("Insufficient replay data: {requested} requested, {available} available")]
    InsufficientData {
        /// Batch size the caller asked for
        requested: usize,
        /// Transitions currently stored
        available: usize,
    },

    /// The exploration draw found no accessible action in the state
    #[error("No feasible action in the current state")]
    NoFeasibleAction,

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for RL operations
pub type Result<T> = std::result::Result<T, RlError>;
