//! Error types for the turnwright domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for turnwright front ends.
#[derive(Debug, Error)]
pub enum Error {
    // --- Persistence / history errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Turn errors ---
    #[error("Turn failed: {reason}")]
    TurnFailed { reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Terminal I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(message: impl std::fmt::Display) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures reported by the external agents the orchestrator drives.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("{agent} request failed: {reason}")]
    RequestFailed { agent: String, reason: String },
}

impl AgentError {
    pub fn request_failed(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RequestFailed {
            agent: agent.into(),
            reason: reason.into(),
        }
    }
}

/// Misuse of a single-writer stream cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("stream value already finalized")]
    AlreadyDone,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No authenticated user; chat not saved")]
    Unauthorized,

    #[error("Chat not found: {0}")]
    NotFound(String),

    #[error("Chat {0} belongs to another user")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted chat record {chat_id}: {reason}")]
    Corrupted { chat_id: String, reason: String },
}
