//! Error types for pickfun

use thiserror::Error;

/// Result type alias for checkpoint operations
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Error types for checkpoint operations
///
/// None of these ever reach the caller of a checkpointed function; the
/// wrapper turns them into warnings and falls back to plain execution.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Checkpoint file exists but could not be opened or decoded
    #[error("Cannot load checkpoint '{path}': {reason}")]
    Load { path: String, reason: String },

    /// Checkpoint file could not be created or written
    #[error("Cannot store checkpoint '{path}': {reason}")]
    Store { path: String, reason: String },

    /// Payload could not be serialized or deserialized
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// File content is not a checkpoint envelope
    #[error("Invalid checkpoint format: {0}")]
    Format(String),

    /// Current working directory could not be resolved
    #[error("Cannot resolve current directory: {0}")]
    CurrentDir(String),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
