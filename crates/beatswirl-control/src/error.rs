//! Error types for the control system
use beatswirl_core::CoreError;
use thiserror::Error;

/// Control system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Rejected parameter, slot, or failed preset persistence
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Background preset writer has shut down
    #[error("Preset writer is no longer running")]
    WriterDisconnected,
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
