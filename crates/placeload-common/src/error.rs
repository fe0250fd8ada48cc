//! Error types for placeload

use thiserror::Error;

/// Exit code for a fatal error (configuration, input, store or checkpoint).
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for a run stopped by an operator interrupt.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Result type alias for placeload operations
pub type Result<T> = std::result::Result<T, PlaceloadError>;

/// Main error type for placeload
#[derive(Error, Debug)]
pub enum PlaceloadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: u64, message: String },

    #[error("Record at line {line} has {len} columns, column {index} is required")]
    MissingColumn { line: u64, index: usize, len: usize },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Checkpoint key {key:?} was not found in {input}")]
    StaleCheckpoint { key: String, input: String },
}

impl PlaceloadError {
    /// Short category name used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PlaceloadError::Config(_) => "config",
            PlaceloadError::Io(_)
            | PlaceloadError::MalformedInput { .. }
            | PlaceloadError::MissingColumn { .. } => "input",
            PlaceloadError::Store(_) => "sink",
            PlaceloadError::Checkpoint(_) | PlaceloadError::StaleCheckpoint { .. } => "checkpoint",
        }
    }

    /// Process exit code for this error.
    ///
    /// The binary maps every fatal error through here. All of them are
    /// currently [`EXIT_FAILURE`]; interrupted runs are not errors and exit
    /// with [`EXIT_INTERRUPTED`] from the run outcome instead.
    pub fn exit_code(&self) -> u8 {
        match self {
            PlaceloadError::Io(_)
            | PlaceloadError::Config(_)
            | PlaceloadError::MalformedInput { .. }
            | PlaceloadError::MissingColumn { .. }
            | PlaceloadError::Store(_)
            | PlaceloadError::Checkpoint(_)
            | PlaceloadError::StaleCheckpoint { .. } => EXIT_FAILURE,
        }
    }
}
