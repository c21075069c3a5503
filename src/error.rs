//! Crate-wide error type and result alias.

use std::path::Path;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The organize target does not exist or is not a directory.
    #[error("{path} is not a valid directory")]
    NotADirectory { path: String },

    /// The inventory file does not exist.
    #[error("the file {path} was not found")]
    FileNotFound { path: String },

    /// The inventory file exists but is not valid JSON.
    #[error("could not parse JSON in {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A move target already exists and the conflict policy is `Fail`.
    #[error("destination already exists: {path}")]
    DestinationExists { path: String },

    /// No recorded sessions for the given folder.
    #[error("no history recorded for {path}")]
    NoHistory { path: String },

    /// A session id was requested that the folder history does not contain.
    #[error("session {session_id} not found")]
    SessionNotFound { session_id: String },

    /// History journal problems that are not plain IO (locking, layout).
    #[error("history error: {message}")]
    History { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Watch(#[from] notify::Error),
}

impl AppError {
    pub fn not_a_directory(path: &Path) -> Self {
        Self::NotADirectory {
            path: path.display().to_string(),
        }
    }

    pub fn history(message: impl Into<String>) -> Self {
        Self::History {
            message: message.into(),
        }
    }
}
