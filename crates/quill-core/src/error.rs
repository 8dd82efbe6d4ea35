use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuillError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Keyboard controller error: {0}")]
    Enigo(String),
    #[error("Clipboard error: {0}")]
    Clipboard(String),
    #[error("Database not found at: {0}")]
    DatabaseNotFound(String),
    #[error("Daemon already running with PID {0}")]
    DaemonAlreadyRunning(u32),
    #[error("Daemon is not running")]
    DaemonNotRunning,
    #[error("Invalid PID in daemon file")]
    InvalidPid,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Snippet not found: {0}")]
    SnippetNotFound(String),
    #[error("Error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, QuillError>;
