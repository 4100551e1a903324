//! Error types for batch renaming.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rename planning and execution.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Key-value file {path}, line {line}: {message}")]
    KvFile {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sequence numbers exhausted: {{nr}} cannot go past {}", u64::MAX)]
    SequenceExhausted,

    #[error("{errors} error(s) found, nothing renamed")]
    PlanRejected { errors: usize },

    #[error("Failed to rename {} -> {}: {source}", source_path.display(), target.display())]
    Execution {
        source_path: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Undo stopped after {undone} record(s): {failed} failed")]
    Undo { failed: usize, undone: usize },

    #[error("Malformed undo log at line {line}: {content}")]
    UndoLogCorrupt { line: usize, content: String },
}

/// A specialized Result type for rename operations.
pub type Result<T> = std::result::Result<T, RenameError>;
