use std::path::PathBuf;

/// Errors raised while handing records to a sink
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Temporary archive could not be moved into place
    #[error("Failed to persist archive: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Two different records of one batch map to the same entry
    #[error("Entry '{file_name}' is produced by more than one record")]
    DuplicateEntry {
        /// Shared archive file name
        file_name: String,
    },

    /// An entry with different content already exists
    #[error("Entry '{}' already exists with different content", path.display())]
    Conflict {
        /// Existing entry
        path: PathBuf,
    },
}
