//! Storage error types for fsmgraph-storage.
//!
//! [`StorageError`] separates the load failure categories (I/O, malformed
//! text, structural validation) from save failures (serialization, emit) so
//! callers can report each with its own message. [`ValidationError`] names
//! the specific schema violation found in a decoded document.

use fsmgraph_core::FileType;
use thiserror::Error;

/// A decoded document does not match the save-file schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The top-level value is not an object.
    #[error("project file must be an object, found {found}")]
    NotAnObject { found: &'static str },

    /// `projectMetadata` is missing or falsy.
    #[error("projectMetadata is missing")]
    MissingMetadata,

    /// `projectMetadata` is present but not an object.
    #[error("projectMetadata must be an object, found {found}")]
    MetadataNotObject { found: &'static str },

    /// `projectMetadata` has fields of the wrong type.
    #[error("projectMetadata is invalid: {reason}")]
    InvalidMetadata { reason: String },

    /// `files` is missing or not an array.
    #[error("files must be an array, found {found}")]
    FilesNotSequence { found: &'static str },

    /// `graphs` is missing, an array, null, or otherwise not an object.
    #[error("graphs must be an object, found {found}")]
    GraphsNotMapping { found: &'static str },

    /// An entry of `files` is not a valid file.
    #[error("files[{index}] is invalid: {reason}")]
    InvalidFile { index: usize, reason: String },

    /// An entry of `graphs` is not a valid encoded graph.
    #[error("graph '{key}' is invalid: {reason}")]
    InvalidGraph { key: String, reason: String },

    /// A key of `graphs` is not of the form `<type>/<name>`.
    #[error("graph key '{key}' is invalid: {reason}")]
    InvalidGraphKey { key: String, reason: String },

    /// Two files collide (same type, names equal ignoring case).
    #[error("duplicate file: {file_type} file '{name}' is listed more than once")]
    DuplicateFile { name: String, file_type: FileType },

    /// Two nodes in one graph share an id.
    #[error("graph '{key}' has duplicate node id '{id}'")]
    DuplicateNodeId { key: String, id: String },

    /// A graph has no matching entry in `files`.
    #[error("graph '{key}' has no matching file")]
    OrphanGraph { key: String },
}

/// Errors produced by save and load operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The input text is not well-formed JSON.
    #[error("malformed project file: {0}")]
    Parse(#[source] serde_json::Error),

    /// The input was read but is not UTF-8 text.
    #[error("malformed project file '{path}': {source}")]
    Encoding {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The input could not be read.
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document does not match the save-file schema.
    #[error("invalid project structure: {0}")]
    Validation(#[from] ValidationError),

    /// The project could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The serialized project could not be handed to the download sink.
    #[error("could not write '{filename}': {source}")]
    Emit {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// The graph store refused to adopt a decoded project.
    #[error("graph store rejected the project: {reason}")]
    Store { reason: String },
}

impl StorageError {
    /// Returns `true` for failures caused by the input document (parse or
    /// validation) rather than by the environment.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            StorageError::Parse(_) | StorageError::Encoding { .. } | StorageError::Validation(_)
        )
    }
}
