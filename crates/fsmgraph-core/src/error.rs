//! Core error types for fsmgraph-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! the failure modes of the in-memory project model.

use thiserror::Error;

use crate::id::FileType;

/// Core errors produced by the fsmgraph-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A file with the same name (compared case-insensitively) and type
    /// already exists in the project.
    #[error("duplicate file: a {file_type} file named '{name}' already exists")]
    DuplicateFile { name: String, file_type: FileType },

    /// A file name was empty or otherwise unusable as a graph key.
    #[error("invalid file name: '{name}'")]
    InvalidFileName { name: String },

    /// No graph is registered under the given key.
    #[error("graph not found: {key}")]
    GraphNotFound { key: String },

    /// A string could not be parsed as `<type>/<name>`.
    #[error("invalid graph key '{key}': {reason}")]
    InvalidGraphKey { key: String, reason: String },

    /// Two nodes in the same graph share an id.
    #[error("duplicate node id: '{id}'")]
    DuplicateNodeId { id: String },

    /// Files and graphs are not in 1:1 correspondence.
    #[error("file/graph mismatch: {key}")]
    FileGraphMismatch { key: String },
}
