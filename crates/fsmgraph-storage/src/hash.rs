//! Content digests of saved projects.
//!
//! The digest covers `files` and `graphs` but not `projectMetadata`, so two
//! saves of the same unchanged project hash equal even though their
//! `savedAt` differs.

use std::collections::BTreeMap;

use fsmgraph_core::AppFile;

use crate::error::StorageError;
use crate::types::{EncodedGraph, ProjectSaveData};

/// Hashes the durable content of a project.
pub fn content_digest(
    files: &[AppFile],
    graphs: &BTreeMap<String, EncodedGraph>,
) -> Result<blake3::Hash, StorageError> {
    let mut hasher = blake3::Hasher::new();
    serde_json::to_writer(&mut hasher, &(files, graphs))?;
    Ok(hasher.finalize())
}

impl ProjectSaveData {
    /// See [`content_digest`].
    pub fn content_digest(&self) -> Result<blake3::Hash, StorageError> {
        content_digest(&self.files, &self.graphs)
    }
}
