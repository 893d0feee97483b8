//! The user-facing file that owns a graph.

use serde::{Deserialize, Serialize};

use crate::id::{FileType, GraphKey};

/// A script file as listed in the project manifest.
///
/// Serialized as `{ "name": ..., "type": "client" | "server" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFile {
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

impl AppFile {
    pub fn new(name: impl Into<String>, file_type: FileType) -> Self {
        AppFile {
            name: name.into(),
            file_type,
        }
    }

    pub fn client(name: impl Into<String>) -> Self {
        AppFile::new(name, FileType::Client)
    }

    pub fn server(name: impl Into<String>) -> Self {
        AppFile::new(name, FileType::Server)
    }

    /// The key of the graph this file owns.
    pub fn key(&self) -> GraphKey {
        GraphKey::new(self.file_type, self.name.clone())
    }

    /// Returns `true` if `other` names the same file: same type, and names
    /// equal ignoring case.
    pub fn collides_with(&self, other: &AppFile) -> bool {
        self.file_type == other.file_type && self.name.to_lowercase() == other.name.to_lowercase()
    }
}
