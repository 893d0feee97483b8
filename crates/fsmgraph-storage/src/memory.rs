//! In-memory implementation of [`GraphStore`].
//!
//! [`InMemoryGraphStore`] holds the live project the editor works on. It is
//! the only store the session needs: persistence happens by whole-project
//! save and load, never by incremental writes.

use fsmgraph_core::{AppFile, CoreError, Graph, GraphKey, Project};

use crate::dirty::{DirtyFlag, Persisted};
use crate::error::StorageError;
use crate::traits::GraphStore;

/// A project plus its unsaved-changes flag.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
    project: Project,
    dirty: DirtyFlag,
}

impl InMemoryGraphStore {
    /// An empty, clean store.
    pub fn new() -> Self {
        InMemoryGraphStore::default()
    }

    /// A clean store holding `project`.
    pub fn with_project(project: Project) -> Self {
        InMemoryGraphStore {
            project,
            dirty: DirtyFlag::new(),
        }
    }

    pub fn dirty(&self) -> &DirtyFlag {
        &self.dirty
    }
}

impl GraphStore for InMemoryGraphStore {
    fn project(&self) -> &Project {
        &self.project
    }

    fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    fn add_graph(&mut self, file: AppFile) -> Result<GraphKey, CoreError> {
        let key = self.project.add_file(file)?;
        self.dirty.mark();
        Ok(key)
    }

    fn delete_graph(&mut self, key: &GraphKey) -> Result<AppFile, CoreError> {
        let file = self.project.remove_file(key)?;
        self.dirty.mark();
        Ok(file)
    }

    fn edit_graph<R>(
        &mut self,
        key: &GraphKey,
        edit: impl FnOnce(&mut Graph) -> R,
    ) -> Result<R, CoreError> {
        let graph = self
            .project
            .graph_mut(key)
            .ok_or_else(|| CoreError::GraphNotFound {
                key: key.to_string(),
            })?;
        let result = edit(graph);
        // Any edit that ran counts, including one that returned its own error.
        self.dirty.mark();
        Ok(result)
    }

    fn replace_all(&mut self, project: Project) -> Result<(), StorageError> {
        tracing::debug!(
            files = project.files().len(),
            nodes = project.node_count(),
            "replacing live project"
        );
        self.project = project;
        self.dirty.mark();
        Ok(())
    }

    fn clear_dirty(&mut self, proof: Persisted) {
        self.dirty.clear(proof);
    }
}
