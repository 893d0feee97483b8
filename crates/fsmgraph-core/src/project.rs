//! Project: the file manifest and the graphs it owns.
//!
//! [`Project`] keeps files and graphs in 1:1 correspondence. Adding a file
//! creates its empty graph, removing a file drops its graph, and
//! [`Project::from_parts`] refuses inputs where the two disagree.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::file::AppFile;
use crate::graph::Graph;
use crate::id::GraphKey;

/// All files and graphs of one editor project.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Project {
    /// Files in the order the user created them.
    files: Vec<AppFile>,
    graphs: BTreeMap<GraphKey, Graph>,
}

impl Project {
    pub fn new() -> Self {
        Project::default()
    }

    /// Assembles a project from decoded parts.
    ///
    /// Fails if two files collide, if a file has no graph, or if a graph has
    /// no file.
    pub fn from_parts(
        files: Vec<AppFile>,
        graphs: BTreeMap<GraphKey, Graph>,
    ) -> Result<Self, CoreError> {
        for (i, file) in files.iter().enumerate() {
            validate_name(&file.name)?;
            if files[..i].iter().any(|earlier| earlier.collides_with(file)) {
                return Err(CoreError::DuplicateFile {
                    name: file.name.clone(),
                    file_type: file.file_type,
                });
            }
            if !graphs.contains_key(&file.key()) {
                return Err(CoreError::FileGraphMismatch {
                    key: file.key().to_string(),
                });
            }
        }
        if let Some(orphan) = graphs
            .keys()
            .find(|key| !files.iter().any(|f| &f.key() == *key))
        {
            return Err(CoreError::FileGraphMismatch {
                key: orphan.to_string(),
            });
        }
        Ok(Project { files, graphs })
    }

    pub fn files(&self) -> &[AppFile] {
        &self.files
    }

    pub fn graphs(&self) -> &BTreeMap<GraphKey, Graph> {
        &self.graphs
    }

    pub fn graph(&self, key: &GraphKey) -> Option<&Graph> {
        self.graphs.get(key)
    }

    pub fn graph_mut(&mut self, key: &GraphKey) -> Option<&mut Graph> {
        self.graphs.get_mut(key)
    }

    /// Finds a file that would collide with `file`.
    pub fn find_collision(&self, file: &AppFile) -> Option<&AppFile> {
        self.files.iter().find(|existing| existing.collides_with(file))
    }

    /// Adds a file and its empty graph.
    pub fn add_file(&mut self, file: AppFile) -> Result<GraphKey, CoreError> {
        validate_name(&file.name)?;
        if self.find_collision(&file).is_some() {
            return Err(CoreError::DuplicateFile {
                name: file.name,
                file_type: file.file_type,
            });
        }
        let key = file.key();
        self.graphs.insert(key.clone(), Graph::new());
        self.files.push(file);
        Ok(key)
    }

    /// Removes a file and its graph.
    pub fn remove_file(&mut self, key: &GraphKey) -> Result<AppFile, CoreError> {
        let index = self
            .files
            .iter()
            .position(|f| &f.key() == key)
            .ok_or_else(|| CoreError::GraphNotFound {
                key: key.to_string(),
            })?;
        self.graphs.remove(key);
        Ok(self.files.remove(index))
    }

    /// Total node count across all graphs.
    pub fn node_count(&self) -> usize {
        self.graphs.values().map(Graph::len).sum()
    }

    pub fn into_parts(self) -> (Vec<AppFile>, BTreeMap<GraphKey, Graph>) {
        (self.files, self.graphs)
    }
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::InvalidFileName {
            name: name.to_string(),
        });
    }
    Ok(())
}
