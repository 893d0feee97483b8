//! Project load decoding and structural validation.
//!
//! Loading runs in three steps, each with its own failure category:
//!
//! 1. [`parse_document`]: text → JSON value ([`StorageError::Parse`]).
//! 2. [`validate_document`]: shape checks on the value, then typed decoding
//!    of each part ([`StorageError::Validation`]).
//! 3. [`decode_project`]: schema document → complete live [`Project`]
//!    (also [`StorageError::Validation`]).
//!
//! Nothing here touches a graph store; the caller swaps the finished project
//! in as a whole.

use std::collections::BTreeMap;

use fsmgraph_core::{AppFile, Graph, GraphKey, Project};
use serde_json::{Map, Value};

use crate::convert::decode_graph;
use crate::error::{StorageError, ValidationError};
use crate::types::{EncodedGraph, ProjectMetadata, ProjectSaveData};
use crate::writer::{APP_NAME, APP_VERSION};

/// A project rebuilt from a save file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedProject {
    pub project: Project,
    pub metadata: ProjectMetadata,
    /// Node fields skipped because they are not on the allow-list.
    pub dropped_fields: usize,
    /// Files listed without a graph; each got an empty one.
    pub synthesized_graphs: Vec<GraphKey>,
}

/// Parses raw text into a JSON value.
pub fn parse_document(text: &str) -> Result<Value, StorageError> {
    serde_json::from_str(text).map_err(StorageError::Parse)
}

/// Checks a parsed value against the save-file schema and decodes it.
///
/// Shape checks run first, in document order: `projectMetadata` must be a
/// truthy object, `files` an array, and `graphs` an object.
pub fn validate_document(value: Value) -> Result<ProjectSaveData, StorageError> {
    let mut root = match value {
        Value::Object(root) => root,
        other => {
            return Err(ValidationError::NotAnObject {
                found: json_type(&other),
            }
            .into())
        }
    };

    let metadata = root.remove("projectMetadata").unwrap_or(Value::Null);
    if !is_truthy(&metadata) {
        return Err(ValidationError::MissingMetadata.into());
    }
    if !metadata.is_object() {
        return Err(ValidationError::MetadataNotObject {
            found: json_type(&metadata),
        }
        .into());
    }

    let files = match root.remove("files") {
        Some(Value::Array(files)) => files,
        other => {
            return Err(ValidationError::FilesNotSequence {
                found: found(other.as_ref()),
            }
            .into())
        }
    };

    let graphs = match root.remove("graphs") {
        Some(Value::Object(graphs)) => graphs,
        other => {
            return Err(ValidationError::GraphsNotMapping {
                found: found(other.as_ref()),
            }
            .into())
        }
    };

    let project_metadata: ProjectMetadata = serde_json::from_value(metadata).map_err(|e| {
        ValidationError::InvalidMetadata {
            reason: e.to_string(),
        }
    })?;

    let files = files
        .into_iter()
        .enumerate()
        .map(|(index, file)| {
            serde_json::from_value::<AppFile>(file).map_err(|e| ValidationError::InvalidFile {
                index,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let graphs = decode_graph_entries(graphs)?;

    Ok(ProjectSaveData {
        project_metadata,
        files,
        graphs,
    })
}

fn decode_graph_entries(
    graphs: Map<String, Value>,
) -> Result<BTreeMap<String, EncodedGraph>, ValidationError> {
    let mut decoded = BTreeMap::new();
    for (key, graph) in graphs {
        let encoded = serde_json::from_value::<EncodedGraph>(graph).map_err(|e| {
            ValidationError::InvalidGraph {
                key: key.clone(),
                reason: e.to_string(),
            }
        })?;
        decoded.insert(key, encoded);
    }
    Ok(decoded)
}

/// Parses and validates a save file.
pub fn read_project(text: &str) -> Result<ProjectSaveData, StorageError> {
    validate_document(parse_document(text)?)
}

/// Rebuilds a complete live project from a validated document.
///
/// Rejects unparseable graph keys, colliding files, duplicate node ids, and
/// graphs without a file. A file without a graph gets an empty one.
pub fn decode_project(data: ProjectSaveData) -> Result<DecodedProject, StorageError> {
    let ProjectSaveData {
        project_metadata,
        files,
        graphs,
    } = data;

    if project_metadata.app_name != APP_NAME || project_metadata.app_version != APP_VERSION {
        tracing::info!(
            app_name = %project_metadata.app_name,
            app_version = %project_metadata.app_version,
            "loading project saved by a different application version"
        );
    }

    for (i, file) in files.iter().enumerate() {
        if file.name.trim().is_empty() {
            return Err(ValidationError::InvalidFile {
                index: i,
                reason: "file name is blank".to_string(),
            }
            .into());
        }
        if files[..i].iter().any(|earlier| earlier.collides_with(file)) {
            return Err(ValidationError::DuplicateFile {
                name: file.name.clone(),
                file_type: file.file_type,
            }
            .into());
        }
    }

    let mut live_graphs = BTreeMap::new();
    let mut dropped_fields = 0;
    for (raw_key, encoded) in graphs {
        let key: GraphKey = raw_key
            .parse()
            .map_err(|e: fsmgraph_core::CoreError| ValidationError::InvalidGraphKey {
                key: raw_key.clone(),
                reason: e.to_string(),
            })?;
        if !files.iter().any(|f| f.key() == key) {
            return Err(ValidationError::OrphanGraph { key: raw_key }.into());
        }
        let decoded = decode_graph(&key, encoded)?;
        dropped_fields += decoded.dropped_fields;
        live_graphs.insert(key, decoded.graph);
    }

    let mut synthesized_graphs = Vec::new();
    for file in &files {
        let key = file.key();
        if !live_graphs.contains_key(&key) {
            tracing::warn!(graph = %key, "file has no graph in the project file, starting empty");
            live_graphs.insert(key.clone(), Graph::new());
            synthesized_graphs.push(key);
        }
    }

    if dropped_fields > 0 {
        tracing::info!(dropped_fields, "skipped node fields that are not on the allow-list");
    }

    let project = Project::from_parts(files, live_graphs).map_err(|e| StorageError::Store {
        reason: e.to_string(),
    })?;

    Ok(DecodedProject {
        project,
        metadata: project_metadata,
        dropped_fields,
        synthesized_graphs,
    })
}

/// Names what was found in place of a required key.
fn found(value: Option<&Value>) -> &'static str {
    value.map_or("missing", json_type)
}

/// JavaScript-style truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
