//! Conversions between live graphs and their save-file records.
//!
//! [`project_node`] turns a live [`Node`] into a [`NodeRecord`] holding only
//! allow-listed fields, deep-copied. [`encode_graphs`] applies it to every
//! graph of a project. [`decode_graph`] goes the other way for the load path.
//!
//! A field whose value cannot be copied (it holds an opaque runtime handle)
//! is dropped from the record and reported as a [`ProjectionWarning`]; it
//! never aborts the rest of the projection.

use std::collections::BTreeMap;
use std::fmt;

use fsmgraph_core::fields::{is_allowed, NODE_FIELDS};
use fsmgraph_core::{ConfigValue, CopyError, Graph, GraphKey, Node, RuntimeValue};
use indexmap::IndexMap;

use crate::error::ValidationError;
use crate::types::{EncodedGraph, NodeRecord};

// ---------------------------------------------------------------------------
// Node Field Projector
// ---------------------------------------------------------------------------

/// A field left out of a record because it could not be copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedField {
    pub field: &'static str,
    pub cause: CopyError,
}

/// The result of projecting one node.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedNode {
    pub record: NodeRecord,
    pub dropped: Vec<DroppedField>,
}

/// Projects a live node onto its durable record.
///
/// The record holds `id` plus every allow-listed field that is set and not
/// absent, in allow-list order. Fields not on the allow-list are ignored.
pub fn project_node(node: &Node) -> ProjectedNode {
    let mut fields = IndexMap::new();
    let mut dropped = Vec::new();

    for &name in NODE_FIELDS {
        let Some(value) = node.get(name) else {
            continue;
        };
        if value.is_absent() {
            continue;
        }
        match value.to_config() {
            Ok(copy) => {
                fields.insert(name.to_string(), copy);
            }
            Err(cause) => dropped.push(DroppedField { field: name, cause }),
        }
    }

    ProjectedNode {
        record: NodeRecord {
            id: node.id.clone(),
            fields,
        },
        dropped,
    }
}

// ---------------------------------------------------------------------------
// Graph Encoder
// ---------------------------------------------------------------------------

/// A value left out of the save file, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionWarning {
    pub graph: GraphKey,
    /// `None` for graph-level attributes.
    pub node_id: Option<String>,
    pub field: String,
    pub cause: CopyError,
}

impl fmt::Display for ProjectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(node_id) => write!(
                f,
                "dropped field '{}' of node '{}' in {}: {}",
                self.field, node_id, self.graph, self.cause
            ),
            None => write!(
                f,
                "dropped attribute '{}' of {}: {}",
                self.field, self.graph, self.cause
            ),
        }
    }
}

/// The `graphs` section of a save file, plus what had to be left out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodedGraphs {
    pub graphs: BTreeMap<String, EncodedGraph>,
    pub warnings: Vec<ProjectionWarning>,
}

/// Encodes one graph, appending any dropped values to `warnings`.
pub fn encode_graph(
    key: &GraphKey,
    graph: &Graph,
    warnings: &mut Vec<ProjectionWarning>,
) -> EncodedGraph {
    let mut nodes = Vec::with_capacity(graph.len());
    for node in graph.nodes() {
        let projected = project_node(node);
        for dropped in projected.dropped {
            warnings.push(ProjectionWarning {
                graph: key.clone(),
                node_id: Some(node.id.clone()),
                field: dropped.field.to_string(),
                cause: dropped.cause,
            });
        }
        nodes.push(projected.record);
    }

    let mut attribute = |field: &str, value: &RuntimeValue| -> Option<ConfigValue> {
        if value.is_absent() {
            return None;
        }
        match value.to_config() {
            Ok(copy) => Some(copy),
            Err(cause) => {
                warnings.push(ProjectionWarning {
                    graph: key.clone(),
                    node_id: None,
                    field: field.to_string(),
                    cause,
                });
                None
            }
        }
    };

    EncodedGraph {
        nodes,
        parameters: attribute("parameters", &graph.parameters),
        argument_names: attribute("argumentNames", &graph.argument_names),
        scope: attribute("scope", &graph.scope),
    }
}

/// Encodes every graph of a project, keyed by `"<type>/<name>"`.
pub fn encode_graphs(graphs: &BTreeMap<GraphKey, Graph>) -> EncodedGraphs {
    let mut encoded = EncodedGraphs::default();
    for (key, graph) in graphs {
        let graph_record = encode_graph(key, graph, &mut encoded.warnings);
        encoded.graphs.insert(key.to_string(), graph_record);
    }
    for warning in &encoded.warnings {
        tracing::warn!(graph = %warning.graph, field = %warning.field, "{}", warning);
    }
    encoded
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A graph rebuilt from its record.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGraph {
    pub graph: Graph,
    /// Number of node fields skipped because they are not on the allow-list.
    pub dropped_fields: usize,
}

/// Rebuilds a live graph from its record.
///
/// Fields that are not on the allow-list (written by a build with a
/// different allow-list) are skipped. Duplicate node ids are rejected.
pub fn decode_graph(key: &GraphKey, encoded: EncodedGraph) -> Result<DecodedGraph, ValidationError> {
    let mut graph = Graph::new();
    let mut dropped_fields = 0;

    for record in encoded.nodes {
        let mut node = Node::new(record.id);
        for (name, value) in record.fields {
            if is_allowed(&name) {
                node.set(name, RuntimeValue::from(value));
            } else {
                tracing::debug!(graph = %key, node = %node.id, field = %name, "skipping unknown node field");
                dropped_fields += 1;
            }
        }
        graph
            .push_node(node)
            .map_err(|err| match err {
                fsmgraph_core::CoreError::DuplicateNodeId { id } => ValidationError::DuplicateNodeId {
                    key: key.to_string(),
                    id,
                },
                other => ValidationError::InvalidGraph {
                    key: key.to_string(),
                    reason: other.to_string(),
                },
            })?;
    }

    graph.parameters = encoded.parameters.map_or(RuntimeValue::Absent, RuntimeValue::from);
    graph.argument_names = encoded
        .argument_names
        .map_or(RuntimeValue::Absent, RuntimeValue::from);
    graph.scope = encoded.scope.map_or(RuntimeValue::Absent, RuntimeValue::from);

    Ok(DecodedGraph {
        graph,
        dropped_fields,
    })
}
