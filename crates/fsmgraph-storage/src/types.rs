//! The save-file schema.
//!
//! ```text
//! {
//!   "projectMetadata": { "savedAt", "appName", "appVersion" },
//!   "files": [ { "name", "type" }, ... ],
//!   "graphs": { "<type>/<name>": { "nodes": [...], "parameters"?, "argumentNames"?, "scope"? } }
//! }
//! ```
//!
//! Field order in these structs is the on-disk order. `graphs` is a
//! `BTreeMap` so keys always serialize sorted.

use std::collections::BTreeMap;

use fsmgraph_core::{AppFile, ConfigValue};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Who saved the file, and when.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMetadata {
    /// ISO-8601 timestamp with millisecond precision, UTC.
    pub saved_at: String,
    pub app_name: String,
    pub app_version: String,
}

/// The durable projection of one node: `id` first, then allow-listed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: IndexMap<String, ConfigValue>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        NodeRecord {
            id: id.into(),
            fields: IndexMap::new(),
        }
    }
}

/// One graph as stored in the `graphs` mapping.
///
/// The optional attributes are omitted when absent on the live graph. A
/// present `null` is kept as `Some(ConfigValue::Null)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedGraph {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub parameters: Option<ConfigValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub argument_names: Option<ConfigValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub scope: Option<ConfigValue>,
}

/// The whole persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSaveData {
    pub project_metadata: ProjectMetadata,
    pub files: Vec<AppFile>,
    pub graphs: BTreeMap<String, EncodedGraph>,
}

/// Deserializes a field that is present in the input, including `null`.
///
/// Used with `#[serde(default)]` so that a missing key stays `None` while an
/// explicit `null` becomes `Some(ConfigValue::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<ConfigValue>, D::Error>
where
    D: Deserializer<'de>,
{
    ConfigValue::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_record_serializes_id_first() {
        let mut record = NodeRecord::new("n1");
        record.fields.insert("label".into(), ConfigValue::from("Start"));
        record.fields.insert("x".into(), ConfigValue::from(10i64));
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"id":"n1","label":"Start","x":10}"#);
    }

    #[test]
    fn test_node_record_requires_string_id() {
        assert!(serde_json::from_value::<NodeRecord>(json!({"label": "x"})).is_err());
        assert!(serde_json::from_value::<NodeRecord>(json!({"id": 5})).is_err());
        let record: NodeRecord = serde_json::from_value(json!({"id": "a", "label": "x"})).unwrap();
        assert_eq!(record.fields["label"], ConfigValue::from("x"));
    }

    #[test]
    fn test_encoded_graph_omits_absent_attributes() {
        let graph = EncodedGraph::default();
        assert_eq!(serde_json::to_value(&graph).unwrap(), json!({"nodes": []}));
    }

    #[test]
    fn test_encoded_graph_keeps_explicit_null_attribute() {
        let graph: EncodedGraph =
            serde_json::from_value(json!({"nodes": [], "scope": null, "argumentNames": ["a"]}))
                .unwrap();
        assert_eq!(graph.scope, Some(ConfigValue::Null));
        assert!(graph.parameters.is_none());
        assert!(graph.argument_names.is_some());
    }

    #[test]
    fn test_missing_nodes_decode_as_empty() {
        let graph: EncodedGraph = serde_json::from_value(json!({})).unwrap();
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn test_metadata_tolerates_missing_fields() {
        let meta: ProjectMetadata = serde_json::from_value(json!({"appName": "x"})).unwrap();
        assert_eq!(meta.app_name, "x");
        assert!(meta.saved_at.is_empty());
    }
}
