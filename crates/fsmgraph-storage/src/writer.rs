//! Project save encoding.
//!
//! [`write_project`] encodes every graph, wraps the result with the file
//! manifest and fresh metadata, and serializes it to canonical text: 2-space
//! indented JSON with fixed field order, sorted graph keys, and node fields
//! in allow-list order. The bytes are built completely in memory, so a
//! failure never leaves a partial file behind.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use fsmgraph_core::{AppFile, Project};

use crate::convert::{encode_graphs, ProjectionWarning};
use crate::error::StorageError;
use crate::types::{EncodedGraph, ProjectMetadata, ProjectSaveData};

/// Application name recorded in every save file.
pub const APP_NAME: &str = "FSM Graph Editor";
/// Filename prefix for saved projects.
pub const APP_SLUG: &str = "fsm-graph-editor";
/// Application version recorded in every save file.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Suffix of saved project files.
pub const FILE_EXTENSION: &str = ".fsm.json";

/// A fully serialized project, ready to hand to a download sink.
#[derive(Debug, Clone)]
pub struct SavedProject {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub data: ProjectSaveData,
    /// Values left out because they could not be copied.
    pub warnings: Vec<ProjectionWarning>,
}

/// Formats a save timestamp as ISO-8601 UTC with milliseconds, e.g.
/// `2026-10-19T08:15:30.123Z`.
pub fn format_saved_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds the download filename for a save made at `saved_at`.
///
/// `:` and `.` in the timestamp are replaced by `-`.
pub fn project_filename(saved_at: &str) -> String {
    let stamp: String = saved_at
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    format!("{}-project-{}{}", APP_SLUG, stamp, FILE_EXTENSION)
}

/// Assembles the persisted document.
pub fn build_save_data(
    files: &[AppFile],
    graphs: BTreeMap<String, EncodedGraph>,
    saved_at: DateTime<Utc>,
) -> ProjectSaveData {
    ProjectSaveData {
        project_metadata: ProjectMetadata {
            saved_at: format_saved_at(saved_at),
            app_name: APP_NAME.to_string(),
            app_version: APP_VERSION.to_string(),
        },
        files: files.to_vec(),
        graphs,
    }
}

/// Serializes a document to its canonical text form.
pub fn serialize_project(data: &ProjectSaveData) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec_pretty(data)?)
}

/// Encodes and serializes a whole project.
pub fn write_project(project: &Project, saved_at: DateTime<Utc>) -> Result<SavedProject, StorageError> {
    let encoded = encode_graphs(project.graphs());
    let data = build_save_data(project.files(), encoded.graphs, saved_at);
    let bytes = serialize_project(&data)?;
    let filename = project_filename(&data.project_metadata.saved_at);

    Ok(SavedProject {
        filename,
        bytes,
        data,
        warnings: encoded.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fsmgraph_core::{Graph, Node, RuntimeValue};

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn sample_project() -> Project {
        let mut project = Project::new();
        let key = project.add_file(AppFile::client("main")).unwrap();
        project
            .graph_mut(&key)
            .unwrap()
            .push_node(Node::new("n1").with("label", "Start"))
            .unwrap();
        project
    }

    #[test]
    fn test_saved_at_is_iso_8601_with_millis() {
        let stamp = format_saved_at(at(1_760_000_000_123));
        assert_eq!(stamp, "2025-10-09T08:53:20.123Z");
    }

    #[test]
    fn test_filename_replaces_unsafe_characters() {
        assert_eq!(
            project_filename("2025-10-09T08:53:20.123Z"),
            "fsm-graph-editor-project-2025-10-09T08-53-20-123Z.fsm.json"
        );
    }

    #[test]
    fn test_concrete_single_node_project() {
        let saved = write_project(&sample_project(), at(0)).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&saved.bytes).unwrap();
        assert_eq!(
            json["graphs"]["client/main"]["nodes"],
            serde_json::json!([{"id": "n1", "label": "Start"}])
        );
        assert_eq!(json["files"], serde_json::json!([{"name": "main", "type": "client"}]));
        assert_eq!(json["projectMetadata"]["appName"], APP_NAME);
        assert_eq!(json["projectMetadata"]["appVersion"], APP_VERSION);
        assert!(saved.warnings.is_empty());
    }

    #[test]
    fn test_canonical_text() {
        let mut project = sample_project();
        let key = project.add_file(AppFile::server("api")).unwrap();
        let graph = project.graph_mut(&key).unwrap();
        graph.argument_names = RuntimeValue::from(vec!["req"]);
        graph
            .push_node(Node::new("s1").with("y", 2i64).with("eventName", "request").with("x", 1i64))
            .unwrap();

        let saved = write_project(&project, at(1_760_000_000_123)).unwrap();
        let text = String::from_utf8(saved.bytes).unwrap();
        insta::assert_snapshot!(text, @r###"
        {
          "projectMetadata": {
            "savedAt": "2025-10-09T08:53:20.123Z",
            "appName": "FSM Graph Editor",
            "appVersion": "0.1.0"
          },
          "files": [
            {
              "name": "main",
              "type": "client"
            },
            {
              "name": "api",
              "type": "server"
            }
          ],
          "graphs": {
            "client/main": {
              "nodes": [
                {
                  "id": "n1",
                  "label": "Start"
                }
              ]
            },
            "server/api": {
              "nodes": [
                {
                  "id": "s1",
                  "x": 1,
                  "y": 2,
                  "eventName": "request"
                }
              ],
              "argumentNames": [
                "req"
              ]
            }
          }
        }
        "###);
    }

    #[test]
    fn test_resave_differs_only_in_saved_at() {
        let project = sample_project();
        let first = write_project(&project, at(1_000)).unwrap();
        let second = write_project(&project, at(2_000)).unwrap();
        assert_ne!(first.data.project_metadata, second.data.project_metadata);
        assert_eq!(first.data.files, second.data.files);
        assert_eq!(first.data.graphs, second.data.graphs);

        let strip = |bytes: &[u8]| {
            let mut value: serde_json::Value = serde_json::from_slice(bytes).unwrap();
            value["projectMetadata"]["savedAt"] = serde_json::Value::Null;
            value
        };
        assert_eq!(strip(&first.bytes), strip(&second.bytes));
    }

    #[test]
    fn test_opaque_values_become_warnings_not_errors() {
        let mut project = Project::new();
        let key = project.add_file(AppFile::client("main")).unwrap();
        *project.graph_mut(&key).unwrap() = Graph::from_nodes(vec![
            Node::new("n1").with("value", RuntimeValue::opaque("Timer")),
        ])
        .unwrap();
        let saved = write_project(&project, at(0)).unwrap();
        assert_eq!(saved.warnings.len(), 1);
        assert_eq!(saved.data.graphs["client/main"].nodes[0].fields.len(), 0);
    }
}
