//! Save/load round-trip properties over generated projects.
//!
//! Loading what was saved yields the same files and graphs, restricted to
//! allow-listed node fields; saving again yields the same content.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use fsmgraph_core::fields::is_allowed;
use fsmgraph_core::{AppFile, ConfigValue, FileType, Graph, GraphKey, Node, Project, RuntimeValue};
use fsmgraph_storage::{decode_project, read_project, write_project};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn config_value() -> impl Strategy<Value = ConfigValue> {
    let leaf = prop_oneof![
        Just(ConfigValue::Null),
        any::<bool>().prop_map(ConfigValue::Bool),
        any::<i64>().prop_map(ConfigValue::from),
        "[a-zA-Z0-9 _]{0,8}".prop_map(ConfigValue::Text),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(ConfigValue::List),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                .prop_map(|entries| ConfigValue::Record(entries.into_iter().collect())),
        ]
    })
}

fn plain_value() -> impl Strategy<Value = RuntimeValue> {
    config_value().prop_map(RuntimeValue::from)
}

fn field_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "label",
        "x",
        "y",
        "eventName",
        "options",
        "condition",
        "next",
        // Runtime-only fields.
        "selected",
        "renderCache",
        "_dragState",
    ])
}

fn graph() -> impl Strategy<Value = Graph> {
    let node_fields = prop::collection::vec((field_name(), plain_value()), 0..5);
    (
        prop::collection::btree_map("[a-z][a-z0-9]{0,4}", node_fields, 0..5),
        prop::option::of(plain_value()),
        prop::option::of(plain_value()),
        prop::option::of(plain_value()),
    )
        .prop_map(|(nodes, parameters, argument_names, scope)| {
            let nodes = nodes
                .into_iter()
                .map(|(id, fields)| {
                    fields
                        .into_iter()
                        .fold(Node::new(id), |node, (name, value)| node.with(name, value))
                })
                .collect();
            let mut graph = Graph::from_nodes(nodes).unwrap();
            graph.parameters = parameters.unwrap_or_default();
            graph.argument_names = argument_names.unwrap_or_default();
            graph.scope = scope.unwrap_or_default();
            graph
        })
}

fn project() -> impl Strategy<Value = Project> {
    prop::collection::btree_set((any::<bool>(), "[a-z]{1,6}"), 0..4)
        .prop_flat_map(|files: BTreeSet<(bool, String)>| {
            let files: Vec<AppFile> = files
                .into_iter()
                .map(|(server, name)| {
                    let file_type = if server { FileType::Server } else { FileType::Client };
                    AppFile::new(name, file_type)
                })
                .collect();
            let graphs = prop::collection::vec(graph(), files.len());
            (Just(files), graphs)
        })
        .prop_map(|(files, graphs)| {
            let graphs: BTreeMap<GraphKey, Graph> =
                files.iter().map(AppFile::key).zip(graphs).collect();
            Project::from_parts(files, graphs).unwrap()
        })
}

/// The project as it should come back: only allow-listed node fields.
fn restricted(project: &Project) -> Project {
    let graphs = project
        .graphs()
        .iter()
        .map(|(key, graph)| {
            let nodes = graph
                .nodes()
                .iter()
                .map(|node| {
                    node.fields()
                        .filter(|(name, _)| is_allowed(name))
                        .fold(Node::new(node.id.clone()), |kept, (name, value)| {
                            kept.with(name, value.clone())
                        })
                })
                .collect();
            let mut kept = Graph::from_nodes(nodes).unwrap();
            kept.parameters = graph.parameters.clone();
            kept.argument_names = graph.argument_names.clone();
            kept.scope = graph.scope.clone();
            (key.clone(), kept)
        })
        .collect();
    Project::from_parts(project.files().to_vec(), graphs).unwrap()
}

fn reload(project: &Project, millis: i64) -> Project {
    let saved = write_project(project, Utc.timestamp_millis_opt(millis).unwrap()).unwrap();
    let text = String::from_utf8(saved.bytes).unwrap();
    decode_project(read_project(&text).unwrap()).unwrap().project
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn test_load_of_save_restores_allow_listed_state(project in project()) {
        let loaded = reload(&project, 1_000);
        prop_assert_eq!(loaded, restricted(&project));
    }

    #[test]
    fn test_resave_of_loaded_project_is_stable(project in project()) {
        // Same timestamp both times, so the files must match byte for byte.
        // Comparing values would hide reordered record keys.
        let first = write_project(&project, Utc.timestamp_millis_opt(1_000).unwrap()).unwrap();
        let loaded = reload(&project, 1_000);
        let second = write_project(&loaded, Utc.timestamp_millis_opt(1_000).unwrap()).unwrap();

        prop_assert_eq!(
            String::from_utf8(first.bytes).unwrap(),
            String::from_utf8(second.bytes).unwrap()
        );
    }
}

#[test]
fn test_runtime_only_fields_never_reach_the_file() {
    let mut project = Project::new();
    let key = project.add_file(AppFile::client("main")).unwrap();
    project
        .graph_mut(&key)
        .unwrap()
        .push_node(
            Node::new("n1")
                .with("label", "Start")
                .with("selected", true)
                .with("renderCache", RuntimeValue::opaque("Canvas")),
        )
        .unwrap();

    let saved = write_project(&project, Utc.timestamp_millis_opt(0).unwrap()).unwrap();
    let text = String::from_utf8(saved.bytes).unwrap();
    assert!(!text.contains("selected"));
    assert!(!text.contains("renderCache"));
    // Not on the allow-list, so not even a warning.
    assert!(saved.warnings.is_empty());
}

#[test]
fn test_saved_record_is_independent_of_live_node() {
    let mut project = Project::new();
    let key = project.add_file(AppFile::client("main")).unwrap();
    project
        .graph_mut(&key)
        .unwrap()
        .push_node(Node::new("n1").with("options", RuntimeValue::from(vec!["a", "b"])))
        .unwrap();

    let saved = write_project(&project, Utc.timestamp_millis_opt(0).unwrap()).unwrap();

    // Mutating the live value afterwards does not reach the saved document.
    if let Some(RuntimeValue::List(items)) = project
        .graph_mut(&key)
        .unwrap()
        .node_mut("n1")
        .unwrap()
        .get_mut("options")
    {
        items.push(RuntimeValue::from("c"));
    }
    let record = &saved.data.graphs["client/main"].nodes[0];
    assert_eq!(
        record.fields["options"],
        ConfigValue::List(vec![ConfigValue::from("a"), ConfigValue::from("b")])
    );
}

#[test]
fn test_record_key_order_survives_load_and_resave() {
    let options: IndexMap<String, RuntimeValue> = [
        ("z".to_string(), RuntimeValue::from(1i64)),
        ("a".to_string(), RuntimeValue::from(2i64)),
    ]
    .into_iter()
    .collect();
    let scope: IndexMap<String, RuntimeValue> = [
        ("zeta".to_string(), RuntimeValue::from(true)),
        ("alpha".to_string(), RuntimeValue::from(false)),
    ]
    .into_iter()
    .collect();

    let mut project = Project::new();
    let key = project.add_file(AppFile::client("main")).unwrap();
    let graph = project.graph_mut(&key).unwrap();
    graph
        .push_node(Node::new("n1").with("options", RuntimeValue::Record(options)))
        .unwrap();
    graph.scope = RuntimeValue::Record(scope);

    let saved_at = Utc.timestamp_millis_opt(5_000).unwrap();
    let first = write_project(&project, saved_at).unwrap();
    let first_text = String::from_utf8(first.bytes).unwrap();
    let z = first_text.find("\"z\"").unwrap();
    let a = first_text.find("\"a\"").unwrap();
    assert!(z < a, "options keys reordered in:\n{first_text}");

    let loaded = decode_project(read_project(&first_text).unwrap()).unwrap().project;
    let loaded_graph = loaded.graph(&key).unwrap();
    let Some(RuntimeValue::Record(entries)) = loaded_graph.node("n1").unwrap().get("options") else {
        panic!("options did not load as a record");
    };
    assert_eq!(entries.keys().collect::<Vec<_>>(), ["z", "a"]);
    let RuntimeValue::Record(scope) = &loaded_graph.scope else {
        panic!("scope did not load as a record");
    };
    assert_eq!(scope.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);

    let second = write_project(&loaded, saved_at).unwrap();
    assert_eq!(first_text, String::from_utf8(second.bytes).unwrap());
}
