//! Graph: the ordered node sequence behind one script file.
//!
//! Node order is significant and preserved verbatim through save and load.
//! The graph-level attributes (`parameters`, `argument_names`, `scope`) are
//! free-form values that stay [`RuntimeValue::Absent`] until the editor sets
//! them.

use crate::error::CoreError;
use crate::node::Node;
use crate::value::RuntimeValue;

/// One client or server script's logic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    pub parameters: RuntimeValue,
    pub argument_names: RuntimeValue,
    pub scope: RuntimeValue,
}

impl Graph {
    /// Creates an empty graph with all attributes absent.
    pub fn new() -> Self {
        Graph::default()
    }

    /// Builds a graph from an ordered node list, rejecting duplicate ids.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, CoreError> {
        let mut graph = Graph::new();
        for node in nodes {
            graph.push_node(node)?;
        }
        Ok(graph)
    }

    /// Appends a node at the end of the sequence.
    pub fn push_node(&mut self, node: Node) -> Result<(), CoreError> {
        if self.node(&node.id).is_some() {
            return Err(CoreError::DuplicateNodeId { id: node.id });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node by id, keeping the order of the remaining nodes.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(index))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Nodes in sequence order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_graph_has_absent_attributes() {
        let graph = Graph::new();
        assert!(graph.is_empty());
        assert!(graph.parameters.is_absent());
        assert!(graph.argument_names.is_absent());
        assert!(graph.scope.is_absent());
    }

    #[test]
    fn push_rejects_duplicate_ids() {
        let mut graph = Graph::new();
        graph.push_node(Node::new("n1")).unwrap();
        let err = graph.push_node(Node::new("n1").with("label", "again")).unwrap_err();
        assert_eq!(err, CoreError::DuplicateNodeId { id: "n1".into() });
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn from_nodes_preserves_order() {
        let graph = Graph::from_nodes(vec![Node::new("c"), Node::new("a"), Node::new("b")]).unwrap();
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn remove_and_edit_nodes() {
        let mut graph = Graph::from_nodes(vec![Node::new("a"), Node::new("b")]).unwrap();
        graph.node_mut("b").unwrap().set("label", "B");
        assert_eq!(graph.remove_node("a").map(|n| n.id), Some("a".to_string()));
        assert!(graph.remove_node("a").is_none());
        assert_eq!(graph.node("b").unwrap().get("label"), Some(&RuntimeValue::from("B")));
    }
}
