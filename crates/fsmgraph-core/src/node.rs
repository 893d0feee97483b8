//! Live graph nodes.
//!
//! A [`Node`] has no explicit type tag: what it does is defined by which
//! fields are populated. Fields are kept in insertion order and may include
//! runtime-only state (selection, hover, widget handles) next to durable
//! configuration; the allow-list in [`crate::fields`] decides which is which.

use indexmap::IndexMap;

use crate::value::RuntimeValue;

/// A single configurable unit inside a graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    /// Unique within the owning graph.
    pub id: String,
    fields: IndexMap<String, RuntimeValue>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder form of [`Node::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RuntimeValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<RuntimeValue>,
    ) -> Option<RuntimeValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&RuntimeValue> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RuntimeValue> {
        self.fields.get_mut(name)
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<RuntimeValue> {
        self.fields.shift_remove(name)
    }

    /// All fields in insertion order, durable or not.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &RuntimeValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_insertion_order() {
        let node = Node::new("n1")
            .with("y", 2i64)
            .with("label", "Start")
            .with("x", 1i64);
        let names: Vec<&str> = node.fields().map(|(k, _)| k).collect();
        assert_eq!(names, ["y", "label", "x"]);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut node = Node::new("n1").with("label", "a").with("x", 1i64);
        let previous = node.set("label", "b");
        assert_eq!(previous, Some(RuntimeValue::from("a")));
        assert_eq!(node.get("label"), Some(&RuntimeValue::from("b")));
        assert_eq!(node.fields().next().map(|(k, _)| k), Some("label"));
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut node = Node::new("n1").with("a", 1i64).with("b", 2i64).with("c", 3i64);
        node.remove("a");
        let names: Vec<&str> = node.fields().map(|(k, _)| k).collect();
        assert_eq!(names, ["b", "c"]);
        assert_eq!(node.field_count(), 2);
    }
}
