//! The allow-list of durable node fields.
//!
//! A node may carry any number of runtime fields, but only those named here
//! are written to or read from save files. New node properties stay
//! invisible to save/load until they are added to [`NODE_FIELDS`]; removing
//! a name makes older files drop that field on load.
//!
//! The table order is the on-disk order: projected records list `id` first
//! and then these fields in declaration order, independent of the order in
//! which the editor set them.

/// Bumped whenever [`NODE_FIELDS`] changes.
pub const NODE_FIELDS_VERSION: u32 = 1;

/// Field names recognized as durable, in serialization order.
pub const NODE_FIELDS: &[&str] = &[
    // presentation
    "label",
    "comment",
    "x",
    "y",
    "width",
    "height",
    "color",
    "collapsed",
    "disabled",
    // entry points and calls
    "eventName",
    "functionName",
    "arguments",
    "returnType",
    // data
    "variable",
    "value",
    "expression",
    "condition",
    "message",
    "target",
    "delay",
    "items",
    "options",
    // wiring
    "outputs",
    "next",
    "branches",
];

/// Returns the serialization position of `name`, or `None` if it is not
/// durable.
pub fn position(name: &str) -> Option<usize> {
    NODE_FIELDS.iter().position(|field| *field == name)
}

pub fn is_allowed(name: &str) -> bool {
    position(name).is_some()
}
