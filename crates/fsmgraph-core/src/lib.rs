//! Data model for fsmgraph editor projects.
//!
//! A [`Project`] is an ordered list of [`AppFile`]s, each owning exactly one
//! [`Graph`] addressed by a [`GraphKey`]. Graphs hold ordered [`Node`]s whose
//! configuration lives in open-ended [`RuntimeValue`] fields; only the fields
//! named in [`fields::NODE_FIELDS`] are durable.

pub mod error;
pub mod fields;
pub mod file;
pub mod graph;
pub mod id;
pub mod node;
pub mod project;
pub mod value;

// Re-export commonly used types
pub use error::CoreError;
pub use file::AppFile;
pub use graph::Graph;
pub use id::{FileType, GraphKey};
pub use node::Node;
pub use project::Project;
pub use value::{ConfigValue, CopyError, RuntimeValue};
