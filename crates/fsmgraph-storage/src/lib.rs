//! Project persistence for fsmgraph editor projects.
//!
//! Saves a whole [`Project`](fsmgraph_core::Project) to a single
//! `*.fsm.json` document and restores it, tracking whether the live project
//! has unsaved changes.
//!
//! # Architecture
//!
//! The save path runs leaves first:
//! - [`convert::project_node`] projects one live node onto its durable,
//!   allow-listed record.
//! - [`convert::encode_graphs`] builds the `graphs` section.
//! - [`writer::write_project`] adds metadata and the file manifest and
//!   produces the canonical bytes and filename.
//!
//! The load path is the reverse: [`reader::parse_document`] →
//! [`reader::validate_document`] → [`reader::decode_project`], producing a
//! complete new project that is swapped into the store in one step.
//!
//! [`session::ProjectSession`] wires both paths to the collaborator traits in
//! [`traits`] and owns the only two call sites that clear the
//! [`dirty::DirtyFlag`].
//!
//! # Modules
//!
//! - [`error`]: StorageError and ValidationError
//! - [`types`]: the save-file schema (ProjectSaveData and friends)
//! - [`convert`]: node projection, graph encoding and decoding
//! - [`writer`]: project save encoding
//! - [`reader`]: project load decoding and structural validation
//! - [`dirty`]: dirty-state tracking
//! - [`hash`]: content digests of saved projects
//! - [`traits`]: collaborator interfaces
//! - [`memory`]: InMemoryGraphStore
//! - [`sink`]: download sinks, prompts, notifiers and sources
//! - [`session`]: save/load orchestration and the exit guard

pub mod convert;
pub mod dirty;
pub mod error;
pub mod hash;
pub mod memory;
pub mod reader;
pub mod session;
pub mod sink;
pub mod traits;
pub mod types;
pub mod writer;

// Re-export key types for ergonomic use.
pub use convert::{encode_graphs, project_node, ProjectionWarning};
pub use dirty::{DirtyFlag, Persisted};
pub use error::{StorageError, ValidationError};
pub use memory::InMemoryGraphStore;
pub use reader::{decode_project, read_project, DecodedProject};
pub use session::{ExitDecision, LoadOutcome, LoadPhase, LoadSummary, ProjectSession, SaveSummary};
pub use sink::{AssumeYes, DirectorySink, FileSource, MemoryNotifier, MemorySink, TextSource, TracingNotifier};
pub use traits::{
    ConfirmPrompt, DownloadSink, GraphStore, Notification, NotifySink, ProjectSource, Severity,
};
pub use types::{EncodedGraph, NodeRecord, ProjectMetadata, ProjectSaveData};
pub use writer::{write_project, APP_NAME, APP_VERSION};
