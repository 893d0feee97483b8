//! Collaborator interfaces for project persistence.
//!
//! [`GraphStore`] owns the live project and its dirty flag. The remaining
//! traits are the outer edges a save or load touches: where bytes go
//! ([`DownloadSink`]), where they come from ([`ProjectSource`]), how the user
//! is asked ([`ConfirmPrompt`]) and told ([`NotifySink`]).
//!
//! All traits are synchronous; a session handles one operation at a time.

use fsmgraph_core::{AppFile, CoreError, Graph, GraphKey, Project};

use crate::dirty::Persisted;
use crate::error::StorageError;

/// Owner of the live project.
///
/// Every mutating method marks the store dirty. The only way to lower the
/// flag is [`GraphStore::clear_dirty`], which needs a [`Persisted`] proof.
pub trait GraphStore {
    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// The current project.
    fn project(&self) -> &Project;

    /// Whether the live project has changes not yet saved or loaded over.
    fn is_dirty(&self) -> bool;

    // -------------------------------------------------------------------
    // Mutations (each marks the store dirty on success)
    // -------------------------------------------------------------------

    /// Adds a file and its empty graph.
    fn add_graph(&mut self, file: AppFile) -> Result<GraphKey, CoreError>;

    /// Removes a file and its graph.
    fn delete_graph(&mut self, key: &GraphKey) -> Result<AppFile, CoreError>;

    /// Runs `edit` against one graph.
    ///
    /// The store is marked dirty whenever the graph exists and `edit` ran,
    /// whatever `edit` returns: the store cannot see inside `R`, so an edit
    /// that reports its own failure still counts as an edit.
    fn edit_graph<R>(
        &mut self,
        key: &GraphKey,
        edit: impl FnOnce(&mut Graph) -> R,
    ) -> Result<R, CoreError>;

    /// Replaces the whole project in one step.
    ///
    /// On error the previous project is left untouched.
    fn replace_all(&mut self, project: Project) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------

    /// Lowers the dirty flag after a successful save or load.
    fn clear_dirty(&mut self, proof: Persisted);
}

/// Destination for a serialized project.
pub trait DownloadSink {
    /// Delivers `bytes` under `filename`.
    fn emit(&mut self, bytes: &[u8], filename: &str) -> Result<(), StorageError>;
}

/// A yes/no question put to the user.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-visible message about the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Receiver of user-visible notifications.
pub trait NotifySink {
    fn show(&mut self, notification: Notification);
}

/// Where a project file to load comes from.
pub trait ProjectSource {
    /// Short human-readable name, e.g. a path.
    fn describe(&self) -> String;

    /// Reads the whole source as text.
    fn read_text(&mut self) -> Result<String, StorageError>;
}
