//! Save/load orchestration and the exit guard.
//!
//! [`ProjectSession`] owns a [`GraphStore`] plus the collaborators a save or
//! load talks to. It holds the only two call sites that clear the dirty flag:
//! the end of a successful [`ProjectSession::save_at`] and the commit step of
//! [`ProjectSession::load`].
//!
//! A load either commits a complete new project or leaves the store exactly
//! as it was, including its dirty flag.

use chrono::{DateTime, Utc};
use fsmgraph_core::{AppFile, CoreError, Graph, GraphKey};

use crate::convert::ProjectionWarning;
use crate::dirty::Persisted;
use crate::error::StorageError;
use crate::reader::{decode_project, parse_document, validate_document};
use crate::traits::{ConfirmPrompt, DownloadSink, GraphStore, Notification, NotifySink, ProjectSource, Severity};
use crate::writer::write_project;

/// Question asked before a load discards unsaved changes.
pub const UNSAVED_CHANGES_MESSAGE: &str =
    "You have unsaved changes. Loading a project will discard them. Continue?";

/// Warning shown when leaving with unsaved changes.
pub const EXIT_WARNING_MESSAGE: &str = "You have unsaved changes that will be lost.";

// ---------------------------------------------------------------------------
// Load state machine
// ---------------------------------------------------------------------------

/// Steps of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    ConfirmingDiscard,
    Aborted,
    Reading,
    Parsing,
    Validating,
    Committed,
    Rejected,
}

impl LoadPhase {
    /// Whether `next` may directly follow `self`.
    pub fn can_advance_to(self, next: LoadPhase) -> bool {
        use LoadPhase::*;
        matches!(
            (self, next),
            (Idle, ConfirmingDiscard)
                | (Idle, Reading)
                | (ConfirmingDiscard, Aborted)
                | (ConfirmingDiscard, Reading)
                | (Reading, Parsing)
                | (Reading, Rejected)
                | (Parsing, Validating)
                | (Parsing, Rejected)
                | (Validating, Committed)
                | (Validating, Rejected)
                | (Aborted, Idle)
                | (Committed, Idle)
                | (Rejected, Idle)
        )
    }
}

/// The phases one load went through, starting and ending at `Idle`.
#[derive(Debug)]
struct LoadFlow {
    trace: Vec<LoadPhase>,
}

impl LoadFlow {
    fn new() -> Self {
        LoadFlow {
            trace: vec![LoadPhase::Idle],
        }
    }

    fn current(&self) -> LoadPhase {
        self.trace.last().copied().unwrap_or(LoadPhase::Idle)
    }

    fn advance(&mut self, next: LoadPhase) {
        let current = self.current();
        debug_assert!(
            current.can_advance_to(next),
            "illegal load transition {:?} -> {:?}",
            current,
            next
        );
        tracing::debug!(from = ?current, to = ?next, "load phase");
        self.trace.push(next);
    }

    /// Ends in `terminal` and returns to `Idle`.
    fn finish(mut self, terminal: LoadPhase) -> Vec<LoadPhase> {
        self.advance(terminal);
        self.advance(LoadPhase::Idle);
        self.trace
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a successful save produced.
#[derive(Debug, Clone)]
pub struct SaveSummary {
    pub filename: String,
    pub saved_at: String,
    pub bytes: usize,
    pub digest: blake3::Hash,
    pub warnings: Vec<ProjectionWarning>,
}

/// What a committed load brought in.
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub source: String,
    pub saved_at: String,
    pub app_version: String,
    pub files: usize,
    pub nodes: usize,
    pub dropped_fields: usize,
    pub synthesized_graphs: Vec<GraphKey>,
    pub digest: blake3::Hash,
    pub trace: Vec<LoadPhase>,
}

/// Result of a load request that did not fail.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Committed(LoadSummary),
    /// The user declined to discard unsaved changes; nothing was read.
    Aborted { trace: Vec<LoadPhase> },
}

impl LoadOutcome {
    pub fn trace(&self) -> &[LoadPhase] {
        match self {
            LoadOutcome::Committed(summary) => &summary.trace,
            LoadOutcome::Aborted { trace } => trace,
        }
    }
}

/// What the host should do when the user navigates away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitDecision {
    Proceed,
    Warn(String),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A live project plus the collaborators used to save and load it.
pub struct ProjectSession<S> {
    store: S,
    sink: Box<dyn DownloadSink>,
    prompt: Box<dyn ConfirmPrompt>,
    notifier: Box<dyn NotifySink>,
}

impl<S: GraphStore> ProjectSession<S> {
    pub fn new(
        store: S,
        sink: impl DownloadSink + 'static,
        prompt: impl ConfirmPrompt + 'static,
        notifier: impl NotifySink + 'static,
    ) -> Self {
        ProjectSession {
            store,
            sink: Box::new(sink),
            prompt: Box::new(prompt),
            notifier: Box::new(notifier),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    // -------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------

    pub fn add_file(&mut self, file: AppFile) -> Result<GraphKey, CoreError> {
        self.store.add_graph(file)
    }

    pub fn delete_file(&mut self, key: &GraphKey) -> Result<AppFile, CoreError> {
        self.store.delete_graph(key)
    }

    pub fn edit_graph<R>(
        &mut self,
        key: &GraphKey,
        edit: impl FnOnce(&mut Graph) -> R,
    ) -> Result<R, CoreError> {
        self.store.edit_graph(key, edit)
    }

    // -------------------------------------------------------------------
    // Save
    // -------------------------------------------------------------------

    /// Saves the live project, stamped with the current time.
    pub fn save(&mut self) -> Result<SaveSummary, StorageError> {
        self.save_at(Utc::now())
    }

    /// Saves the live project and hands it to the download sink.
    ///
    /// The dirty flag is cleared only if the sink accepted the bytes.
    pub fn save_at(&mut self, now: DateTime<Utc>) -> Result<SaveSummary, StorageError> {
        match self.try_save(now) {
            Ok(summary) => {
                if summary.warnings.is_empty() {
                    self.notifier.show(Notification::new(
                        Severity::Success,
                        "Project saved",
                        format!("Saved as {}", summary.filename),
                    ));
                } else {
                    self.notifier.show(Notification::new(
                        Severity::Warning,
                        "Project saved with omissions",
                        format!(
                            "Saved as {}, but {} value(s) could not be saved",
                            summary.filename,
                            summary.warnings.len()
                        ),
                    ));
                }
                Ok(summary)
            }
            Err(err) => {
                tracing::error!(error = %err, "save failed");
                self.notifier
                    .show(Notification::new(Severity::Error, "Save failed", err.to_string()));
                Err(err)
            }
        }
    }

    fn try_save(&mut self, now: DateTime<Utc>) -> Result<SaveSummary, StorageError> {
        let saved = write_project(self.store.project(), now)?;
        let digest = saved.data.content_digest()?;

        self.sink.emit(&saved.bytes, &saved.filename)?;
        self.store.clear_dirty(Persisted::saved());

        tracing::info!(
            filename = %saved.filename,
            bytes = saved.bytes.len(),
            digest = %digest.to_hex(),
            "project saved"
        );

        Ok(SaveSummary {
            filename: saved.filename,
            saved_at: saved.data.project_metadata.saved_at,
            bytes: saved.bytes.len(),
            digest,
            warnings: saved.warnings,
        })
    }

    // -------------------------------------------------------------------
    // Load
    // -------------------------------------------------------------------

    /// Replaces the live project with the one in `source`.
    ///
    /// If there are unsaved changes the user is asked first; declining
    /// returns [`LoadOutcome::Aborted`] without reading. Any read, parse or
    /// validation failure leaves the store untouched.
    pub fn load(&mut self, source: &mut dyn ProjectSource) -> Result<LoadOutcome, StorageError> {
        let mut flow = LoadFlow::new();

        if self.store.is_dirty() {
            flow.advance(LoadPhase::ConfirmingDiscard);
            if !self.prompt.confirm(UNSAVED_CHANGES_MESSAGE) {
                tracing::info!(source = %source.describe(), "load cancelled, keeping unsaved changes");
                return Ok(LoadOutcome::Aborted {
                    trace: flow.finish(LoadPhase::Aborted),
                });
            }
        }

        match self.try_load(source, &mut flow) {
            Ok(mut summary) => {
                summary.trace = flow.finish(LoadPhase::Committed);
                self.notifier.show(Notification::new(
                    Severity::Success,
                    "Project loaded",
                    format!(
                        "Loaded {} file(s) from {}",
                        summary.files, summary.source
                    ),
                ));
                Ok(LoadOutcome::Committed(summary))
            }
            Err(err) => {
                let trace = flow.finish(LoadPhase::Rejected);
                tracing::warn!(error = %err, ?trace, "load rejected");
                self.notifier
                    .show(Notification::new(Severity::Error, load_error_title(&err), err.to_string()));
                Err(err)
            }
        }
    }

    fn try_load(
        &mut self,
        source: &mut dyn ProjectSource,
        flow: &mut LoadFlow,
    ) -> Result<LoadSummary, StorageError> {
        let name = source.describe();

        flow.advance(LoadPhase::Reading);
        let text = source.read_text()?;

        flow.advance(LoadPhase::Parsing);
        let value = parse_document(&text)?;

        flow.advance(LoadPhase::Validating);
        let data = validate_document(value)?;
        let digest = data.content_digest()?;
        let decoded = decode_project(data)?;

        let files = decoded.project.files().len();
        let nodes = decoded.project.node_count();

        self.store.replace_all(decoded.project)?;
        self.store.clear_dirty(Persisted::loaded());

        tracing::info!(source = %name, files, nodes, digest = %digest.to_hex(), "project loaded");

        Ok(LoadSummary {
            source: name,
            saved_at: decoded.metadata.saved_at,
            app_version: decoded.metadata.app_version,
            files,
            nodes,
            dropped_fields: decoded.dropped_fields,
            synthesized_graphs: decoded.synthesized_graphs,
            digest,
            trace: Vec::new(),
        })
    }

    // -------------------------------------------------------------------
    // Exit guard
    // -------------------------------------------------------------------

    /// Whether leaving now would lose work.
    pub fn exit_guard(&self) -> ExitDecision {
        if self.store.is_dirty() {
            ExitDecision::Warn(EXIT_WARNING_MESSAGE.to_string())
        } else {
            ExitDecision::Proceed
        }
    }
}

fn load_error_title(err: &StorageError) -> &'static str {
    match err {
        StorageError::Io { .. } => "Could not read project file",
        StorageError::Parse(_) | StorageError::Encoding { .. } => "Invalid project file",
        StorageError::Validation(_) => "Invalid project structure",
        _ => "Load failed",
    }
}
