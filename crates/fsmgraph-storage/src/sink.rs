//! Implementations of the collaborator traits.
//!
//! - [`DirectorySink`] writes downloads into a directory, atomically.
//! - [`MemorySink`] and [`MemoryNotifier`] record what they receive; clones
//!   share the record so a test can keep one and hand the other to a session.
//! - [`TracingNotifier`] routes notifications to the log.
//! - [`AssumeYes`] answers every prompt with yes.
//! - [`FileSource`] and [`TextSource`] supply project text to load.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::StorageError;
use crate::traits::{ConfirmPrompt, DownloadSink, Notification, NotifySink, ProjectSource, Severity};

// ---------------------------------------------------------------------------
// Download sinks
// ---------------------------------------------------------------------------

/// Writes each download to `<dir>/<filename>`.
///
/// Bytes go to a temporary file in the same directory first, which is then
/// renamed over the destination, so a reader never sees a partial file.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    last_written: Option<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink {
            dir: dir.into(),
            last_written: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the most recent successful download.
    pub fn last_written(&self) -> Option<&Path> {
        self.last_written.as_deref()
    }
}

impl DownloadSink for DirectorySink {
    fn emit(&mut self, bytes: &[u8], filename: &str) -> Result<(), StorageError> {
        let emit_err = |source| StorageError::Emit {
            filename: filename.to_string(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(emit_err)?;
        tmp.write_all(bytes).map_err(emit_err)?;
        tmp.as_file().sync_all().map_err(emit_err)?;

        let dest = self.dir.join(filename);
        tmp.persist(&dest).map_err(|e| emit_err(e.error))?;

        tracing::debug!(path = %dest.display(), bytes = bytes.len(), "wrote project file");
        self.last_written = Some(dest);
        Ok(())
    }
}

/// A download captured in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Keeps every download in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    downloads: Rc<RefCell<Vec<Download>>>,
    /// When set, every emit fails with this I/O error kind.
    fail_with: Option<std::io::ErrorKind>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// A sink whose every emit fails.
    pub fn failing(kind: std::io::ErrorKind) -> Self {
        MemorySink {
            downloads: Rc::default(),
            fail_with: Some(kind),
        }
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.borrow().clone()
    }

    pub fn last(&self) -> Option<Download> {
        self.downloads.borrow().last().cloned()
    }
}

impl DownloadSink for MemorySink {
    fn emit(&mut self, bytes: &[u8], filename: &str) -> Result<(), StorageError> {
        if let Some(kind) = self.fail_with {
            return Err(StorageError::Emit {
                filename: filename.to_string(),
                source: kind.into(),
            });
        }
        self.downloads.borrow_mut().push(Download {
            filename: filename.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Prompts and notifiers
// ---------------------------------------------------------------------------

/// Confirms everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl ConfirmPrompt for AssumeYes {
    fn confirm(&mut self, message: &str) -> bool {
        tracing::debug!(message, "assuming yes");
        true
    }
}

/// Logs notifications at a level matching their severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotifySink for TracingNotifier {
    fn show(&mut self, n: Notification) {
        match n.severity {
            Severity::Info | Severity::Success => {
                tracing::info!(title = %n.title, "{}", n.message)
            }
            Severity::Warning => tracing::warn!(title = %n.title, "{}", n.message),
            Severity::Error => tracing::error!(title = %n.title, "{}", n.message),
        }
    }
}

/// Records notifications.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    shown: Rc<RefCell<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        MemoryNotifier::default()
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.borrow().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.shown.borrow().last().cloned()
    }
}

impl NotifySink for MemoryNotifier {
    fn show(&mut self, notification: Notification) {
        self.shown.borrow_mut().push(notification);
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Reads a project file from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl ProjectSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    /// Unreadable files are [`StorageError::Io`]; files that are not UTF-8
    /// are [`StorageError::Encoding`].
    fn read_text(&mut self) -> Result<String, StorageError> {
        let bytes = fs::read(&self.path).map_err(|source| StorageError::Io {
            path: self.describe(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|source| StorageError::Encoding {
            path: self.describe(),
            source,
        })
    }
}

/// Project text already in memory.
#[derive(Debug, Clone)]
pub struct TextSource {
    name: String,
    text: String,
}

impl TextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        TextSource {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl ProjectSource for TextSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read_text(&mut self) -> Result<String, StorageError> {
        Ok(self.text.clone())
    }
}
