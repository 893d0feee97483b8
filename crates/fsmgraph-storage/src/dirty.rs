//! Unsaved-changes tracking.
//!
//! [`DirtyFlag`] is raised by every structural change to the live project
//! and lowered only when the project has been persisted: after a successful
//! save or a successful load. Lowering takes a [`Persisted`] token, which
//! only this crate can create, so those two call sites in
//! [`crate::session`] are the only places that can declare the live state
//! safe to discard.

/// How the live state came to match a persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistKind {
    Saved,
    Loaded,
}

/// Proof that the live project now matches a persisted document.
///
/// Consumed by [`DirtyFlag::clear`], so each successful save or load clears
/// the flag exactly once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a Persisted token must be passed to DirtyFlag::clear"]
pub struct Persisted {
    kind: PersistKind,
}

impl Persisted {
    pub(crate) fn saved() -> Self {
        Persisted {
            kind: PersistKind::Saved,
        }
    }

    pub(crate) fn loaded() -> Self {
        Persisted {
            kind: PersistKind::Loaded,
        }
    }

    pub fn kind(&self) -> PersistKind {
        self.kind
    }
}

/// Whether unsaved modifications exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyFlag {
    dirty: bool,
    /// Total number of marks, for diagnostics.
    marks: u64,
}

impl DirtyFlag {
    /// A clean flag.
    pub fn new() -> Self {
        DirtyFlag::default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn marks(&self) -> u64 {
        self.marks
    }

    /// Records a modification.
    pub fn mark(&mut self) {
        self.dirty = true;
        self.marks += 1;
    }

    /// Lowers the flag after the live state was persisted.
    pub fn clear(&mut self, proof: Persisted) {
        tracing::debug!(kind = ?proof.kind, marks = self.marks, "clearing dirty flag");
        self.dirty = false;
    }
}
