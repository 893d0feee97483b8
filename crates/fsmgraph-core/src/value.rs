//! Node configuration values.
//!
//! [`RuntimeValue`] is what the editor holds on a live node: JSON-like data,
//! the `Absent` sentinel for "field not set", and [`RuntimeValue::Opaque`]
//! handles for runtime-only objects (widget references, callbacks) that have
//! no durable form.
//!
//! [`ConfigValue`] is the durable subset written to save files. The only way
//! from one to the other is [`RuntimeValue::to_config`], a typed deep copy:
//! the result shares nothing with the live value, and the copy fails with a
//! [`CopyError`] naming the offending path when an opaque handle is found.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Durable values
// ---------------------------------------------------------------------------

/// A JSON-shaped configuration value as stored in a save file.
///
/// Records keep their key order so that re-saving an unchanged project
/// produces identical text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<ConfigValue>),
    Record(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Returns `true` for lists and records.
    pub fn is_structured(&self) -> bool {
        matches!(self, ConfigValue::List(_) | ConfigValue::Record(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(n.into())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Runtime values
// ---------------------------------------------------------------------------

/// A value held by a live node or graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuntimeValue {
    /// The field is not set. Never persisted.
    #[default]
    Absent,
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<RuntimeValue>),
    Record(IndexMap<String, RuntimeValue>),
    /// A runtime-only handle with no plain-data form. `kind` names it for
    /// diagnostics.
    Opaque { kind: String },
}

impl RuntimeValue {
    pub fn opaque(kind: impl Into<String>) -> Self {
        RuntimeValue::Opaque { kind: kind.into() }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RuntimeValue::Absent)
    }

    /// Deep-copies this value into its durable form.
    ///
    /// Nested `Absent` entries follow JSON conventions: they are omitted from
    /// records and become `null` inside lists. A top-level `Absent` copies to
    /// `null`; callers that must omit absent fields check [`is_absent`]
    /// first.
    ///
    /// [`is_absent`]: RuntimeValue::is_absent
    pub fn to_config(&self) -> Result<ConfigValue, CopyError> {
        match self {
            RuntimeValue::Absent | RuntimeValue::Null => Ok(ConfigValue::Null),
            RuntimeValue::Bool(b) => Ok(ConfigValue::Bool(*b)),
            RuntimeValue::Number(n) => Ok(ConfigValue::Number(n.clone())),
            RuntimeValue::Text(s) => Ok(ConfigValue::Text(s.clone())),
            RuntimeValue::List(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| item.to_config().map_err(|e| e.within(PathSegment::Index(index))))
                .collect::<Result<Vec<_>, _>>()
                .map(ConfigValue::List),
            RuntimeValue::Record(entries) => {
                let mut copy = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    if value.is_absent() {
                        continue;
                    }
                    let copied = value
                        .to_config()
                        .map_err(|e| e.within(PathSegment::Key(key.clone())))?;
                    copy.insert(key.clone(), copied);
                }
                Ok(ConfigValue::Record(copy))
            }
            RuntimeValue::Opaque { kind } => Err(CopyError {
                path: Vec::new(),
                kind: kind.clone(),
            }),
        }
    }
}

impl From<ConfigValue> for RuntimeValue {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Null => RuntimeValue::Null,
            ConfigValue::Bool(b) => RuntimeValue::Bool(b),
            ConfigValue::Number(n) => RuntimeValue::Number(n),
            ConfigValue::Text(s) => RuntimeValue::Text(s),
            ConfigValue::List(items) => {
                RuntimeValue::List(items.into_iter().map(RuntimeValue::from).collect())
            }
            ConfigValue::Record(entries) => RuntimeValue::Record(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, RuntimeValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for RuntimeValue {
    fn from(s: &str) -> Self {
        RuntimeValue::Text(s.to_string())
    }
}

impl From<String> for RuntimeValue {
    fn from(s: String) -> Self {
        RuntimeValue::Text(s)
    }
}

impl From<bool> for RuntimeValue {
    fn from(b: bool) -> Self {
        RuntimeValue::Bool(b)
    }
}

impl From<i64> for RuntimeValue {
    fn from(n: i64) -> Self {
        RuntimeValue::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become `Null`.
impl From<f64> for RuntimeValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(RuntimeValue::Null, RuntimeValue::Number)
    }
}

impl<T: Into<RuntimeValue>> From<Vec<T>> for RuntimeValue {
    fn from(items: Vec<T>) -> Self {
        RuntimeValue::List(items.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Copy failures
// ---------------------------------------------------------------------------

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A value could not be deep-copied because it contains an opaque handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot copy opaque '{kind}' value at {}", DisplayPath(&.path))]
pub struct CopyError {
    /// Location of the opaque value, outermost segment first. Empty when the
    /// value itself is opaque.
    pub path: Vec<PathSegment>,
    pub kind: String,
}

impl CopyError {
    fn within(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

struct DisplayPath<'a>(&'a [PathSegment]);

impl fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}
