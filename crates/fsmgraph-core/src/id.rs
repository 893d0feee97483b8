//! Graph identity: the file type and the composite `<type>/<name>` key.
//!
//! A [`GraphKey`] is what the save file uses as the key of its `graphs`
//! mapping, so its `Display` and `FromStr` forms are part of the file format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which side a script file runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Client,
    Server,
}

impl FileType {
    /// The lowercase tag used on disk and in graph keys.
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Client => "client",
            FileType::Server => "server",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(FileType::Client),
            "server" => Ok(FileType::Server),
            other => Err(CoreError::InvalidGraphKey {
                key: other.to_string(),
                reason: "file type must be 'client' or 'server'".to_string(),
            }),
        }
    }
}

/// Composite graph identifier, rendered as `"<fileType>/<fileName>"`.
///
/// Ordering is by file type first, then by name, which gives the save file
/// its stable key order for graphs built from the same project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphKey {
    file_type: FileType,
    name: String,
}

impl GraphKey {
    pub fn new(file_type: FileType, name: impl Into<String>) -> Self {
        GraphKey {
            file_type,
            name: name.into(),
        }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.file_type, self.name)
    }
}

impl FromStr for GraphKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_tag, name) = s.split_once('/').ok_or_else(|| CoreError::InvalidGraphKey {
            key: s.to_string(),
            reason: "expected '<type>/<name>'".to_string(),
        })?;
        let file_type = type_tag
            .parse::<FileType>()
            .map_err(|_| CoreError::InvalidGraphKey {
                key: s.to_string(),
                reason: format!("unknown file type '{}'", type_tag),
            })?;
        if name.is_empty() {
            return Err(CoreError::InvalidGraphKey {
                key: s.to_string(),
                reason: "file name is empty".to_string(),
            });
        }
        Ok(GraphKey::new(file_type, name))
    }
}

impl Serialize for GraphKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GraphKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_key_display() {
        let key = GraphKey::new(FileType::Client, "main");
        assert_eq!(key.to_string(), "client/main");
    }

    #[test]
    fn graph_key_parse() {
        let key: GraphKey = "server/api/v2".parse().unwrap();
        assert_eq!(key.file_type(), FileType::Server);
        assert_eq!(key.name(), "api/v2");
    }

    #[test]
    fn graph_key_rejects_unknown_type() {
        let err = "worker/main".parse::<GraphKey>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidGraphKey { .. }));
        assert!(err.to_string().contains("unknown file type 'worker'"));
    }

    #[test]
    fn graph_key_rejects_missing_separator_and_empty_name() {
        assert!("clientmain".parse::<GraphKey>().is_err());
        assert!("client/".parse::<GraphKey>().is_err());
    }

    #[test]
    fn graph_keys_order_by_type_then_name() {
        let mut keys = vec![
            GraphKey::new(FileType::Server, "a"),
            GraphKey::new(FileType::Client, "z"),
            GraphKey::new(FileType::Client, "b"),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["client/b", "client/z", "server/a"]);
    }

    #[test]
    fn file_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileType::Server).unwrap(), "\"server\"");
        let back: FileType = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(back, FileType::Client);
        assert!(serde_json::from_str::<FileType>("\"Client\"").is_err());
    }
}
