//! Document sources for the rendering service.
//!
//! A [`DocumentSource`] hands out a fresh copy of the document tree every
//! time it is asked. Nothing is cached between calls, so edits to the file on
//! disk show up on the next request without restarting the server.
//!
//! ## Available Sources
//!
//! - [`FileSource`]: reads and parses a YAML or JSON file on every call
//! - [`StaticSource`]: returns a clone of an in-memory tree
//!
//! ## Example
//!
//! ```ignore
//! use vitae_source::{DocumentSource, FileSource};
//!
//! let source = FileSource::new("resume.yaml")?;
//! let tree = source.load()?;
//! ```

use log::debug;
use serde_json::Value;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the document tree.
///
/// None of these are recovered from: a malformed document fails the request
/// that tried to read it.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read document '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed YAML in '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Malformed JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// The backing-store contract: produce the current document tree.
pub trait DocumentSource: Send + Sync + Debug {
    /// Load the document, re-reading persistent storage on every call.
    fn load(&self) -> Result<Value, SourceError>;

    /// A short description of where the document comes from, for logs.
    fn describe(&self) -> String;
}

/// Serialization formats understood by [`FileSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            other => Err(SourceError::UnsupportedFormat(format!(
                "'{}' (extension '{}')",
                path.display(),
                other
            ))),
        }
    }

    /// Parses `raw` into a document tree. Mapping order is preserved.
    pub fn parse(self, raw: &str, path: &Path) -> Result<Value, SourceError> {
        match self {
            DocumentFormat::Yaml => {
                // An empty YAML stream is a null document, not an error.
                if raw.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_yaml::from_str(raw).map_err(|source| SourceError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            DocumentFormat::Json => serde_json::from_str(raw).map_err(|source| SourceError::Json {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Reads a document file from disk on every [`load`](DocumentSource::load).
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: DocumentFormat,
}

impl FileSource {
    /// Creates a source for `path`, choosing the parser from its extension.
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, SourceError> {
        let path = path.into();
        let format = DocumentFormat::from_path(&path)?;
        Ok(Self { path, format })
    }
}

impl DocumentSource for FileSource {
    fn load(&self) -> Result<Value, SourceError> {
        debug!("Reloading document from {}", self.path.display());
        let raw = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.format.parse(&raw, &self.path)
    }

    fn describe(&self) -> String {
        format!("{} ({:?})", self.path.display(), self.format)
    }
}

/// A fixed in-memory document. Each load returns an independent clone.
#[derive(Debug, Clone)]
pub struct StaticSource {
    document: Value,
}

impl StaticSource {
    pub fn new(document: Value) -> Self {
        Self { document }
    }
}

impl DocumentSource for StaticSource {
    fn load(&self) -> Result<Value, SourceError> {
        Ok(self.document.clone())
    }

    fn describe(&self) -> String {
        "in-memory document".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("resume.yaml")).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("resume.YML")).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("resume.json")).unwrap(),
            DocumentFormat::Json
        );
        assert!(matches!(
            DocumentFormat::from_path(Path::new("resume.toml")),
            Err(SourceError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_yaml_source_preserves_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resume.yaml");
        fs::write(&path, "zeta: 1\nalpha: 2\nmid:\n  - a\n  - b\n").unwrap();

        let source = FileSource::new(&path).unwrap();
        let doc = source.load().unwrap();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(doc["mid"], json!(["a", "b"]));
    }

    #[test]
    fn test_file_source_rereads_on_every_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resume.yaml");
        fs::write(&path, "name: First\n").unwrap();
        let source = FileSource::new(&path).unwrap();
        assert_eq!(source.load().unwrap()["name"], "First");

        fs::write(&path, "name: Second\n").unwrap();
        assert_eq!(source.load().unwrap()["name"], "Second");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "name: [unterminated\n").unwrap();

        let err = FileSource::new(&path).unwrap().load().unwrap_err();
        assert!(matches!(err, SourceError::Yaml { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let source = FileSource::new(dir.path().join("absent.json")).unwrap();
        assert!(matches!(source.load(), Err(SourceError::Io { .. })));
    }

    #[test]
    fn test_empty_yaml_is_null() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.yml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(FileSource::new(&path).unwrap().load().unwrap(), Value::Null);
    }

    #[test]
    fn test_json_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resume.json");
        fs::write(&path, r#"{"b": [1, 2], "a": {"x": true}}"#).unwrap();

        let source = FileSource::new(&path).unwrap();
        let doc = source.load().unwrap();
        assert_eq!(doc, json!({"b": [1, 2], "a": {"x": true}}));
        assert!(source.describe().contains("Json"));
    }

    #[test]
    fn test_static_source_returns_independent_clones() {
        let source = StaticSource::new(json!({"name": "Ada"}));
        let mut first = source.load().unwrap();
        first["name"] = json!("changed");
        assert_eq!(source.load().unwrap()["name"], "Ada");
    }
}
