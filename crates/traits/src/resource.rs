//! ResourceProvider trait for static assets served next to rendered documents.
//!
//! Fonts referenced by stylesheets are the main consumer: the service looks
//! them up by bare file name and streams the bytes back unchanged.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for asset lookups.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared resource data type (reference-counted bytes).
pub type SharedResourceData = Arc<Vec<u8>>;

/// Loads named assets from some backing location.
///
/// Implementations must be safe to share between request workers; the
/// service holds one provider behind an `Arc` for its whole lifetime.
pub trait ResourceProvider: Send + Sync + Debug {
    /// Load a resource by its path relative to the provider root.
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError>;

    /// Check whether `path` names a loadable regular resource.
    fn exists(&self, path: &str) -> bool;

    /// Base directory used to resolve relative paths, if any.
    fn base_path(&self) -> Option<&str> {
        None
    }

    /// Human-readable provider name for log lines.
    fn name(&self) -> &'static str;
}

/// An in-memory resource provider.
///
/// Handy for tests and for embedding a fixed set of fonts in the binary.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, path: impl Into<String>, data: Vec<u8>) -> Result<(), ResourceError> {
        let path = path.into();
        let mut resources = self
            .resources
            .write()
            .map_err(|_| ResourceError::LoadFailed {
                path: path.clone(),
                message: "resource store lock poisoned".to_string(),
            })?;
        resources.insert(path, Arc::new(data));
        Ok(())
    }

    /// Builder-style variant of [`add`](Self::add) for fixtures.
    pub fn with(self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut resources) = self.resources.write() {
            resources.insert(path.into(), Arc::new(data.into()));
        }
        self
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let resources = self
            .resources
            .read()
            .map_err(|_| ResourceError::LoadFailed {
                path: path.to_string(),
                message: "resource store lock poisoned".to_string(),
            })?;
        resources
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.resources
            .read()
            .map(|r| r.contains_key(path))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}
