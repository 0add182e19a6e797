//! Directory-backed asset provider.
//!
//! Only regular files strictly inside the base directory are served. Absolute
//! paths and `..` components are refused before touching the filesystem.

use log::debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use vitae_traits::{ResourceError, ResourceProvider, SharedResourceData};

/// Loads assets relative to a base directory.
#[derive(Debug)]
pub struct FilesystemResourceProvider {
    base_path: PathBuf,
    /// Canonicalized base path for containment checks
    canonical_base: Option<PathBuf>,
}

impl FilesystemResourceProvider {
    /// Creates a provider rooted at `base_path`.
    ///
    /// The base is canonicalized eagerly; if it does not exist yet the
    /// provider falls back to lexical checks only.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base = base_path.as_ref().to_path_buf();
        let canonical = base.canonicalize().ok();
        Self {
            base_path: base,
            canonical_base: canonical,
        }
    }

    /// Resolves `path` under the base, or `None` if it would escape it.
    fn resolve_path_safe(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        if relative.is_absolute() {
            return None;
        }
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return None;
        }

        let full_path = self.base_path.join(relative);

        if let Ok(canonical) = full_path.canonicalize()
            && let Some(ref base) = self.canonical_base
        {
            // Symlinks may still point outside the base.
            return canonical.starts_with(base).then_some(canonical);
        }

        Some(full_path)
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let full_path = self
            .resolve_path_safe(path)
            .ok_or_else(|| ResourceError::NotFound(format!("{} (outside asset root)", path)))?;

        if !full_path.is_file() {
            return Err(ResourceError::NotFound(path.to_string()));
        }

        debug!("Loading asset {}", full_path.display());
        std::fs::read(&full_path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(path.to_string())
            } else {
                ResourceError::LoadFailed {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve_path_safe(path)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn base_path(&self) -> Option<&str> {
        self.base_path.to_str()
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}
