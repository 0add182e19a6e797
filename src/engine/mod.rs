//! Handlebars-backed rendering engine over a template directory.

pub mod helpers;

use handlebars::{Handlebars, no_escape};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Failed to read template directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template '{name}' failed to compile: {source}")]
    Compile {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Renders named templates against a document plus request variables.
///
/// Every file under the template directory whose name ends with the
/// template suffix is registered at construction, under its relative path
/// (suffix included). Names that miss are looked up on disk again, so a
/// template created while the service runs is picked up by the next
/// request. Dev mode is on, so edits to registered templates reload too.
pub struct RenderEngine {
    registry: RwLock<Handlebars<'static>>,
    template_dir: PathBuf,
    /// Canonical template directory for containment checks
    canonical_dir: Option<PathBuf>,
    suffix: String,
}

impl RenderEngine {
    pub fn new<P: AsRef<Path>>(template_dir: P, suffix: &str) -> Result<Self, EngineError> {
        let template_dir = template_dir.as_ref().to_path_buf();
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.set_dev_mode(true);
        // Output is HTML, CSS or text produced by trusted templates.
        registry.register_escape_fn(no_escape);
        helpers::register_all(&mut registry);

        let mut found = Vec::new();
        collect_templates(&template_dir, &template_dir, suffix, &mut found)?;
        found.sort();

        for (name, path) in &found {
            debug!("Registering template '{}' from {}", name, path.display());
            register(&mut registry, name, path)?;
        }

        if found.is_empty() {
            warn!(
                "No '*{}' templates found in {}",
                suffix,
                template_dir.display()
            );
        } else {
            info!(
                "Loaded {} templates from {}",
                found.len(),
                template_dir.display()
            );
        }

        Ok(Self {
            registry: RwLock::new(registry),
            canonical_dir: template_dir.canonicalize().ok(),
            template_dir,
            suffix: suffix.to_string(),
        })
    }

    /// The template looked up for a request path such as `resume.html`.
    pub fn template_name(&self, document_path: &str) -> String {
        format!("{}{}", document_path.trim_start_matches('/'), self.suffix)
    }

    /// Whether `name` can be rendered right now.
    ///
    /// A name whose file exists on disk but was not registered yet is
    /// compiled and registered here. A name whose file has been removed
    /// reports `false`.
    pub fn ensure_template(&self, name: &str) -> Result<bool, EngineError> {
        let Some(path) = self.template_path(name) else {
            return Ok(false);
        };
        if self.read().has_template(name) {
            return Ok(true);
        }

        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        if !registry.has_template(name) {
            register(&mut registry, name, &path)?;
            info!("Registered new template '{}' from {}", name, path.display());
        }
        Ok(true)
    }

    /// Renders `name` with the document's top-level keys and `extra_vars`
    /// in scope. Extra variables shadow document keys of the same name;
    /// a document whose root is not a mapping is exposed as `document`.
    pub fn render(
        &self,
        name: &str,
        document: &Value,
        extra_vars: Map<String, Value>,
    ) -> Result<String, EngineError> {
        if !self.ensure_template(name)? {
            return Err(EngineError::TemplateNotFound(name.to_string()));
        }

        let mut context = match document {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("document".to_string(), other.clone());
                map
            }
        };
        context.extend(extra_vars);

        Ok(self.read().render(name, &Value::Object(context))?)
    }

    fn read(&self) -> RwLockReadGuard<'_, Handlebars<'static>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The file behind `name`, if it is a suffixed regular file strictly
    /// inside the template directory.
    fn template_path(&self, name: &str) -> Option<PathBuf> {
        if !name.ends_with(&self.suffix) {
            return None;
        }
        let relative = Path::new(name);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }

        let path = self.template_dir.join(relative);
        if !path.is_file() {
            return None;
        }
        // Symlinks may still point outside the directory.
        if let (Ok(canonical), Some(dir)) = (path.canonicalize(), &self.canonical_dir)
            && !canonical.starts_with(dir)
        {
            return None;
        }
        Some(path)
    }
}

fn register(
    registry: &mut Handlebars<'static>,
    name: &str,
    path: &Path,
) -> Result<(), EngineError> {
    registry
        .register_template_file(name, path)
        .map_err(|source| EngineError::Compile {
            name: name.to_string(),
            source: Box::new(source),
        })
}

fn collect_templates(
    root: &Path,
    dir: &Path,
    suffix: &str,
    found: &mut Vec<(String, PathBuf)>,
) -> Result<(), EngineError> {
    let entries = fs::read_dir(dir).map_err(|source| EngineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| EngineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_templates(root, &path, suffix, found)?;
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if name.ends_with(suffix) && path.is_file() {
            found.push((name, path));
        }
    }
    Ok(())
}
