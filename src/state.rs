use crate::config::{Config, FormatDefaults};
use crate::dispatch::request::FormatOptions;
use crate::engine::RenderEngine;
use crate::error::{Result, ServiceError};
use crate::pdf::PdfBridge;
use log::info;
use std::sync::Arc;
use vitae_resource::FilesystemResourceProvider;
use vitae_source::{DocumentSource, FileSource};
use vitae_traits::ResourceProvider;

/// Shared, read-only component graph handed to every request.
#[derive(Clone)]
pub struct AppState {
    /// Reloaded on every render
    pub source: Arc<dyn DocumentSource>,

    pub engine: Arc<RenderEngine>,

    /// Fonts, served from the template directory
    pub assets: Arc<dyn ResourceProvider>,

    pub pdf: Arc<PdfBridge>,

    /// Document served for `/`, e.g. `resume.html`
    pub default_document: Arc<str>,

    /// Formatting defaults before query overrides
    pub format: FormatOptions,

    /// Where the PDF renderer can reach this service
    pub base_url: Arc<str>,
}

impl AppState {
    /// Builds every component from `config`.
    pub fn from_config(config: &Config, base_url: impl Into<String>) -> Result<Self> {
        let source = FileSource::new(&config.paths.document)?;
        let engine = RenderEngine::new(&config.paths.template_dir, &config.paths.template_suffix)?;
        let assets = FilesystemResourceProvider::new(&config.paths.template_dir);
        let base_url: String = base_url.into();

        info!(
            "Document {}, templates {}, PDF renderer '{}', base URL {}",
            source.describe(),
            config.paths.template_dir.display(),
            config.pdf.program,
            base_url
        );
        info!(
            "Fonts served by {} from {}",
            assets.name(),
            assets.base_path().unwrap_or("?")
        );

        Ok(Self {
            source: Arc::new(source),
            engine: Arc::new(engine),
            assets: Arc::new(assets),
            pdf: Arc::new(PdfBridge::new(&config.pdf)),
            default_document: config.paths.default_document.as_str().into(),
            format: format_options(&config.format)?,
            base_url: base_url.into(),
        })
    }

    /// Replaces the document source, e.g. with a fixed in-memory document.
    pub fn with_source(mut self, source: impl DocumentSource + 'static) -> Self {
        info!("Document {}", source.describe());
        self.source = Arc::new(source);
        self
    }

    /// Replaces the font provider.
    pub fn with_assets(mut self, assets: impl ResourceProvider + 'static) -> Self {
        info!("Fonts served by {}", assets.name());
        self.assets = Arc::new(assets);
        self
    }
}

fn format_options(defaults: &FormatDefaults) -> Result<FormatOptions> {
    let mut chars = defaults.bullet_char.chars();
    let bullet_char = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(ServiceError::Config(format!(
                "format.bullet_char must be a single character, got '{}'",
                defaults.bullet_char
            )));
        }
    };
    Ok(FormatOptions {
        indent_incr: defaults.indent_incr,
        bullet_char,
        prevent_breaks: defaults.prevent_breaks,
    })
}
