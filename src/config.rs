use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `VITAE__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "VITAE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub format: FormatDefaults,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL the PDF renderer uses to reach this service. Derived from
    /// the bound address when unset.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// The résumé document (YAML or JSON).
    pub document: PathBuf,
    /// Templates and the fonts they reference.
    pub template_dir: PathBuf,
    /// Document served for `/`.
    pub default_document: String,
    /// Appended to a request path to find its template.
    pub template_suffix: String,
}

/// Defaults for the per-request formatting options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDefaults {
    pub indent_incr: i64,
    pub bullet_char: String,
    pub prevent_breaks: bool,
}

/// External PDF printer invocation. `{url}` and `{output}` in `args` are
/// substituted per conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            public_url: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            document: PathBuf::from("resume.yaml"),
            template_dir: PathBuf::from("templates"),
            default_document: "resume.html".to_string(),
            template_suffix: ".hbs".to_string(),
        }
    }
}

impl Default for FormatDefaults {
    fn default() -> Self {
        Self {
            indent_incr: 2,
            bullet_char: "-".to_string(),
            prevent_breaks: false,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            program: "chromium".to_string(),
            args: vec![
                "--headless".to_string(),
                "--disable-gpu".to_string(),
                "--no-pdf-header-footer".to_string(),
                "--print-to-pdf={output}".to_string(),
                "{url}".to_string(),
            ],
        }
    }
}

impl Config {
    /// Builds the configuration from, in increasing precedence: built-in
    /// defaults, an optional TOML file, `VITAE__*` environment variables,
    /// and explicit overrides (typically command-line flags).
    pub fn load(
        file: Option<&Path>,
        overrides: &[(&str, String)],
    ) -> Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        for (key, value) in overrides {
            builder = builder.set_override(*key, value.as_str())?;
        }

        builder.build()?.try_deserialize()
    }
}
