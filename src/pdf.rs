//! Bridge to an external headless browser that prints pages to PDF.
//!
//! The service never lays out PDFs itself: it points the configured program
//! at its own HTML rendering of the document and returns whatever file the
//! program writes.

use crate::config::PdfConfig;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Placeholder replaced by the page URL in the configured arguments.
pub const URL_PLACEHOLDER: &str = "{url}";
/// Placeholder replaced by the output file path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to start PDF renderer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF renderer '{program}' exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("PDF renderer produced no output at '{0}'")]
    MissingOutput(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs the configured PDF printer.
#[derive(Debug, Clone)]
pub struct PdfBridge {
    program: String,
    args: Vec<String>,
}

impl PdfBridge {
    pub fn new(config: &PdfConfig) -> Self {
        if !config.args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            warn!(
                "PDF arguments contain no '{}' placeholder; conversions will find no output",
                OUTPUT_PLACEHOLDER
            );
        }
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument list for one conversion.
    pub fn command_args(&self, url: &str, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace(URL_PLACEHOLDER, url)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    /// Prints `url` to PDF and returns the file's bytes.
    ///
    /// Waits for the subprocess without a timeout. A nonzero exit status is
    /// a failure even if a file was written. The scratch directory holding
    /// the output is removed before returning.
    pub async fn print(&self, url: &str) -> Result<Vec<u8>, PdfError> {
        let scratch = tempfile::Builder::new().prefix("vitae-pdf-").tempdir()?;
        let output = scratch.path().join("document.pdf");
        let args = self.command_args(url, &output);

        debug!("Running {} {:?}", self.program, args);
        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| PdfError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(PdfError::Exit {
                program: self.program.clone(),
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let bytes = match tokio::fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PdfError::MissingOutput(output));
            }
            Err(e) => return Err(e.into()),
        };

        info!("Printed {} ({} bytes)", url, bytes.len());
        Ok(bytes)
    }
}
