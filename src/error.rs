use crate::engine::EngineError;
use crate::pdf::PdfError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use serde_json::json;
use vitae_source::SourceError;

/// Errors surfaced by request handling and service startup.
///
/// Lookup failures become 404s; data and subprocess failures become 500s
/// and are logged.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("File not found: {0}")]
    PathNotFound(String),

    #[error("File not found: {0}")]
    AssetNotFound(String),

    #[error("File not found: {0}")]
    TemplateMissing(String),

    #[error("Document error: {0}")]
    Source(#[from] SourceError),

    #[error("Template error: {0}")]
    Engine(#[from] EngineError),

    #[error("PDF conversion failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PathNotFound(_)
            | Self::AssetNotFound(_)
            | Self::TemplateMissing(_)
            | Self::Engine(EngineError::TemplateNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::PathNotFound(_) => "PathNotFound",
            Self::AssetNotFound(_) => "AssetNotFound",
            Self::TemplateMissing(_) | Self::Engine(EngineError::TemplateNotFound(_)) => {
                "TemplateMissing"
            }
            Self::Source(_) => "DocumentError",
            Self::Engine(_) => "RenderError",
            Self::Pdf(_) => "RendererFailure",
            Self::Config(_) => "ConfigError",
            Self::Io(_) | Self::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
