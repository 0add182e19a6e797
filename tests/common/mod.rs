pub mod fixtures;

use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;
use vitae::config::{Config, PdfConfig};
use vitae::{AppState, router};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A document, a template directory and a service built over them.
pub struct Site {
    pub dir: TempDir,
    pub config: Config,
}

impl Site {
    /// The standard fixture site, converting PDFs with `pdf`.
    pub fn new(pdf: PdfConfig) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(&templates).expect("create template dir");

        for (name, body) in fixtures::TEMPLATES {
            std::fs::write(templates.join(name), body).expect("write template");
        }
        std::fs::write(templates.join(fixtures::FONT_NAME), fixtures::FONT_BYTES)
            .expect("write font");
        std::fs::write(dir.path().join("resume.yaml"), fixtures::RESUME_YAML)
            .expect("write document");

        let mut config = Config::default();
        config.paths.document = dir.path().join("resume.yaml");
        config.paths.template_dir = templates;
        config.pdf = pdf;

        Self { dir, config }
    }

    /// Fixture site whose PDF renderer always succeeds.
    pub fn standard() -> Self {
        Self::new(fixtures::fake_printer())
    }

    pub fn document_path(&self) -> PathBuf {
        self.config.paths.document.clone()
    }

    pub fn write_document(&self, body: &str) {
        std::fs::write(self.document_path(), body).expect("rewrite document");
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn state(&self) -> AppState {
        AppState::from_config(&self.config, "http://localhost:8080").expect("build state")
    }

    pub fn template_dir(&self) -> &Path {
        &self.config.paths.template_dir
    }

    pub async fn get(&self, uri: &str) -> Fetched {
        get_from(self.state(), uri).await
    }

    pub async fn request(&self, request: Request<Body>) -> Fetched {
        send(self.state(), request).await
    }
}

/// `GET uri` against a router over `state`.
pub async fn get_from(state: AppState, uri: &str) -> Fetched {
    send(
        state,
        Request::get(uri).body(Body::empty()).expect("request"),
    )
    .await
}

async fn send(state: AppState, request: Request<Body>) -> Fetched {
    let response = router(state)
        .oneshot(request)
        .await
        .expect("router is infallible");
    Fetched::read(response).await
}

/// A response with its body collected.
pub struct Fetched {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub disposition: Option<String>,
    pub body: Vec<u8>,
}

impl Fetched {
    async fn read(response: Response<Body>) -> Self {
        let status = response.status();
        let header_text = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header_text(header::CONTENT_TYPE);
        let disposition = header_text(header::CONTENT_DISPOSITION);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body")
            .to_vec();
        Self {
            status,
            content_type,
            disposition,
            body,
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The body with the per-request cache-busting line removed.
    pub fn stable_text(&self) -> String {
        self.text()
            .lines()
            .filter(|line| !line.starts_with(fixtures::RANDOM_LINE_PREFIX))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }
}
