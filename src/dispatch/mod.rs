//! Request dispatch: parse the path, classify it, then serve a font, a
//! rendered document or a PDF. Every failure funnels into [`ServiceError`].

pub mod request;
pub mod route;

use crate::error::{Result, ServiceError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{Uri, header},
    response::{IntoResponse, Response},
};
use log::info;
use request::RequestContext;
use route::{Route, extension_of, font_content_type, text_content_type};
use std::sync::Arc;
use vitae_traits::ResourceError;

/// Entry point for every `GET`.
pub async fn dispatch(State(state): State<AppState>, uri: Uri) -> Result<Response> {
    let ctx = RequestContext::parse(&uri, &state.default_document, &state.format);
    info!("GET {} -> {:?}", uri, ctx.route);

    match ctx.route.clone() {
        Route::Font { file } => serve_font(state, ctx, file).await,
        Route::Pdf {
            html_path,
            file_name,
        } => serve_pdf(state, ctx, html_path, file_name).await,
        Route::Rendered { path, extension } => serve_rendered(state, ctx, path, extension).await,
        Route::NotFound => Err(ServiceError::PathNotFound(ctx.path)),
    }
}

/// Runs filesystem and template work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::Internal(format!("blocking task failed: {e}")))?
}

async fn serve_font(state: AppState, ctx: RequestContext, file: String) -> Result<Response> {
    let content_type = font_content_type(&extension_of(&file));
    let assets = Arc::clone(&state.assets);
    let data = blocking(move || {
        if !assets.exists(&file) {
            return Err(ServiceError::AssetNotFound(ctx.path));
        }
        assets.load(&file).map_err(|e| match e {
            ResourceError::NotFound(_) => ServiceError::AssetNotFound(ctx.path),
            other => ServiceError::Internal(other.to_string()),
        })
    })
    .await?;

    Ok((
        [(header::CONTENT_TYPE, content_type)],
        Arc::unwrap_or_clone(data),
    )
        .into_response())
}

async fn serve_rendered(
    state: AppState,
    ctx: RequestContext,
    path: String,
    extension: String,
) -> Result<Response> {
    let vars = ctx.template_vars();
    let body = blocking(move || {
        let name = state.engine.template_name(&path);
        // A missing template wins over a broken document.
        if !state.engine.ensure_template(&name)? {
            return Err(ServiceError::TemplateMissing(path));
        }
        let document = state.source.load()?;
        Ok(state.engine.render(&name, &document, vars)?)
    })
    .await?;

    Ok((
        [(header::CONTENT_TYPE, text_content_type(&extension))],
        body,
    )
        .into_response())
}

async fn serve_pdf(
    state: AppState,
    ctx: RequestContext,
    html_path: String,
    file_name: String,
) -> Result<Response> {
    let engine = Arc::clone(&state.engine);
    let name = engine.template_name(&html_path);
    if !blocking(move || Ok(engine.ensure_template(&name)?)).await? {
        return Err(ServiceError::TemplateMissing(ctx.path));
    }

    let url = page_url(&state.base_url, &html_path, ctx.query.raw());
    let bytes = state.pdf.print(&url).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// URL of the HTML page a PDF is printed from. The query is kept so
/// formatting overrides reach the printed page.
pub fn page_url(base_url: &str, html_path: &str, raw_query: &str) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), html_path);
    if !raw_query.is_empty() {
        url.push('?');
        url.push_str(raw_query);
    }
    url
}
