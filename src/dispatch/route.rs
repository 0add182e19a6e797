//! Request path classification.

use std::path::Path;

/// First path segment reserved for font assets.
pub const FONT_SEGMENT: &str = "font";
/// Extension that triggers PDF conversion.
pub const PDF_EXTENSION: &str = "pdf";
/// Extension of the page a PDF is printed from.
pub const HTML_EXTENSION: &str = "html";

/// Where a request goes after its path has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/font/<file>`: serve `file` from the asset root.
    Font { file: String },
    /// `/<name>.pdf`: print `/<name>.html` through the PDF bridge.
    Pdf { html_path: String, file_name: String },
    /// Anything else: render through the template for `path`.
    Rendered { path: String, extension: String },
    /// Nothing to route on.
    NotFound,
}

/// Classifies a normalized request path (leading `/`, no query).
pub fn classify(path: &str) -> Route {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(&last) = segments.last() else {
        return Route::NotFound;
    };

    if segments[0] == FONT_SEGMENT {
        return Route::Font {
            file: last.to_string(),
        };
    }

    let joined = format!("/{}", segments.join("/"));
    let extension = extension_of(last);
    if extension == PDF_EXTENSION {
        let stem = joined
            .strip_suffix(PDF_EXTENSION)
            .unwrap_or(&joined)
            .to_string();
        return Route::Pdf {
            html_path: format!("{stem}{HTML_EXTENSION}"),
            file_name: last.to_string(),
        };
    }

    Route::Rendered {
        path: joined,
        extension,
    }
}

/// Extension of a path segment without the dot; empty when there is none.
pub fn extension_of(segment: &str) -> String {
    Path::new(segment)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Stem of a path segment (`resume.html` → `resume`).
pub fn stem_of(segment: &str) -> String {
    Path::new(segment)
        .file_stem()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Content type for a rendered document of the given extension.
pub fn text_content_type(extension: &str) -> String {
    if extension.is_empty() {
        "text/plain".to_string()
    } else {
        format!("text/{extension}")
    }
}

/// Content type for a font file of the given extension.
pub fn font_content_type(extension: &str) -> String {
    format!("application/font-{extension}")
}
