//! Static asset serving.
//!
//! Files go out unmodified through `tower_http`'s [`ServeFile`], which
//! streams the body and answers range and conditional requests. The
//! content type comes from [`content_type`] so unknown extensions fall
//! back to `application/octet-stream`.

use std::path::Path;

use axum::{body::Body, extract::Request, response::Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Content type inferred from the extension, `application/octet-stream`
/// when unknown.
pub fn content_type(path: &Path) -> mime_guess::Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

/// Answer `request` with the file at `path`.
pub async fn serve_file(path: &Path, request: Request) -> Response {
    let mime = content_type(path);
    let response = match ServeFile::new_with_mime(path, &mime).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status().is_server_error() {
        let shown = path.display();
        tracing::error!(path = %shown, status = %response.status(), "Static asset failed");
    }
    response.map(Body::new)
}
