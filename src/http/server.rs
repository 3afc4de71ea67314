//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (tracing, panic capture)
//! - Resolve each request path and pick a response strategy
//! - Render documents into the page shell
//! - Stream static assets
//!
//! Every GET and HEAD is answered, whatever the outcome of resolution.
//! A failed request never takes the server down.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::{ServeMode, ServerConfig};
use crate::http::response::PreviewError;
use crate::http::static_files;
use crate::render::{render_document, DocumentRenderer, PageTemplate};
use crate::routing::{PathResolver, ResolvedTarget};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PathResolver>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub template: Arc<PageTemplate>,
    /// Name reported when the single document is missing.
    pub document_name: Option<String>,
}

impl AppState {
    pub fn new(
        config: &ServerConfig,
        renderer: Arc<dyn DocumentRenderer>,
        reload_port: Option<u16>,
    ) -> Self {
        let document_name = match &config.mode {
            ServeMode::SingleDocument { display_name, .. } => Some(display_name.clone()),
            ServeMode::Directory => None,
        };
        Self {
            resolver: Arc::new(PathResolver::from_config(config)),
            renderer,
            template: Arc::new(PageTemplate::new(&config.stylesheets, reload_port)),
            document_name,
        }
    }
}

/// HTTP server for the preview.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// `reload_port` is `Some` only when the change side-channel is running.
    pub fn new(
        config: &ServerConfig,
        renderer: Arc<dyn DocumentRenderer>,
        reload_port: Option<u16>,
    ) -> Self {
        let state = AppState::new(config, renderer, reload_port);
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(dispatch))
            .route("/{*path}", get(dispatch))
            .with_state(state)
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for serving or in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until the future is dropped.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main request handler.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let requested = request.uri().path().to_owned();
    match respond(&state, &requested, request).await {
        Ok(response) => response,
        Err(err) => {
            if err.status().is_server_error() {
                tracing::error!(path = %requested, error = %err, "Request failed");
            } else {
                tracing::debug!(path = %requested, status = %err.status(), "Request rejected");
            }
            err.into_response()
        }
    }
}

async fn respond(
    state: &AppState,
    requested: &str,
    request: Request,
) -> Result<Response, PreviewError> {
    match state.resolver.resolve(requested).await {
        ResolvedTarget::Document(path) => {
            let raw = tokio::fs::read_to_string(&path).await?;
            let body = render_document(state.renderer.as_ref(), &raw)?;
            Ok(Html(state.template.render(&body)).into_response())
        }
        ResolvedTarget::StaticAsset(path) => Ok(static_files::serve_file(&path, request).await),
        ResolvedTarget::NotFound => Err(PreviewError::NotFound(not_found_name(state, requested))),
        ResolvedTarget::Forbidden => Err(PreviewError::Forbidden),
    }
}

fn not_found_name(state: &AppState, requested: &str) -> String {
    match &state.document_name {
        Some(name) if requested == "/" => name.clone(),
        _ => percent_decode_str(requested).decode_utf8_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{MarkdownRenderer, RenderError};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    struct Panicking;

    impl DocumentRenderer for Panicking {
        fn render(&self, _source: &str) -> Result<String, RenderError> {
            panic!("converter crashed");
        }
    }

    fn site() -> (tempfile::TempDir, ServerConfig) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("index.md"), "# Home").unwrap();
        (dir, ServerConfig::directory(root))
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn renders_index() {
        let (_dir, config) = site();
        let server = HttpServer::new(&config, Arc::new(MarkdownRenderer::default()), None);
        let request = Request::get("/").body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn other_methods_rejected() {
        let (_dir, config) = site();
        let server = HttpServer::new(&config, Arc::new(MarkdownRenderer::default()), None);
        let (status, _) = send(server.router(), Method::POST, "/").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn head_supported() {
        let (_dir, config) = site();
        let server = HttpServer::new(&config, Arc::new(MarkdownRenderer::default()), None);
        let (status, body) = send(server.router(), Method::HEAD, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn renderer_panic_becomes_500() {
        let (_dir, config) = site();
        let server = HttpServer::new(&config, Arc::new(Panicking), None);
        let (status, _) = send(server.router(), Method::GET, "/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        // The router keeps answering afterwards.
        let (status, _) = send(server.router(), Method::GET, "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn not_found_decodes_request_name() {
        let (_dir, config) = site();
        let server = HttpServer::new(&config, Arc::new(MarkdownRenderer::default()), None);
        let (status, body) = send(server.router(), Method::GET, "/no%20such").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not found: /no such");
    }

    #[tokio::test]
    async fn missing_single_document_named_in_404() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let config = ServerConfig::single_document(root.join("notes.md"));
        let server = HttpServer::new(&config, Arc::new(MarkdownRenderer::default()), None);
        let (status, body) = send(server.router(), Method::GET, "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not found: notes.md");
    }
}
