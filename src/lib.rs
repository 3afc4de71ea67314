//! flowerstall: a local preview server for Markdown documents.
//!
//! Serves one document or a directory tree over HTTP, rendering Markdown to
//! HTML and pushing reload signals to open pages when files change.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod render;
pub mod routing;

pub use config::{ServeMode, ServerConfig};
pub use http::HttpServer;
pub use lifecycle::StartupError;
pub use reload::ReloadRegistry;
