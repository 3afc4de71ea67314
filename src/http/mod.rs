//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, dispatch)
//!     → [routing resolves the path]
//!     → render pipeline | static_files.rs (streamed)
//!     → response.rs (failures to status + plain text)
//!     → Send to client
//! ```

pub mod response;
pub mod server;
pub mod static_files;

pub use response::PreviewError;
pub use server::{AppState, HttpServer};
