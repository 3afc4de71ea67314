//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming URL path
//!     → path.rs (decode, strip query, collapse dot segments, reject escapes)
//!     → resolver.rs (mode-specific lookup against the root)
//!     → Return: Document | StaticAsset | NotFound | Forbidden
//! ```
//!
//! # Design Decisions
//! - Mode and root are fixed at startup; resolution holds no state
//! - A path with an extension is never rendered, even if it names a `.md`
//! - Directories are never listed

pub mod path;
pub mod resolver;

pub use path::{PathRejection, RequestPath};
pub use resolver::{PathResolver, ResolvedTarget};

/// Extension of convertible documents.
pub const DOCUMENT_EXTENSION: &str = "md";

/// File stem looked up when a path names a directory.
pub const INDEX_STEM: &str = "index";
