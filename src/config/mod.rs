//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! flowerstall.toml (optional)      CLI flags / FLOWERSTALL_* env
//!     → loader.rs (parse)              → cli.rs (clap)
//!              \                        /
//!               PreviewSettings::overlay
//!                        → validation.rs (mode selection, canonicalization)
//!                        → ServerConfig (validated, immutable)
//!                        → handed to each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is resolved once; the operating mode never changes at runtime
//! - Every setting has a default, so no input at all serves the cwd
//! - Validation separates syntactic (serde/clap) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_settings, ConfigError};
pub use schema::{PreviewSettings, ServeMode, ServerConfig, Stylesheet};
pub use validation::{resolve_config, ValidationError};
