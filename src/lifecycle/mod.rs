//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Merge settings → Validate → Bind HTTP → Start reload (optional) → Serve
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Stop immediately
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then the HTTP listener, then reload
//! - No drain on shutdown: in-flight requests are abandoned

pub mod signals;
pub mod startup;

pub use startup::StartupError;
