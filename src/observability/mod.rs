//! Observability subsystem.
//!
//! All subsystems log through `tracing`; `logging.rs` installs the
//! subscriber at startup. Startup banners go to the log at `info`.

pub mod logging;
