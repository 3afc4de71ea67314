//! flowerstall
//!
//! Local preview server for Markdown documents.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser ──GET──▶ http::server ──▶ routing::resolver ──▶ render ──▶ HTML page
//!                         │                                    (or static_files)
//!                         │
//!   Browser ◀──WS── reload::channel ◀── reload::registry ◀── reload::watcher ◀── filesystem
//!
//!   config (cli + toml) ──▶ lifecycle::startup ──▶ wires everything above
//! ```

use std::process::ExitCode;

use clap::Parser;

use flowerstall::config::Cli;
use flowerstall::lifecycle::startup;
use flowerstall::observability::logging;
use flowerstall::StartupError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("flowerstall: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let settings = startup::collect_settings(&cli)?;
    logging::init(settings.log_level());

    let config = startup::resolve(&settings)?;
    tracing::debug!(?config, "Configuration resolved");

    startup::run(config).await
}
