//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PreviewSettings;
use crate::config::validation::ValidationError;

/// Error type for configuration loading and resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load settings from a TOML file.
///
/// Relative paths inside the file are taken relative to the file's own
/// directory so a config can travel with its documents.
pub fn load_settings(path: &Path) -> Result<PreviewSettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut settings: PreviewSettings = toml::from_str(&content)?;

    if let Some(base) = path.parent() {
        for field in [&mut settings.path, &mut settings.file, &mut settings.root] {
            if let Some(p) = field.as_mut() {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
    }

    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(settings)
}
