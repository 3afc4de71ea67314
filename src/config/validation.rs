//! Configuration validation and resolution.
//!
//! # Responsibilities
//! - Select the operating mode (single document or directory)
//! - Canonicalize the root and keep the target inside it
//! - Resolve stylesheet references to root-relative links
//! - Validate value ranges (ports) and detect conflicting inputs
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Runs once before any listener is bound; every error here is fatal

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::config::schema::{
    PreviewSettings, ServeMode, ServerConfig, Stylesheet, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_RELOAD_PORT, DEFAULT_STYLESHEET,
};
use crate::routing::DOCUMENT_EXTENSION;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("root directory {0} does not exist")]
    RootNotFound(PathBuf),

    #[error("root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("target document {0} is a directory")]
    TargetIsDirectory(PathBuf),

    #[error("{0} does not exist")]
    PathNotFound(PathBuf),

    #[error("a single document (--file) and a path argument cannot both be given")]
    ConflictingModes,

    #[error("a directory argument and --root cannot both be given")]
    ConflictingRoots,

    #[error("{0} must not be 0")]
    InvalidPort(&'static str),

    #[error("HTTP and live reload ports are both {0}")]
    PortCollision(u16),
}

/// Mode as requested, before any filesystem canonicalization.
enum ModeRequest {
    Single {
        target: PathBuf,
        display_name: String,
        root: Option<PathBuf>,
    },
    Directory {
        root: PathBuf,
    },
}

/// Validate `settings` and resolve them into a [`ServerConfig`].
///
/// Relative paths are resolved against `cwd`.
pub fn resolve_config(settings: &PreviewSettings, cwd: &Path) -> Result<ServerConfig, ConfigError> {
    let mut errors = Vec::new();

    let host = settings
        .host
        .clone()
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = settings.port.unwrap_or(DEFAULT_PORT);
    let reload_port = settings.reload_port.unwrap_or(DEFAULT_RELOAD_PORT);
    let reload_enabled = settings.reload.unwrap_or(true);

    if port == 0 {
        errors.push(ValidationError::InvalidPort("port"));
    }
    if reload_enabled && reload_port == 0 {
        errors.push(ValidationError::InvalidPort("live reload port"));
    }
    if reload_enabled && port != 0 && port == reload_port {
        errors.push(ValidationError::PortCollision(port));
    }

    let resolved = request_mode(settings, cwd).and_then(canonicalize_mode);
    let (root, mode) = match resolved {
        Ok(pair) => pair,
        Err(e) => {
            errors.push(e);
            return Err(ConfigError::Validation(errors));
        }
    };

    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    let stylesheets = resolve_stylesheets(&root, settings.stylesheets.as_deref());

    Ok(ServerConfig {
        root,
        mode,
        host,
        port,
        reload_port,
        reload_enabled,
        stylesheets,
    })
}

fn request_mode(settings: &PreviewSettings, cwd: &Path) -> Result<ModeRequest, ValidationError> {
    let explicit_root = settings.root.as_deref().map(|r| absolutize(cwd, r));

    match (&settings.file, &settings.path) {
        (Some(_), Some(_)) => Err(ValidationError::ConflictingModes),
        (Some(file), None) => {
            let base = explicit_root.as_deref().unwrap_or(cwd);
            Ok(ModeRequest::Single {
                target: absolutize(base, file),
                display_name: file.display().to_string(),
                root: explicit_root,
            })
        }
        (None, Some(path)) => {
            let abs = absolutize(cwd, path);
            if abs.is_dir() {
                if explicit_root.is_some() {
                    return Err(ValidationError::ConflictingRoots);
                }
                Ok(ModeRequest::Directory { root: abs })
            } else if abs.is_file() || has_document_extension(&abs) {
                Ok(ModeRequest::Single {
                    target: abs,
                    display_name: path.display().to_string(),
                    root: explicit_root,
                })
            } else {
                Err(ValidationError::PathNotFound(abs))
            }
        }
        (None, None) => Ok(ModeRequest::Directory {
            root: explicit_root.unwrap_or_else(|| cwd.to_path_buf()),
        }),
    }
}

fn canonicalize_mode(request: ModeRequest) -> Result<(PathBuf, ServeMode), ValidationError> {
    match request {
        ModeRequest::Directory { root } => Ok((canonical_root(&root)?, ServeMode::Directory)),
        ModeRequest::Single {
            target,
            display_name,
            root,
        } => {
            if target.is_dir() {
                return Err(ValidationError::TargetIsDirectory(target));
            }

            // The target may not exist yet; canonicalize its directory instead.
            let parent = target.parent().unwrap_or_else(|| Path::new("/"));
            let parent = canonical_root(parent)?;
            let target = match target.file_name() {
                Some(name) => parent.join(name),
                None => return Err(ValidationError::PathNotFound(target)),
            };

            let root = match root {
                Some(root) => {
                    let root = canonical_root(&root)?;
                    if target.starts_with(&root) {
                        root
                    } else {
                        tracing::warn!(
                            root = %root.display(),
                            target = %target.display(),
                            "Target lies outside root; serving from its directory instead"
                        );
                        parent
                    }
                }
                None => parent,
            };

            Ok((
                root,
                ServeMode::SingleDocument {
                    target,
                    display_name,
                },
            ))
        }
    }
}

fn canonical_root(path: &Path) -> Result<PathBuf, ValidationError> {
    let canonical =
        std::fs::canonicalize(path).map_err(|_| ValidationError::RootNotFound(path.to_path_buf()))?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(ValidationError::RootNotDirectory(canonical))
    }
}

/// Resolve stylesheet references against the root.
///
/// Missing files are skipped. Files outside the root cannot be served and
/// are skipped with a warning.
fn resolve_stylesheets(root: &Path, refs: Option<&[String]>) -> Vec<Stylesheet> {
    let defaults = [DEFAULT_STYLESHEET.to_string()];
    let refs = refs.unwrap_or(&defaults);

    refs.iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .filter_map(|reference| {
            let path = absolutize(root, Path::new(reference));
            let path = std::fs::canonicalize(&path).ok().filter(|p| p.is_file());
            let Some(path) = path else {
                tracing::debug!(stylesheet = reference, "Stylesheet not found, skipping");
                return None;
            };
            let Ok(relative) = path.strip_prefix(root) else {
                tracing::warn!(
                    stylesheet = %path.display(),
                    "Stylesheet is outside the root and cannot be served, skipping"
                );
                return None;
            };
            let href = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some(Stylesheet {
                href: format!("/{href}"),
                path,
            })
        })
        .collect()
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

/// Join `path` onto `base` unless absolute, then fold `.` and `..` lexically.
fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
