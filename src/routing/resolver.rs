//! Request path resolution.
//!
//! # Responsibilities
//! - Map a URL path to a file under the root
//! - Decide between convertible document and static asset
//! - Apply index fallback for extensionless paths (directory mode)
//!
//! # Resolution Order (directory mode, no extension)
//! 1. `/` → `root/index.md`
//! 2. `/about` → `root/about.md`
//! 3. `/about` → `root/about/index.md`
//! 4. static asset lookup
//!
//! Symbolic links are followed. The containment check runs on the
//! normalized path, not on where a link points.

use std::path::{Path, PathBuf};

use crate::config::{ServeMode, ServerConfig};
use crate::routing::path::{is_within, RequestPath};
use crate::routing::{DOCUMENT_EXTENSION, INDEX_STEM};

/// Outcome of resolving one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// A source document to render.
    Document(PathBuf),
    /// A file to serve verbatim.
    StaticAsset(PathBuf),
    /// Nothing at this path.
    NotFound,
    /// Outside the root, or a directory.
    Forbidden,
}

/// Maps request paths onto the filesystem, confined to one root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    mode: ServeMode,
}

impl PathResolver {
    /// Create a resolver for a canonical `root`.
    pub fn new(root: impl Into<PathBuf>, mode: ServeMode) -> Self {
        Self {
            root: root.into(),
            mode,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.root.clone(), config.mode.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a raw URL path.
    pub async fn resolve(&self, url_path: &str) -> ResolvedTarget {
        let path = match RequestPath::parse(url_path) {
            Ok(path) => path,
            Err(rejection) => {
                tracing::debug!(path = %url_path, reason = %rejection, "Rejected request path");
                return ResolvedTarget::Forbidden;
            }
        };

        let joined = path.join_onto(&self.root);
        if !is_within(&self.root, &joined) {
            return ResolvedTarget::Forbidden;
        }

        match &self.mode {
            ServeMode::SingleDocument { target, .. } => {
                if path.is_root() {
                    return if is_file(target).await {
                        ResolvedTarget::Document(target.clone())
                    } else {
                        ResolvedTarget::NotFound
                    };
                }
            }
            ServeMode::Directory => {
                if !path.has_extension() {
                    if let Some(document) = self.find_document(&path).await {
                        return ResolvedTarget::Document(document);
                    }
                    if path.is_root() {
                        return ResolvedTarget::NotFound;
                    }
                }
            }
        }

        resolve_static(joined).await
    }

    async fn find_document(&self, path: &RequestPath) -> Option<PathBuf> {
        let index = format!("{INDEX_STEM}.{DOCUMENT_EXTENSION}");
        let candidates = if path.is_root() {
            vec![self.root.join(&index)]
        } else {
            vec![
                path.join_with_extension(&self.root, DOCUMENT_EXTENSION),
                path.join_onto(&self.root).join(&index),
            ]
        };

        for candidate in candidates {
            if is_file(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

async fn resolve_static(path: PathBuf) -> ResolvedTarget {
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => ResolvedTarget::Forbidden,
        Ok(_) => ResolvedTarget::StaticAsset(path),
        Err(_) => ResolvedTarget::NotFound,
    }
}
