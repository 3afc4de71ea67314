//! Configuration schema definitions.
//!
//! [`PreviewSettings`] is the raw, optional-everywhere view that the TOML
//! file and the command line both deserialize into. [`ServerConfig`] is the
//! validated, immutable result shared by every subsystem.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default change-notification side-channel port.
pub const DEFAULT_RELOAD_PORT: u16 = 35729;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Stylesheet picked up from the root when none are configured.
pub const DEFAULT_STYLESHEET: &str = "custom.css";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Unvalidated settings merged from the config file, environment and CLI.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewSettings {
    /// Document or directory to serve.
    pub path: Option<PathBuf>,

    /// Single document to preview.
    pub file: Option<PathBuf>,

    /// Root directory that bounds every served file.
    pub root: Option<PathBuf>,

    /// Bind host for both listeners.
    pub host: Option<String>,

    /// HTTP port.
    pub port: Option<u16>,

    /// Change-notification side-channel port.
    pub reload_port: Option<u16>,

    /// Enable change notification.
    pub reload: Option<bool>,

    /// Stylesheet references, in link order.
    pub stylesheets: Option<Vec<String>>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: Option<String>,
}

impl PreviewSettings {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn overlay(self, other: PreviewSettings) -> PreviewSettings {
        PreviewSettings {
            path: other.path.or(self.path),
            file: other.file.or(self.file),
            root: other.root.or(self.root),
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            reload_port: other.reload_port.or(self.reload_port),
            reload: other.reload.or(self.reload),
            stylesheets: other.stylesheets.or(self.stylesheets),
            log_level: other.log_level.or(self.log_level),
        }
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// How URL paths map to source documents. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeMode {
    /// `/` renders one configured document; everything else is a static asset.
    SingleDocument {
        /// Absolute path of the document, always under the root.
        target: PathBuf,
        /// Name as the user gave it, used in messages.
        display_name: String,
    },
    /// Extensionless paths resolve to documents anywhere under the root.
    Directory,
}

/// A stylesheet linked from every rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    /// Root-relative URL, e.g. `/css/custom.css`.
    pub href: String,
    /// Absolute filesystem path.
    pub path: PathBuf,
}

/// Validated server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Canonicalized root directory.
    pub root: PathBuf,

    /// Operating mode.
    pub mode: ServeMode,

    /// Bind host.
    pub host: String,

    /// HTTP port.
    pub port: u16,

    /// Change-notification side-channel port.
    pub reload_port: u16,

    /// Whether change notification should be attempted.
    pub reload_enabled: bool,

    /// Linked stylesheets, in order.
    pub stylesheets: Vec<Stylesheet>,
}

impl ServerConfig {
    /// Directory-mode configuration with defaults, rooted at `root`.
    ///
    /// `root` must already be canonical.
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: ServeMode::Directory,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            reload_port: DEFAULT_RELOAD_PORT,
            reload_enabled: true,
            stylesheets: Vec::new(),
        }
    }

    /// Single-document configuration with defaults.
    ///
    /// The target's parent directory becomes the root; `target` must already
    /// be canonical.
    pub fn single_document(target: impl Into<PathBuf>) -> Self {
        let target = target.into();
        let root = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        let display_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            root,
            mode: ServeMode::SingleDocument {
                target,
                display_name,
            },
            ..Self::directory(PathBuf::new())
        }
    }

    /// Address the HTTP listener binds to.
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address the side-channel listener binds to.
    pub fn reload_address(&self) -> String {
        format!("{}:{}", self.host, self.reload_port)
    }

    /// Human-readable description of what is served.
    pub fn describe(&self) -> String {
        match &self.mode {
            ServeMode::SingleDocument { display_name, .. } => display_name.clone(),
            ServeMode::Directory => "directory".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_prefers_later_values() {
        let file = PreviewSettings {
            port: Some(4000),
            host: Some("0.0.0.0".into()),
            ..Default::default()
        };
        let cli = PreviewSettings {
            port: Some(5000),
            ..Default::default()
        };

        let merged = file.overlay(cli);
        assert_eq!(merged.port, Some(5000));
        assert_eq!(merged.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(merged.log_level(), "info");
    }

    #[test]
    fn settings_parse_from_toml() {
        let settings: PreviewSettings = toml::from_str(
            r#"
            root = "docs"
            port = 8000
            reload = false
            stylesheets = ["a.css", "b.css"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.root, Some(PathBuf::from("docs")));
        assert_eq!(settings.port, Some(8000));
        assert_eq!(settings.reload, Some(false));
        assert_eq!(settings.stylesheets.unwrap().len(), 2);
    }

    #[test]
    fn single_document_roots_at_parent() {
        let config = ServerConfig::single_document("/srv/notes/today.md");
        assert_eq!(config.root, PathBuf::from("/srv/notes"));
        assert_eq!(config.describe(), "today.md");
        assert_eq!(config.http_address(), "127.0.0.1:3000");
    }
}
