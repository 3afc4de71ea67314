//! Command-line interface.
//!
//! Every flag can also be supplied through a `FLOWERSTALL_*` environment
//! variable. Values given here override the optional TOML config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::PreviewSettings;

#[derive(Debug, Parser)]
#[command(name = "flowerstall")]
#[command(version, about = "Preview Markdown documents in the browser with live reload", long_about = None)]
pub struct Cli {
    /// Document to preview, or a directory to serve
    pub path: Option<PathBuf>,

    /// Single document to preview
    #[arg(long, env = "FLOWERSTALL_FILE", conflicts_with = "path")]
    pub file: Option<PathBuf>,

    /// Root directory; nothing outside it is served
    #[arg(long, env = "FLOWERSTALL_ROOT")]
    pub root: Option<PathBuf>,

    /// HTTP port [default: 3000]
    #[arg(short, long, env = "FLOWERSTALL_PORT")]
    pub port: Option<u16>,

    /// Live reload port [default: 35729]
    #[arg(long = "lr-port", env = "FLOWERSTALL_LR_PORT")]
    pub reload_port: Option<u16>,

    /// Disable live reload
    #[arg(long = "no-lr", alias = "no-livereload", env = "FLOWERSTALL_NO_LR")]
    pub no_reload: bool,

    /// Comma-separated stylesheets to link [default: custom.css if present]
    #[arg(long, env = "FLOWERSTALL_CSS", value_delimiter = ',')]
    pub css: Vec<String>,

    /// Bind host [default: 127.0.0.1]
    #[arg(long, env = "FLOWERSTALL_HOST")]
    pub host: Option<String>,

    /// TOML config file
    #[arg(short, long, env = "FLOWERSTALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FLOWERSTALL_LOG")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Settings given on the command line; unset flags stay `None`.
    pub fn settings(&self) -> PreviewSettings {
        let stylesheets: Vec<String> = self
            .css
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        PreviewSettings {
            path: self.path.clone(),
            file: self.file.clone(),
            root: self.root.clone(),
            host: self.host.clone(),
            port: self.port,
            reload_port: self.reload_port,
            reload: self.no_reload.then_some(false),
            stylesheets: (!stylesheets.is_empty()).then_some(stylesheets),
            log_level: self.log_level.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("flowerstall").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_all_flags() {
        let cli = parse(&[
            "--file", "notes.md", "--root", "docs", "-p", "4000", "--lr-port", "4001", "--no-lr",
            "--css", "a.css, b.css,,", "--host", "0.0.0.0",
        ]);
        let settings = cli.settings();

        assert_eq!(settings.file, Some(PathBuf::from("notes.md")));
        assert_eq!(settings.root, Some(PathBuf::from("docs")));
        assert_eq!(settings.port, Some(4000));
        assert_eq!(settings.reload_port, Some(4001));
        assert_eq!(settings.reload, Some(false));
        assert_eq!(
            settings.stylesheets,
            Some(vec!["a.css".to_string(), "b.css".to_string()])
        );
        assert_eq!(settings.host.as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn unset_flags_do_not_override_file_settings() {
        let settings = parse(&["docs"]).settings();
        assert_eq!(settings.path, Some(PathBuf::from("docs")));
        assert_eq!(settings.port, None);
        assert_eq!(settings.reload, None);
        assert_eq!(settings.stylesheets, None);
    }

    #[test]
    fn no_livereload_alias_accepted() {
        assert!(parse(&["--no-livereload"]).no_reload);
    }

    #[test]
    fn file_conflicts_with_path() {
        let result = Cli::try_parse_from(["flowerstall", "docs", "--file", "a.md"]);
        assert!(result.is_err());
    }
}
