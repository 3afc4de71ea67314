//! Document rendering subsystem.
//!
//! # Data Flow
//! ```text
//! source text
//!     → front_matter.rs (strip leading `---` block)
//!     → DocumentRenderer (markdown.rs by default)
//!     → template.rs (page shell, stylesheets, reload script)
//!     → HTML page
//! ```
//!
//! # Design Decisions
//! - The converter is a trait object so routing never depends on it
//! - Metadata values are stripped, not interpreted

pub mod front_matter;
pub mod markdown;
pub mod template;

use thiserror::Error;

pub use front_matter::strip_front_matter;
pub use markdown::MarkdownRenderer;
pub use template::PageTemplate;

/// Errors from a conversion pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Failed(String),
}

/// Converts document source into an HTML fragment.
pub trait DocumentRenderer: Send + Sync {
    /// Render `source`, which has already had its front matter removed.
    fn render(&self, source: &str) -> Result<String, RenderError>;
}

/// Strip front matter from `raw` and render the rest.
pub fn render_document(renderer: &dyn DocumentRenderer, raw: &str) -> Result<String, RenderError> {
    let (_, body) = strip_front_matter(raw);
    renderer.render(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl DocumentRenderer for Upper {
        fn render(&self, source: &str) -> Result<String, RenderError> {
            Ok(source.to_uppercase())
        }
    }

    struct Broken;

    impl DocumentRenderer for Broken {
        fn render(&self, _source: &str) -> Result<String, RenderError> {
            Err(RenderError::Failed("converter unavailable".into()))
        }
    }

    #[test]
    fn renderer_receives_body_without_front_matter() {
        let html = render_document(&Upper, "---\ntitle: x\n---\nbody\n").unwrap();
        assert_eq!(html, "BODY\n");
    }

    #[test]
    fn renderer_errors_propagate() {
        let err = render_document(&Broken, "text").unwrap_err();
        assert_eq!(err.to_string(), "render failed: converter unavailable");
    }
}
