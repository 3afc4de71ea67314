//! Markdown to HTML conversion using pulldown-cmark.

use pulldown_cmark::{html, Options, Parser};

use crate::render::{DocumentRenderer, RenderError};

/// Markdown extensions to enable on top of CommonMark.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
        }
    }
}

impl MarkdownOptions {
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        opts
    }
}

/// CommonMark renderer. Raw HTML in the source passes through unescaped.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
}

impl MarkdownRenderer {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

impl DocumentRenderer for MarkdownRenderer {
    fn render(&self, source: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(source, self.options.to_pulldown_options());
        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, parser);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        MarkdownRenderer::default().render(source).unwrap()
    }

    #[test]
    fn heading_becomes_h1() {
        assert!(render("# Hello").contains("<h1>Hello</h1>"));
    }

    #[test]
    fn inline_html_preserved() {
        let html = render("Paragraph <div class=\"x\">hi</div>");
        assert!(html.contains("<div class=\"x\">hi</div>"), "{html}");
    }

    #[test]
    fn block_html_preserved() {
        let html = render("<section id=\"s\">\n\n*inner*\n\n</section>\n");
        assert!(html.contains("<section id=\"s\">"));
        assert!(html.contains("<em>inner</em>"));
    }

    #[test]
    fn gfm_extensions_enabled_by_default() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn extensions_can_be_disabled() {
        let renderer = MarkdownRenderer::new(MarkdownOptions {
            tables: false,
            footnotes: false,
            strikethrough: false,
            task_lists: false,
        });
        let html = renderer.render("~~kept~~").unwrap();
        assert!(!html.contains("<del>"));
    }
}
