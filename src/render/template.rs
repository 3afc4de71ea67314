//! HTML page shell around rendered documents.

use std::fmt::Write;

use crate::config::Stylesheet;
use crate::reload::RELOAD_ENDPOINT;

const TAILWIND_CDN: &str = r#"<script src="https://cdn.tailwindcss.com"></script>"#;

/// Page shell shared by every rendered document.
#[derive(Debug, Clone, Default)]
pub struct PageTemplate {
    stylesheets: Vec<String>,
    reload_port: Option<u16>,
}

impl PageTemplate {
    /// `reload_port` is the live side-channel port, or `None` when change
    /// notification is unavailable.
    pub fn new(stylesheets: &[Stylesheet], reload_port: Option<u16>) -> Self {
        Self {
            stylesheets: stylesheets.iter().map(|s| s.href.clone()).collect(),
            reload_port,
        }
    }

    pub fn reload_port(&self) -> Option<u16> {
        self.reload_port
    }

    /// Wrap a rendered HTML fragment in the page shell.
    pub fn render(&self, body: &str) -> String {
        let mut css_tags = String::new();
        for (i, href) in self.stylesheets.iter().enumerate() {
            if i > 0 {
                css_tags.push_str("\n  ");
            }
            let _ = write!(css_tags, r#"<link rel="stylesheet" href="{}">"#, escape_attr(href));
        }

        let reload_script = self.reload_port.map(reload_script).unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  {TAILWIND_CDN}
  {css_tags}
</head>
<body class="min-h-screen">
  <main class="max-w-5xl mx-auto p-6 prose prose-lg">{body}</main>
  {reload_script}
</body>
</html>"#
        )
    }
}

/// Browser side of the reload channel: reload on signal, reconnect on close.
fn reload_script(port: u16) -> String {
    format!(
        r#"<script>
  (function () {{
    var url = "ws://" + (location.hostname || "localhost") + ":{port}{RELOAD_ENDPOINT}";
    function connect() {{
      var socket = new WebSocket(url);
      socket.onmessage = function (event) {{
        try {{
          if (JSON.parse(event.data).command === "reload") {{ location.reload(); }}
        }} catch (_) {{}}
      }};
      socket.onclose = function () {{ setTimeout(connect, 1000); }};
    }}
    connect();
  }})();
  </script>"#
    )
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sheet(href: &str) -> Stylesheet {
        Stylesheet {
            href: href.into(),
            path: PathBuf::from("/unused"),
        }
    }

    #[test]
    fn wraps_body_in_main() {
        let page = PageTemplate::default().render("<h1>Hi</h1>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<main class="max-w-5xl mx-auto p-6 prose prose-lg"><h1>Hi</h1></main>"#));
        assert!(page.contains("cdn.tailwindcss.com"));
    }

    #[test]
    fn links_stylesheets_in_order() {
        let page = PageTemplate::new(&[sheet("/custom.css"), sheet("/css/a&b.css")], None).render("");
        let first = page.find(r#"href="/custom.css""#).unwrap();
        let second = page.find(r#"href="/css/a&amp;b.css""#).unwrap();
        assert!(first < second);
    }

    #[test]
    fn reload_script_only_with_port() {
        let without = PageTemplate::new(&[], None).render("");
        assert!(!without.contains("WebSocket"));

        let with = PageTemplate::new(&[], Some(35729)).render("");
        assert!(with.contains("new WebSocket"));
        assert!(with.contains(":35729/livereload"));
    }

    #[test]
    fn escapes_attribute_values() {
        assert_eq!(escape_attr(r#"/a"b<c>.css"#), "/a&quot;b&lt;c&gt;.css");
    }
}
