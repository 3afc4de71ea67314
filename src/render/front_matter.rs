//! Leading metadata block detection.

const FENCE: &str = "---";

/// Split `content` into its front matter block (if any) and the body.
///
/// The opening fence must be the very first line (after an optional BOM)
/// and the block ends at the next line consisting of `---` alone. An
/// unterminated block is not front matter.
pub fn strip_front_matter(content: &str) -> (Option<&str>, &str) {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(rest) = text.strip_prefix(FENCE) else {
        return (None, content);
    };
    let Some(rest) = strip_line_end(rest) else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let meta = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(meta), body);
        }
        offset += line.len();
    }

    (None, content)
}

/// Remove trailing spaces and the newline ending the opening fence line.
fn strip_line_end(rest: &str) -> Option<&str> {
    let trimmed = rest.trim_start_matches([' ', '\t']);
    trimmed
        .strip_prefix("\r\n")
        .or_else(|| trimmed.strip_prefix('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_yaml_block() {
        let (meta, body) = strip_front_matter("---\ntitle: Hi\ntags: a, b\n---\n# Body\n");
        assert_eq!(meta, Some("title: Hi\ntags: a, b\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn handles_crlf_and_bom() {
        let (meta, body) = strip_front_matter("\u{feff}---\r\ntitle: Hi\r\n---\r\ntext");
        assert_eq!(meta, Some("title: Hi\r\n"));
        assert_eq!(body, "text");
    }

    #[test]
    fn empty_block() {
        let (meta, body) = strip_front_matter("---\n---\nbody");
        assert_eq!(meta, Some(""));
        assert_eq!(body, "body");
    }

    #[test]
    fn closing_fence_at_end_of_input() {
        let (meta, body) = strip_front_matter("---\na: 1\n---");
        assert_eq!(meta, Some("a: 1\n"));
        assert_eq!(body, "");
    }

    #[test]
    fn no_block_when_not_first_line() {
        let input = "\n---\na: 1\n---\nbody";
        assert_eq!(strip_front_matter(input), (None, input));
    }

    #[test]
    fn unterminated_block_is_body() {
        let input = "---\na: 1\nno closing fence";
        assert_eq!(strip_front_matter(input), (None, input));
    }

    #[test]
    fn thematic_break_with_text_is_not_a_fence() {
        let input = "--- not a fence\nbody";
        assert_eq!(strip_front_matter(input), (None, input));
    }

    #[test]
    fn longer_rule_does_not_close_block() {
        let (meta, body) = strip_front_matter("---\na: 1\n-----\nb: 2\n---\nbody");
        assert_eq!(meta, Some("a: 1\n-----\nb: 2\n"));
        assert_eq!(body, "body");
    }
}
