//! Plain-text extraction from HTML payloads.
//!
//! This is deliberately a tag stripper, not an HTML parser: it only has to
//! produce stable, human-readable text so that two fetches of the same page
//! compare equal and a changed page diffs at the word level.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body\b[^>]*>(.*?)(?:</body\s*>|\z)").expect("body pattern is valid")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static HIDDEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)<script\b[^>]*>.*?</script\s*>",
        r"|<style\b[^>]*>.*?</style\s*>",
        r"|<noscript\b[^>]*>.*?</noscript\s*>",
        r"|<template\b[^>]*>.*?</template\s*>",
    ))
    .expect("hidden block pattern is valid")
});

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)</?(?:address|article|aside|blockquote|br|dd|div|dl|dt|figcaption|figure",
        r"|footer|form|h[1-6]|header|hr|li|main|nav|ol|p|pre|section|table|td|th|tr|ul)\b[^>]*>",
    ))
    .expect("block tag pattern is valid")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
        .expect("entity pattern is valid")
});

/// Extract the visible body text of an HTML document.
///
/// Takes the `<body>` content (the whole input if there is none), drops
/// scripts, styles and comments, breaks lines at block-level tags, strips
/// the remaining tags, decodes entities and collapses whitespace. Blank
/// lines are dropped.
pub fn extract_body_text(html: &str) -> String {
    let body = BODY
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map_or(html, |m| m.as_str());

    let text = COMMENT.replace_all(body, "");
    let text = HIDDEN_BLOCK.replace_all(&text, "");
    let text = BLOCK_TAG.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = ENTITY.replace_all(&text, decode_entity);

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entity(caps: &Captures<'_>) -> String {
    let decoded = match &caps[1] {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "copy" => Some('©'),
        "reg" => Some('®'),
        "hellip" => Some('…'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        name => numeric_entity(name),
    };
    decoded.map_or_else(|| caps[0].to_string(), String::from)
}

fn numeric_entity(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_takes_body_content_only() {
        let html = "<html><head><title>Ignored</title></head><body><p>Hello</p></body></html>";
        assert_eq!(extract_body_text(html), "Hello");
    }

    #[test]
    fn test_without_body_uses_whole_input() {
        assert_eq!(
            extract_body_text("plain <b>bold</b> text"),
            "plain bold text"
        );
    }

    #[test]
    fn test_drops_scripts_styles_and_comments() {
        let html = r#"<body>
            <script type="text/javascript">var x = "<p>no</p>";</script>
            <style>p { color: red }</style>
            <!-- hidden <p>comment</p> -->
            <p>Visible</p>
        </body>"#;
        assert_eq!(extract_body_text(html), "Visible");
    }

    #[test]
    fn test_block_tags_break_lines() {
        let html = "<body><h1>Title</h1><div>first</div><ul><li>one</li></ul>a<br>b</body>";
        assert_eq!(extract_body_text(html), "Title\nfirst\none\na\nb");
    }

    #[test]
    fn test_inline_tags_do_not_break_lines() {
        let html = "<body><p>The price is <strong>$10</strong> today.</p></body>";
        assert_eq!(extract_body_text(html), "The price is $10 today.");
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<body>\n\n   lots   of\t\tspace   \n\n\n  here </body>";
        assert_eq!(extract_body_text(html), "lots of space\nhere");
    }

    #[test]
    fn test_decodes_entities_after_stripping_tags() {
        let html = "<body>&lt;b&gt; &amp; &quot;x&quot; &#39;y&#39; &#x41;&nbsp;&unknown;</body>";
        assert_eq!(extract_body_text(html), "<b> & \"x\" 'y' A &unknown;");
    }
}
