//! Markdown rendering and HTML-aware truncation.

use std::sync::LazyLock;

use regex::Regex;

/// Words shown in feed descriptions and list excerpts.
pub const EXCERPT_WORDS: usize = 30;

const ELLIPSIS: &str = " …";

/// Elements that never have a closing tag.
const VOID_ELEMENTS: [&str; 9] = [
    "br", "col", "link", "base", "img", "param", "area", "hr", "input",
];

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+?>|([^<>\s]+)").expect("token pattern compiles"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^<(/)?([^\s/>]+)(?:\s[^>]*?)?(/)?\s*>$").expect("tag pattern compiles")
});

/// Render a post body from markdown to HTML.
pub fn markdown_to_html(source: &str) -> String {
    comrak::markdown_to_html(source, &comrak::Options::default())
}

/// Keep the first `limit` words of an HTML fragment.
///
/// Tags do not count as words. When the text is cut, ` …` is appended after
/// the last kept word and every element open at that word is closed,
/// innermost first.
pub fn truncate_words_html(html: &str, limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }

    let mut words = 0;
    let mut end_of_text = 0;
    let mut open_tags: Vec<String> = Vec::new();
    let mut truncated = false;

    for token in TOKEN_RE.captures_iter(html) {
        let Some(whole) = token.get(0) else {
            continue;
        };

        if token.get(1).is_some() {
            words += 1;
            if words == limit {
                end_of_text = whole.end();
            } else if words > limit {
                truncated = true;
                break;
            }
            continue;
        }
        if words >= limit {
            continue;
        }

        let Some(tag) = TAG_RE.captures(whole.as_str()) else {
            continue;
        };
        let name = tag
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        let closing = tag.get(1).is_some();
        let self_closing = tag.get(3).is_some();

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) || name.starts_with('!') {
            continue;
        }
        if closing {
            if let Some(pos) = open_tags.iter().rposition(|open| *open == name) {
                open_tags.truncate(pos);
            }
        } else {
            open_tags.push(name);
        }
    }

    if !truncated {
        return html.to_string();
    }

    let mut out = String::with_capacity(end_of_text + ELLIPSIS.len() + open_tags.len() * 8);
    out.push_str(&html[..end_of_text]);
    out.push_str(ELLIPSIS);
    for tag in open_tags.iter().rev() {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out
}

/// Markdown body as an HTML excerpt of [`EXCERPT_WORDS`] words.
pub fn excerpt(source: &str) -> String {
    truncate_words_html(&markdown_to_html(source), EXCERPT_WORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_html() {
        let html = markdown_to_html("Hello **world**");
        assert_eq!(html.trim(), "<p>Hello <strong>world</strong></p>");
    }

    #[test]
    fn test_short_text_is_untouched() {
        let html = "<p>only three words</p>";
        assert_eq!(truncate_words_html(html, 30), html);
    }

    #[test]
    fn test_truncation_closes_open_tags() {
        let html = "<p>one <em>two three</em> four</p><p>five</p>";

        assert_eq!(truncate_words_html(html, 2), "<p>one <em>two …</em></p>");
        assert_eq!(truncate_words_html(html, 3), "<p>one <em>two three …</em></p>");
    }

    #[test]
    fn test_closed_elements_are_not_reclosed() {
        let html = "<p>a b</p>\n<p>c d</p>";

        assert_eq!(truncate_words_html(html, 2), "<p>a b …</p>");
        assert_eq!(truncate_words_html(html, 3), "<p>a b</p>\n<p>c …</p>");
    }

    #[test]
    fn test_void_elements_and_exact_length() {
        let html = "<p>a<br>b <img src=\"x.png\" /> c</p>";

        assert_eq!(truncate_words_html(html, 3), html);
        assert_eq!(truncate_words_html(html, 2), "<p>a<br>b …</p>");
    }

    #[test]
    fn test_excerpt_of_long_markdown() {
        let body = (1..=40).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let out = excerpt(&body);

        assert!(out.starts_with("<p>w1 w2"));
        assert!(out.ends_with("w30 …</p>"));
        assert!(!out.contains("w31"));
    }
}
