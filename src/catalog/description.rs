//! Description text for catalog entries.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::model::Entry;
use super::ABBREV_TEXT_LEN;

/// Converts HTML markup into plain display text.
pub trait HtmlRenderer {
    fn render(&self, html: &str) -> String;
}

/// A small tag-stripping [`HtmlRenderer`].
///
/// Block-level breaks become newlines, all other tags are dropped and the
/// common character references are decoded. Good enough for feed summaries,
/// which rarely contain more than paragraphs and emphasis.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</p\s*>|</div\s*>|</li\s*>").expect("valid regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\n\s*\n\s*").expect("valid regex"));

impl HtmlRenderer for PlainTextRenderer {
    fn render(&self, html: &str) -> String {
        let text = BREAK_RE.replace_all(html, "\n");
        let text = TAG_RE.replace_all(&text, "");
        let text = ENTITY_RE.replace_all(&text, |caps: &Captures| decode_entity(&caps[0], &caps[1]));
        let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}

fn decode_entity(whole: &str, name: &str) -> String {
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "hellip" => Some('…'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        _ => name
            .strip_prefix("#x")
            .or_else(|| name.strip_prefix("#X"))
            .map(|hex| u32::from_str_radix(hex, 16))
            .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
            .and_then(Result::ok)
            .and_then(char::from_u32),
    };

    decoded.map_or_else(|| whole.to_string(), String::from)
}

/// Cut `text` to [`ABBREV_TEXT_LEN`] characters plus an ellipsis when it is
/// longer than that. Counts characters, not bytes, and ignores word
/// boundaries.
pub fn abbreviate_text(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(ABBREV_TEXT_LEN) {
        text.truncate(cut);
        text.push('…');
    }
    text
}

/// The plain-text description of `entry`.
///
/// Content wins over summary; an entry with neither gets an empty string.
/// With `abbreviate` set the result is shortened by [`abbreviate_text`].
pub fn select_description(entry: &Entry, abbreviate: bool, renderer: &dyn HtmlRenderer) -> String {
    let html = entry
        .content
        .as_ref()
        .map(|content| content.text.as_str())
        .or(entry.summary.as_deref())
        .unwrap_or_default();

    let text = if html.is_empty() {
        String::new()
    } else {
        renderer.render(html)
    };

    if abbreviate {
        abbreviate_text(text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Passes markup through untouched so length checks are exact.
    struct Verbatim;

    impl HtmlRenderer for Verbatim {
        fn render(&self, html: &str) -> String {
            html.to_string()
        }
    }

    #[test]
    fn long_summary_is_abbreviated_to_150_chars_and_ellipsis() {
        let entry = Entry::new("t").with_summary("A".repeat(200));

        let short = select_description(&entry, true, &Verbatim);
        assert_eq!(short.chars().count(), 151);
        assert!(short.ends_with('…'));
        assert_eq!(&short[..150], "A".repeat(150));

        let full = select_description(&entry, false, &Verbatim);
        assert_eq!(full.chars().count(), 200);
    }

    #[test]
    fn text_at_the_limit_is_not_abbreviated() {
        let exact = "B".repeat(ABBREV_TEXT_LEN);
        assert_eq!(abbreviate_text(exact.clone()), exact);
    }

    #[test]
    fn abbreviation_counts_characters_not_bytes() {
        let text = "é".repeat(160);
        let short = abbreviate_text(text);
        assert_eq!(short.chars().count(), 151);
        assert!(short.starts_with("éé"));
    }

    #[test]
    fn content_wins_over_summary() {
        let entry = Entry::new("t").with_summary("summary").with_content("content");
        assert_eq!(select_description(&entry, false, &Verbatim), "content");
    }

    #[test]
    fn summary_used_without_content() {
        let entry = Entry::new("t").with_summary("summary");
        assert_eq!(select_description(&entry, true, &Verbatim), "summary");
    }

    #[test]
    fn no_text_gives_empty_string() {
        assert_eq!(select_description(&Entry::new("t"), true, &PlainTextRenderer), "");
    }

    #[test]
    fn abbreviation_applies_after_rendering() {
        let html = format!("<p>{}</p>", "x".repeat(148));
        let entry = Entry::new("t").with_summary(html);
        let text = select_description(&entry, true, &PlainTextRenderer);
        assert_eq!(text.chars().count(), 148, "tags do not count towards the limit");
    }

    // -- PlainTextRenderer ---------------------------------------------------

    #[test]
    fn renderer_strips_tags() {
        let text = PlainTextRenderer.render("<p>A <b>bold</b> <a href=\"x\">move</a></p>");
        assert_eq!(text, "A bold move");
    }

    #[test]
    fn renderer_turns_breaks_into_newlines() {
        let text = PlainTextRenderer.render("<p>one</p><p>two</p>line<br/>break");
        assert_eq!(text, "one\ntwo\nline\nbreak");
    }

    #[test]
    fn renderer_collapses_blank_lines() {
        let text = PlainTextRenderer.render("<p>one</p>\n\n\n<p>two</p>");
        assert_eq!(text, "one\n\ntwo");
    }

    #[test]
    fn renderer_decodes_entities() {
        let text = PlainTextRenderer.render("Tom &amp; Jerry &lt;3 &#8212; &#x41;&quot;");
        assert_eq!(text, "Tom & Jerry <3 \u{2014} A\"");
    }

    #[test]
    fn renderer_keeps_unknown_entities() {
        assert_eq!(PlainTextRenderer.render("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
    }

    #[test]
    fn escaped_markup_survives_as_text() {
        assert_eq!(PlainTextRenderer.render("&lt;b&gt;"), "<b>");
    }
}
