//! Inline markup formatting for assistant responses.
//!
//! Converts the lightweight markup the assistant emits (emphasis, code
//! spans, links, bullet lists, status glyphs) into display markup. The
//! pipeline is a fixed, ordered set of named stages; later stages operate
//! on the output of earlier ones, so the order is a contract:
//! emphasis and code spans resolve before list and paragraph
//! restructuring, which resolves before line-break normalization, which
//! resolves before glyph recoloring.
//!
//! `format` is total: it never fails and maps empty input to empty output.
//! It performs no entity escaping and is not idempotent, so raw content must
//! be formatted exactly once.

use regex::Regex;
use thiserror::Error;

/// Errors produced while building the formatter.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A stage pattern failed to compile.
    #[error("invalid formatting pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Accent color for the ✅ glyph.
const GLYPH_OK_COLOR: &str = "#10a37f";
/// Accent color for the ❌ glyph.
const GLYPH_FAIL_COLOR: &str = "#ef4444";
/// Accent color for the ℹ️ glyph.
const GLYPH_INFO_COLOR: &str = "#3b82f6";

/// Markup formatter with pre-compiled stage patterns.
pub struct TextFormatter {
    bold: Regex,
    italic: Regex,
    fenced_code: Regex,
    inline_code: Regex,
    link: Regex,
    list_item: Regex,
    list_wrap: Regex,
}

impl TextFormatter {
    /// Compile the stage patterns.
    ///
    /// # Errors
    /// Returns a [`FormatError`] if a pattern fails to compile.
    pub fn new() -> Result<Self, FormatError> {
        Ok(Self {
            bold: Regex::new(r"\*\*(.*?)\*\*")?,
            italic: Regex::new(r"\*(.*?)\*")?,
            fenced_code: Regex::new(r"(?s)```(.*?)```")?,
            inline_code: Regex::new(r"`(.*?)`")?,
            link: Regex::new(r"\[(.*?)\]\((.*?)\)")?,
            list_item: Regex::new(r"- ([^\n]*)")?,
            list_wrap: Regex::new(r"(?s)(<li>.*</li>)")?,
        })
    }

    /// Run the full stage pipeline over `raw`.
    #[must_use]
    pub fn format(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        let text = self.emphasis_strong(raw);
        let text = self.emphasis_em(&text);
        let text = self.code_fence(&text);
        let text = self.code_inline(&text);
        let text = self.links(&text);
        let text = self.list_items(&text);
        let text = self.list_wrap(&text);
        let text = Self::paragraphs(&text);
        let text = Self::line_breaks(&text);
        Self::glyphs(&text)
    }

    /// `**bold**` spans become `<strong>`.
    fn emphasis_strong(&self, text: &str) -> String {
        self.bold.replace_all(text, "<strong>$1</strong>").into_owned()
    }

    /// `*italic*` spans become `<em>`. Runs after [`Self::emphasis_strong`]
    /// so double asterisks are already consumed.
    fn emphasis_em(&self, text: &str) -> String {
        self.italic.replace_all(text, "<em>$1</em>").into_owned()
    }

    /// Triple-backtick blocks become `<pre><code>`, newlines included.
    fn code_fence(&self, text: &str) -> String {
        self.fenced_code
            .replace_all(text, "<pre><code>$1</code></pre>")
            .into_owned()
    }

    /// Single-backtick spans become `<code>`.
    fn code_inline(&self, text: &str) -> String {
        self.inline_code.replace_all(text, "<code>$1</code>").into_owned()
    }

    /// `[label](url)` becomes an anchor opening in a new context.
    fn links(&self, text: &str) -> String {
        self.link
            .replace_all(
                text,
                "<a href=\"$2\" target=\"_blank\" rel=\"noopener noreferrer\">$1</a>",
            )
            .into_owned()
    }

    /// `- item` runs to the end of its line and becomes `<li>`.
    fn list_items(&self, text: &str) -> String {
        self.list_item.replace_all(text, "<li>$1</li>").into_owned()
    }

    /// The span from the first `<li>` to the last `</li>` is wrapped in a
    /// single `<ul>`.
    fn list_wrap(&self, text: &str) -> String {
        self.list_wrap.replace(text, "<ul>$1</ul>").into_owned()
    }

    /// Blank lines become paragraph boundaries.
    fn paragraphs(text: &str) -> String {
        text.replace("\n\n", "</p><p>")
    }

    /// Remaining newlines become `<br>`.
    fn line_breaks(text: &str) -> String {
        text.replace('\n', "<br>")
    }

    /// The three status glyphs are wrapped in colored spans.
    fn glyphs(text: &str) -> String {
        text.replace("✅", &glyph_span("✅", GLYPH_OK_COLOR))
            .replace("❌", &glyph_span("❌", GLYPH_FAIL_COLOR))
            .replace("ℹ️", &glyph_span("ℹ️", GLYPH_INFO_COLOR))
    }
}

/// Build the colored span for a status glyph.
fn glyph_span(glyph: &str, color: &str) -> String {
    format!("<span style=\"color: {color};\">{glyph}</span>")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn formatter() -> TextFormatter {
        match TextFormatter::new() {
            Ok(formatter) => formatter,
            Err(err) => panic!("stage patterns must compile: {err}"),
        }
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert_eq!(formatter().format(""), "");
    }

    #[test]
    fn test_bold_before_italic() {
        let out = formatter().format("**bold** and *slanted*");
        assert_eq!(out, "<strong>bold</strong> and <em>slanted</em>");
    }

    #[test]
    fn test_fenced_code_spans_lines() {
        let out = formatter().format("```let x = 1;\nlet y = 2;```");
        assert_eq!(out, "<pre><code>let x = 1;<br>let y = 2;</code></pre>");
    }

    #[test]
    fn test_inline_code() {
        let out = formatter().format("run `cargo doc` first");
        assert_eq!(out, "run <code>cargo doc</code> first");
    }

    #[test]
    fn test_link_target_and_rel() {
        let out = formatter().format("[docs](https://example.com)");
        assert_eq!(
            out,
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">docs</a>"
        );
    }

    #[test]
    fn test_bullet_run_wrapped_once() {
        let out = formatter().format("- one\n- two");
        assert_eq!(out, "<ul><li>one</li><br><li>two</li></ul>");
    }

    #[test]
    fn test_paragraphs_then_breaks() {
        let out = formatter().format("first\n\nsecond\nthird");
        assert_eq!(out, "first</p><p>second<br>third");
    }

    #[test]
    fn test_glyphs_recolored() {
        let out = formatter().format("✅ done, ❌ failed, ℹ️ note");
        assert_eq!(
            out,
            "<span style=\"color: #10a37f;\">✅</span> done, \
             <span style=\"color: #ef4444;\">❌</span> failed, \
             <span style=\"color: #3b82f6;\">ℹ️</span> note"
        );
    }

    #[test]
    fn test_precedence_chain() {
        let out = formatter().format("**Plan**\n\n- use `fetch`\n- retry ✅");
        assert_eq!(
            out,
            "<strong>Plan</strong></p><p><ul><li>use <code>fetch</code></li>\
             <br><li>retry <span style=\"color: #10a37f;\">✅</span></li></ul>"
        );
    }

    #[test]
    fn test_not_idempotent_by_design() {
        let formatter = formatter();
        let once = formatter.format("- note");
        let twice = formatter.format(&once);
        assert_eq!(once, "<ul><li>note</li></ul>");
        assert_eq!(twice, "<ul><ul><li>note</li></ul></ul>");
    }
}
