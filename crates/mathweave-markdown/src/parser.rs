//! A configured markdown-it parser with math recognition.

use std::borrow::Cow;

use markdown_it::{MarkdownIt, Node};

use crate::math::{MathSpan, math_spans};
use crate::options::MarkdownOptions;
use crate::plugin;

/// CommonMark parser with math rules installed for a fixed set of options.
///
/// Build it once and reuse it for any number of documents.
///
/// ```
/// use mathweave_markdown::{MarkdownOptions, MarkdownParser, SpanKind};
///
/// let spans = MarkdownParser::new(MarkdownOptions::default()).math_spans("$$\nx^2\n$$");
/// assert_eq!(spans[0].kind, SpanKind::Block);
/// assert_eq!(spans[0].content, "x^2");
/// ```
pub struct MarkdownParser {
    md: MarkdownIt,
    options: MarkdownOptions,
}

impl MarkdownParser {
    pub fn new(options: MarkdownOptions) -> Self {
        let mut md = MarkdownIt::new();
        markdown_it::plugins::cmark::add(&mut md);
        if options.html {
            markdown_it::plugins::html::add(&mut md);
        }
        plugin::add(&mut md, options.math);
        Self { md, options }
    }

    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    #[tracing::instrument(level = "debug", skip_all, fields(len = src.len()))]
    pub fn parse(&self, src: &str) -> Node {
        let src = normalize(src);
        let root = self.md.parse(&src);
        tracing::debug!(blocks = root.children.len(), "parsed");
        root
    }

    /// Parse `src` and keep only the math spans, in document order.
    pub fn math_spans(&self, src: &str) -> Vec<MathSpan> {
        math_spans(&self.parse(src))
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new(MarkdownOptions::default())
    }
}

/// Unify line endings and replace NUL.
pub fn normalize(src: &str) -> Cow<'_, str> {
    if !src.contains(['\r', '\0']) {
        return Cow::Borrowed(src);
    }
    Cow::Owned(
        src.replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\0', "\u{FFFD}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::SpanKind;

    #[test]
    fn test_normalize() {
        assert!(matches!(normalize("a\nb"), Cow::Borrowed(_)));
        assert_eq!(normalize("a\r\nb\rc\0"), "a\nb\nc\u{FFFD}");
    }

    #[test]
    fn test_escaped_dollar_is_plain_text() {
        let parser = MarkdownParser::default();
        assert_eq!(
            parser.parse(r"price \$5 and $x$").render(),
            "<p>price $5 and <span class=\"math math-inline\">x</span></p>\n"
        );
    }

    #[test]
    fn test_escaped_pair_drops_backslashes() {
        let parser = MarkdownParser::default();
        assert!(parser.math_spans(r"\$x\$").is_empty());
        assert_eq!(parser.parse(r"\$x\$").render(), "<p>$x$</p>\n");
    }

    #[test]
    fn test_crlf_input() {
        let spans = MarkdownParser::default().math_spans("$$\r\na\r\n$$\r\n");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "a");
        assert_eq!(spans[0].kind, SpanKind::Block);
    }

    #[test]
    fn test_html_only_when_enabled() {
        let src = "<div>x</div>";
        assert_eq!(
            MarkdownParser::default().parse(src).render(),
            "<p>&lt;div&gt;x&lt;/div&gt;</p>\n"
        );
        let parser = MarkdownParser::new(MarkdownOptions::default().with_html(true));
        assert!(parser.options().html);
        assert_eq!(parser.parse(src).render().trim_end(), src);
    }

    #[test]
    fn test_parser_is_reusable() {
        let parser = MarkdownParser::default();
        assert_eq!(parser.math_spans("$a$"), parser.math_spans("$a$"));
        assert_eq!(parser.parse("$a$").render(), parser.parse("$a$").render());
    }
}
