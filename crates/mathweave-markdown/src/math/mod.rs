//! Math recognition.
//!
//! Recognizers are plain functions over the source text (or the block line
//! table) that report what they found and how far the cursor moves. The
//! markdown-it rules in [`crate::plugin`] turn those results into nodes.
//!
//! - [`delim`]: delimiter classification and the escape-aware close matcher.
//! - [`inline`]: `$..$`, inline `$$..$$` and bare environments reached from
//!   inline text.
//! - [`block`]: fenced `$$` blocks and bare environment blocks.
//! - [`env`]: `\begin`/`\end` nesting.
//! - [`html`]: extraction of math embedded in raw HTML blocks.

use std::ops::Range;

use markdown_it::{Node, NodeValue, Renderer};
use serde::Serialize;

pub mod block;
pub mod delim;
pub mod env;
pub mod html;
pub mod inline;

/// Delimiter that produced a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Marker {
    /// `$`
    Single,
    /// `$$`
    Double,
}

impl Marker {
    pub const fn as_str(self) -> &'static str {
        match self {
            Marker::Single => "$",
            Marker::Double => "$$",
        }
    }

    pub const fn len(self) -> usize {
        self.as_str().len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Inline,
    Block,
    BareBlock,
}

/// A recognized math span. `content` never includes the delimiters.
///
/// Spans are stored in the syntax tree as node values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MathSpan {
    pub kind: SpanKind,
    pub content: String,
    pub markup: Marker,
    pub block: bool,
    /// Source lines `[start, end)`, block spans only.
    pub lines: Option<Range<usize>>,
}

impl MathSpan {
    pub fn inline(content: impl Into<String>, markup: Marker) -> Self {
        Self {
            kind: SpanKind::Inline,
            content: content.into(),
            markup,
            block: false,
            lines: None,
        }
    }

    pub fn block(content: impl Into<String>, lines: Range<usize>) -> Self {
        Self {
            kind: SpanKind::Block,
            content: content.into(),
            markup: Marker::Double,
            block: true,
            lines: Some(lines),
        }
    }

    pub fn bare(content: impl Into<String>, lines: Option<Range<usize>>) -> Self {
        Self {
            kind: SpanKind::BareBlock,
            content: content.into(),
            markup: Marker::Double,
            block: true,
            lines,
        }
    }

    /// The body of a fence tagged `math`.
    pub fn fenced(content: impl Into<String>) -> Self {
        Self {
            lines: None,
            ..Self::block(content, 0..0)
        }
    }

    /// A span cut out of a raw HTML block. `$$` pieces are display blocks,
    /// `$` pieces stay inline.
    pub fn embedded(content: impl Into<String>, marker: Marker) -> Self {
        let kind = match marker {
            Marker::Double => SpanKind::Block,
            Marker::Single => SpanKind::Inline,
        };
        Self {
            kind,
            content: content.into(),
            markup: marker,
            block: true,
            lines: None,
        }
    }

    pub fn is_display(&self) -> bool {
        matches!(self.kind, SpanKind::Block | SpanKind::BareBlock)
    }
}

/// Untypeset output: the TeX source, escaped, in a classed element that a
/// client-side typesetter can pick up.
impl NodeValue for MathSpan {
    fn render(&self, _: &Node, fmt: &mut dyn Renderer) {
        if self.is_display() {
            fmt.cr();
            fmt.open("div", &[("class", "math math-display".into())]);
            fmt.text(&self.content);
            fmt.close("div");
            fmt.cr();
        } else {
            fmt.open("span", &[("class", "math math-inline".into())]);
            fmt.text(&self.content);
            fmt.close("span");
        }
    }
}

/// Every math span under `root`, in document order.
pub fn math_spans(root: &Node) -> Vec<MathSpan> {
    let mut spans = Vec::new();
    root.walk(|node, _| {
        if let Some(span) = node.cast::<MathSpan>() {
            spans.push(span.clone());
        }
    });
    spans
}
