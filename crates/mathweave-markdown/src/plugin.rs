//! markdown-it rules for math.
//!
//! [`add`] installs the recognizers from [`crate::math`] into a parser:
//!
//! - an inline rule for `$` and `$$` spans, plus the bare environment
//!   crossing ahead of every other inline rule when bare blocks are on;
//! - a block rule for `$$` blocks (and bare environment blocks), whose
//!   `check` answers paragraph interruption without building nodes;
//! - core rules that turn `math` fences into block math and split math out
//!   of raw HTML blocks once the tree is built.

use std::sync::LazyLock;

use markdown_it::parser::block::{BlockRule, BlockState};
use markdown_it::parser::core::CoreRule;
use markdown_it::parser::inline::{InlineRule, InlineState, Text};
use markdown_it::plugins::cmark::block::fence::CodeFence;
use markdown_it::plugins::html::html_inline::HtmlInline;
use markdown_it::{MarkdownIt, Node};
use regex::Regex;

use crate::math::block::{BlockScan, opens_bare_block, opens_math_block};
use crate::math::block::{scan_bare_block, scan_math_block};
use crate::math::html::extract_math;
use crate::math::inline::{InlineScan, scan_bare_crossing, scan_dollar, scan_double_dollar};
use crate::math::{Marker, MathSpan};
use crate::options::MathOptions;

/// An opening tag with attributes, e.g. `<span class="x">`. A `$` right
/// after one is left alone.
static OPEN_TAG_WITH_ATTRS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<\w+.+[^/]>$").unwrap());

/// Lines indented this far belong to indented code.
const CODE_INDENT: i32 = 4;

/// Add math recognition to `md`.
pub fn add(md: &mut MarkdownIt, options: MathOptions) {
    md.inline.add_rule::<DollarScanner>();
    if options.enable_bare_blocks {
        md.inline.add_rule::<BareCrossingScanner>().before_all();
        md.block.add_rule::<MathBlockScanner<true>>().before_all();
    } else {
        md.block.add_rule::<MathBlockScanner<false>>().before_all();
    }

    if options.enable_fenced_blocks {
        md.add_rule::<FencedMath>().after_all();
    }
    match (
        options.enable_math_block_in_html,
        options.enable_math_inline_in_html,
    ) {
        (true, true) => {
            md.add_rule::<MathInHtml<true, true>>().after_all();
        }
        (true, false) => {
            md.add_rule::<MathInHtml<true, false>>().after_all();
        }
        (false, true) => {
            md.add_rule::<MathInHtml<false, true>>().after_all();
        }
        (false, false) => {}
    }
}

/// `$$..$$` and `$..$` in inline text. The double form is tried first.
pub struct DollarScanner;

impl DollarScanner {
    fn scan(state: &InlineState) -> InlineScan {
        let src = &state.src[..state.pos_max];
        match scan_double_dollar(src, state.pos) {
            InlineScan::Declined if !after_attribute_tag(state) => scan_dollar(src, state.pos),
            scan => scan,
        }
    }
}

impl InlineRule for DollarScanner {
    const MARKER: char = '$';

    fn check(state: &mut InlineState) -> Option<usize> {
        let pos = state.pos;
        Self::scan(state).next().map(|next| next - pos)
    }

    fn run(state: &mut InlineState) -> Option<(Node, usize)> {
        let pos = state.pos;
        match Self::scan(state) {
            InlineScan::Declined => None,
            InlineScan::Literal { text, next } => {
                let text = Text {
                    content: text.to_owned(),
                };
                Some((Node::new(text), next - pos))
            }
            InlineScan::Span { span, next } => Some((Node::new(span), next - pos)),
        }
    }
}

/// Whether the node just before the cursor is an opening HTML tag that
/// carries attributes.
fn after_attribute_tag(state: &InlineState) -> bool {
    state
        .node
        .children
        .last()
        .and_then(|last| last.cast::<HtmlInline>())
        .is_some_and(|tag| OPEN_TAG_WITH_ATTRS_RE.is_match(&tag.content))
}

/// A bare environment that starts on its own line inside a paragraph.
pub struct BareCrossingScanner;

impl InlineRule for BareCrossingScanner {
    const MARKER: char = '\n';

    fn run(state: &mut InlineState) -> Option<(Node, usize)> {
        let pos = state.pos;
        let (span, next) = scan_bare_crossing(&state.src[..state.pos_max], pos)?;
        Some((Node::new(span), next - pos))
    }
}

/// `$$` blocks, and bare environment blocks ahead of them when `BARE` is set.
pub struct MathBlockScanner<const BARE: bool>;

impl<const BARE: bool> BlockRule for MathBlockScanner<BARE> {
    fn check(state: &mut BlockState) -> Option<()> {
        if state.line_indent(state.line) >= CODE_INDENT {
            return None;
        }
        let line = state.line;
        let opens = (BARE && opens_bare_block(state, line)) || opens_math_block(state, line);
        opens.then_some(())
    }

    fn run(state: &mut BlockState) -> Option<(Node, usize)> {
        if state.line_indent(state.line) >= CODE_INDENT {
            return None;
        }
        let start = state.line;
        let end = state.line_max;
        let bare = if BARE {
            scan_bare_block(state, start, end)
        } else {
            None
        };
        let BlockScan { span, next_line } = bare
            .or_else(|| scan_math_block(state, start, end))
            .filter(|scan| scan.next_line > start)?;
        Some((Node::new(span), next_line - start))
    }
}

/// Turns fences tagged `math` into block math.
pub struct FencedMath;

impl CoreRule for FencedMath {
    fn run(root: &mut Node, _: &MarkdownIt) {
        root.walk_mut(|node, _| {
            let Some(fence) = node.cast::<CodeFence>() else {
                return;
            };
            if !fence.info.trim().eq_ignore_ascii_case("math") {
                return;
            }
            let span = MathSpan::fenced(fence.content.as_str());
            *node = Node::new(span);
        });
    }
}

/// Splits `$$` (when `BLOCK`) and then `$` (when `INLINE`) math out of raw
/// HTML blocks.
pub struct MathInHtml<const BLOCK: bool, const INLINE: bool>;

impl<const BLOCK: bool, const INLINE: bool> CoreRule for MathInHtml<BLOCK, INLINE> {
    fn run(root: &mut Node, _: &MarkdownIt) {
        if BLOCK {
            extract_math(root, Marker::Double);
        }
        if INLINE {
            extract_math(root, Marker::Single);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{SpanKind, math_spans};

    fn md(options: MathOptions, html: bool) -> MarkdownIt {
        let mut md = MarkdownIt::new();
        markdown_it::plugins::cmark::add(&mut md);
        if html {
            markdown_it::plugins::html::add(&mut md);
        }
        add(&mut md, options);
        md
    }

    fn spans(md: &MarkdownIt, src: &str) -> Vec<(SpanKind, String)> {
        math_spans(&md.parse(src))
            .into_iter()
            .map(|s| (s.kind, s.content))
            .collect()
    }

    #[test]
    fn test_inline_spans_between_text() {
        let md = md(MathOptions::default(), false);
        assert_eq!(
            md.parse("a $x$ b").render(),
            "<p>a <span class=\"math math-inline\">x</span> b</p>\n"
        );
        assert_eq!(
            spans(&md, "see $$a$$ and $b$"),
            vec![(SpanKind::Inline, "a".into()), (SpanKind::Inline, "b".into())]
        );
    }

    #[test]
    fn test_literal_dollars_stay_text() {
        let md = md(MathOptions::default(), false);
        assert_eq!(md.parse("costs $5 or $$").render(), "<p>costs $5 or $$</p>\n");
        assert!(spans(&md, "a$b$c").is_empty());
    }

    #[test]
    fn test_code_span_wins_over_math() {
        let md = md(MathOptions::default(), false);
        assert_eq!(md.parse("`$x$`").render(), "<p><code>$x$</code></p>\n");
    }

    #[test]
    fn test_block_interrupts_paragraph() {
        let md = md(MathOptions::default(), false);
        assert_eq!(
            md.parse("text\n$$\nx\n$$\nafter").render(),
            "<p>text</p>\n<div class=\"math math-display\">x</div>\n<p>after</p>\n"
        );
    }

    #[test]
    fn test_bare_rules_only_when_enabled() {
        let src = "text\n\\begin{a}\nx\n\\end{a}\nmore";
        assert!(spans(&md(MathOptions::default(), false), src).is_empty());

        let bare = MathOptions {
            enable_bare_blocks: true,
            ..Default::default()
        };
        assert_eq!(
            spans(&md(bare, false), src),
            vec![(SpanKind::BareBlock, "\\begin{a}\nx\n\\end{a}".into())]
        );
    }

    #[test]
    fn test_dollar_after_attribute_tag_is_text() {
        let md = md(MathOptions::default(), true);
        assert!(spans(&md, r#"<span class="a">$x$</span>"#).is_empty());
        assert_eq!(spans(&md, "<b>$x$</b>"), vec![(SpanKind::Inline, "x".into())]);
    }

    #[test]
    fn test_fenced_math_only_when_enabled() {
        let src = "``` Math \nx^2\n```";
        assert!(spans(&md(MathOptions::default(), false), src).is_empty());

        let fenced = MathOptions {
            enable_fenced_blocks: true,
            ..Default::default()
        };
        let found = math_spans(&md(fenced, false).parse(src));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, SpanKind::Block);
        assert_eq!(found[0].content, "x^2\n");
        assert_eq!(found[0].lines, None);
    }

    #[test]
    fn test_html_passes_run_in_order() {
        let options = MathOptions {
            enable_math_block_in_html: true,
            enable_math_inline_in_html: true,
            ..Default::default()
        };
        assert_eq!(
            spans(&md(options, true), "<div>$$a$$ and $b$</div>"),
            vec![(SpanKind::Block, "a".into()), (SpanKind::Inline, "b".into())]
        );
    }

    #[test]
    fn test_html_untouched_without_flags() {
        let md = md(MathOptions::default(), true);
        assert!(spans(&md, "<div>$$a$$</div>").is_empty());
        assert_eq!(md.parse("<div>$$a$$</div>").render().trim_end(), "<div>$$a$$</div>");
    }
}
