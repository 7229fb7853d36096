//! Math embedded in raw HTML blocks.
//!
//! Runs after parsing. Each HTML block whose content holds math spans is
//! replaced by alternating HTML and math nodes, in document order. The `$$`
//! pass must run before the `$` pass so a `$$..$$` span is never read as
//! two adjacent `$` spans.

use markdown_it::plugins::html::html_block::HtmlBlock;
use markdown_it::{Node, NodeValue, Renderer};

use super::{Marker, MathSpan};

/// A piece of an HTML block's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment<'a> {
    Html(&'a str),
    Math(&'a str),
}

/// Split `content` around its `marker` spans.
///
/// Returns an empty list when `content` holds no span at all. Text before the
/// first span and after each span is kept as HTML; a `$$` span needs at least
/// one char of content, a `$` span must not cross a line break. An empty `$$`
/// pair in the `$` pass is consumed but yields no math fragment.
pub fn split_embedded(content: &str, marker: Marker) -> Vec<Fragment<'_>> {
    let find_span: fn(&str, usize) -> Option<EmbeddedSpan> = match marker {
        Marker::Double => double_span_at_or_after,
        Marker::Single => single_span_at_or_after,
    };

    let mut fragments = Vec::new();
    let Some(mut span) = find_span(content, 0) else {
        return fragments;
    };
    if span.open > 0 {
        fragments.push(Fragment::Html(&content[..span.open]));
    }

    loop {
        let math = &content[span.open + marker.len()..span.close];
        if !math.is_empty() {
            fragments.push(Fragment::Math(math));
        }

        let after = span.close + marker.len();
        let following = find_span(content, after);
        let html_end = following.map_or(content.len(), |s| s.open);
        if html_end > after {
            fragments.push(Fragment::Html(&content[after..html_end]));
        }
        match following {
            Some(next) => span = next,
            None => break,
        }
    }
    fragments
}

#[derive(Debug, Clone, Copy)]
struct EmbeddedSpan {
    /// Offset of the opening marker.
    open: usize,
    /// Offset of the closing marker.
    close: usize,
}

fn double_span_at_or_after(content: &str, from: usize) -> Option<EmbeddedSpan> {
    // If the first `$$` has no closer, no later one has either.
    let open = from + content.get(from..)?.find("$$")?;
    let body = open + 2;
    // The span holds at least one char, which may be wider than a byte.
    let first = content[body..].chars().next()?.len_utf8();
    let close = body + first + content[body + first..].find("$$")?;
    Some(EmbeddedSpan { open, close })
}

fn single_span_at_or_after(content: &str, from: usize) -> Option<EmbeddedSpan> {
    let rest = content.get(from..)?;
    for (offset, _) in rest.match_indices('$') {
        let open = from + offset;
        let body = &content[open + 1..];
        let stop = body.find(['$', '\n', '\r', '\u{2028}', '\u{2029}']);
        if let Some(stop) = stop.filter(|&i| body[i..].starts_with('$')) {
            return Some(EmbeddedSpan {
                open,
                close: open + 1 + stop,
            });
        }
    }
    None
}

/// Raw HTML left over after math was cut out of an HTML block. Written out
/// verbatim, with no line breaks added around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlFragment {
    pub content: String,
}

impl NodeValue for HtmlFragment {
    fn render(&self, _: &Node, fmt: &mut dyn Renderer) {
        fmt.text_raw(&self.content);
    }
}

/// Split every HTML block under `node` that embeds `marker` math.
///
/// Both whole [`HtmlBlock`]s and [`HtmlFragment`]s left by an earlier pass
/// are split. The pieces take the place of the block, in order: HTML text
/// becomes [`HtmlFragment`]s and math becomes [`MathSpan`]s with no line
/// map.
pub fn extract_math(node: &mut Node, marker: Marker) {
    let children = std::mem::take(&mut node.children);
    let mut out = Vec::with_capacity(children.len());
    for mut child in children {
        let html = child
            .cast::<HtmlBlock>()
            .map(|block| block.content.as_str())
            .or_else(|| child.cast::<HtmlFragment>().map(|f| f.content.as_str()));
        let pieces = html.map(|html| split_into_nodes(html, marker));

        match pieces {
            Some(pieces) if !pieces.is_empty() => {
                tracing::debug!(
                    pieces = pieces.len(),
                    marker = marker.as_str(),
                    "splitting html block around math"
                );
                out.extend(pieces);
            }
            Some(_) => out.push(child),
            None => {
                extract_math(&mut child, marker);
                out.push(child);
            }
        }
    }
    node.children = out;
}

fn split_into_nodes(content: &str, marker: Marker) -> Vec<Node> {
    split_embedded(content, marker)
        .into_iter()
        .map(|fragment| match fragment {
            Fragment::Html(html) => Node::new(HtmlFragment {
                content: html.to_owned(),
            }),
            Fragment::Math(math) => Node::new(MathSpan::embedded(math, marker)),
        })
        .collect()
}
