//! Inline math: `$..$`, inline `$$..$$` and bare environments that start on
//! a line of their own inside a paragraph.
//!
//! Every scan that claims a position moves the cursor forward, even when it
//! only gives back literal text. That keeps the tokenizer from retrying the
//! same delimiter forever.

use super::delim::{Delim, classify_double, classify_single, find_unescaped};
use super::env::EnvStack;
use super::{Marker, MathSpan};

/// Outcome of an inline scan at one cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineScan {
    /// Not a math delimiter; let other rules have the position.
    Declined,
    /// Delimiter characters that stay literal text.
    Literal { text: &'static str, next: usize },
    /// A math span; the cursor resumes at `next`.
    Span { span: MathSpan, next: usize },
}

impl InlineScan {
    /// Cursor position after the scan, if the position was claimed.
    pub fn next(&self) -> Option<usize> {
        match self {
            InlineScan::Declined => None,
            InlineScan::Literal { next, .. } | InlineScan::Span { next, .. } => Some(*next),
        }
    }
}

/// Scan `$..$` at `pos`.
pub fn scan_dollar(src: &str, pos: usize) -> InlineScan {
    scan_delimited(src, pos, Marker::Single, classify_single)
}

/// Scan an inline `$$..$$` at `pos`. The pair is an inline span; whether it
/// is typeset in display mode is decided from its content at render time.
pub fn scan_double_dollar(src: &str, pos: usize) -> InlineScan {
    scan_delimited(src, pos, Marker::Double, classify_double)
}

fn scan_delimited(
    src: &str,
    pos: usize,
    marker: Marker,
    classify: fn(&str, usize) -> Delim,
) -> InlineScan {
    let (lit, doubled) = match marker {
        Marker::Single => ("$", "$$"),
        Marker::Double => ("$$", "$$$$"),
    };
    if !src.get(pos..).is_some_and(|rest| rest.starts_with(lit)) {
        return InlineScan::Declined;
    }
    if !classify(src, pos).can_open {
        return InlineScan::Literal {
            text: lit,
            next: pos + marker.len(),
        };
    }

    let start = pos + marker.len();
    let Some(close) = find_unescaped(src, start, lit) else {
        return InlineScan::Literal {
            text: lit,
            next: start,
        };
    };

    if close == start {
        return InlineScan::Literal {
            text: doubled,
            next: start + marker.len(),
        };
    }

    if !classify(src, close).can_close {
        return InlineScan::Literal {
            text: lit,
            next: start,
        };
    }

    tracing::trace!(start, close, marker = lit, "inline math");
    InlineScan::Span {
        span: MathSpan::inline(&src[start..close], marker),
        next: close + marker.len(),
    }
}

/// Scan a bare environment reached from inline text: the cursor sits on a
/// newline directly followed by `\begin`. The rest of the source is split
/// into lines and fed to an [`EnvStack`]; the span ends with the line that
/// balances it, and the cursor skips that line's newline too.
///
/// Returns `None` when the stack never empties, leaving the text to the
/// other rules.
pub fn scan_bare_crossing(src: &str, pos: usize) -> Option<(MathSpan, usize)> {
    if !src.get(pos..).is_some_and(|rest| rest.starts_with("\n\\begin")) {
        return None;
    }

    let body_start = pos + 1;
    let mut stack = EnvStack::default();
    let mut consumed = 0;
    for (i, line) in src[body_start..].split('\n').enumerate() {
        if i > 0 {
            consumed += 1;
        }
        consumed += line.len();
        if stack.feed_line(line) {
            let body_end = body_start + consumed;
            let next = (body_end + 1).min(src.len());
            tracing::trace!(body_start, body_end, "inline bare environment");
            return Some((
                MathSpan::bare(&src[body_start..body_end], None),
                next,
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::SpanKind;

    fn span(scan: InlineScan) -> (String, usize) {
        match scan {
            InlineScan::Span { span, next } => (span.content, next),
            other => panic!("expected span, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_span() {
        assert_eq!(span(scan_dollar("$x$", 0)), ("x".into(), 3));
        assert_eq!(span(scan_dollar("a $x^2$ b", 2)), ("x^2".into(), 7));
    }

    #[test]
    fn test_declines_other_chars() {
        assert_eq!(scan_dollar("x", 0), InlineScan::Declined);
        assert_eq!(scan_double_dollar("$x", 0), InlineScan::Declined);
    }

    #[test]
    fn test_word_glued_opener_is_literal() {
        assert_eq!(
            scan_dollar("a$b$c", 1),
            InlineScan::Literal { text: "$", next: 2 }
        );
    }

    #[test]
    fn test_unterminated_is_literal() {
        assert_eq!(
            scan_dollar("$x", 0),
            InlineScan::Literal { text: "$", next: 1 }
        );
    }

    #[test]
    fn test_empty_span_is_literal() {
        assert_eq!(
            scan_dollar("$$", 0),
            InlineScan::Literal { text: "$$", next: 2 }
        );
    }

    #[test]
    fn test_bad_closer_retries_after_opener() {
        // The first closer is glued to `b`.
        assert_eq!(
            scan_dollar("$a$b", 0),
            InlineScan::Literal { text: "$", next: 1 }
        );
    }

    #[test]
    fn test_escaped_closer_is_skipped() {
        let (content, next) = span(scan_dollar(r"$a\$b$", 0));
        assert_eq!(content, r"a\$b");
        assert_eq!(next, 6);
    }

    #[test]
    fn test_escaped_opener() {
        assert_eq!(
            scan_dollar(r"\$x\$", 1),
            InlineScan::Literal { text: "$", next: 2 }
        );
    }

    #[test]
    fn test_double_inline() {
        let scan = scan_double_dollar("see $$x + y$$ here", 4);
        assert_eq!(scan.next(), Some(13));
        match scan {
            InlineScan::Span { span, .. } => {
                assert_eq!(span.content, "x + y");
                assert_eq!(span.markup, Marker::Double);
                assert_eq!(span.kind, SpanKind::Inline);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_double_edge_cases() {
        assert_eq!(
            scan_double_dollar("$$", 0),
            InlineScan::Literal { text: "$$", next: 2 }
        );
        assert_eq!(
            scan_double_dollar("$$$$", 0),
            InlineScan::Literal { text: "$$", next: 2 }
        );
        assert_eq!(
            scan_double_dollar("$$a$$$", 0),
            InlineScan::Literal { text: "$$", next: 2 }
        );
    }

    #[test]
    fn test_bare_crossing() {
        let src = "text\n\\begin{align}\nx\n\\end{align}\nmore";
        let (found, next) = scan_bare_crossing(src, 4).unwrap();
        assert_eq!(found.content, "\\begin{align}\nx\n\\end{align}");
        assert_eq!(found.kind, SpanKind::BareBlock);
        assert_eq!(&src[next..], "more");
    }

    #[test]
    fn test_bare_crossing_at_end_of_source() {
        let src = "t\n\\begin{a}\\end{a}";
        let (found, next) = scan_bare_crossing(src, 1).unwrap();
        assert_eq!(found.content, "\\begin{a}\\end{a}");
        assert_eq!(next, src.len());
    }

    #[test]
    fn test_bare_crossing_unbalanced() {
        assert!(scan_bare_crossing("t\n\\begin{a}\nx", 1).is_none());
        assert!(scan_bare_crossing("t\nx", 1).is_none());
    }
}
