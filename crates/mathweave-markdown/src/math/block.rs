//! Block-level math: `$$` fenced blocks and bare environment blocks.

use markdown_it::parser::block::BlockState;

use super::MathSpan;
use super::env::{EnvStack, opens_environment};

/// A recognized block and the line the tokenizer resumes at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockScan {
    pub span: MathSpan,
    pub next_line: usize,
}

/// How a multi-line scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Closing line found at this index.
    Closed(usize),
    /// A dedented line at this index belongs to the enclosing construct.
    Dedent(usize),
    /// Ran off the end of the block range.
    Eof(usize),
}

impl Stop {
    fn next_line(self) -> usize {
        match self {
            Stop::Closed(line) => line + 1,
            Stop::Dedent(line) | Stop::Eof(line) => line,
        }
    }
}

/// Line text from its first non-space char, without the line break.
fn line_text<'s>(state: &'s BlockState, line: usize) -> &'s str {
    state.get_line(line).trim_end_matches('\n')
}

/// A non-blank line indented less than the enclosing block.
fn is_dedented(state: &BlockState, line: usize) -> bool {
    !state.is_empty(line) && state.line_indent(line) < 0
}

/// Absolute indent of `line`, in columns.
fn indent(state: &BlockState, line: usize) -> usize {
    (state.line_indent(line) + state.blk_indent as i32).max(0) as usize
}

/// Whether `start` opens a `$$` block. Opening is unconditional once the
/// marker is there, so this also answers a silent check.
pub fn opens_math_block(state: &BlockState, start: usize) -> bool {
    start < state.line_max && line_text(state, start).starts_with("$$")
}

/// Scan a `$$` block starting at line `start`, bounded by line `end`.
///
/// A block closes on the first line that ends with `$$` or, more
/// permissively, contains `$$` anywhere. Only the text before that marker
/// is kept. An unclosed block runs to `end`.
pub fn scan_math_block(state: &BlockState, start: usize, end: usize) -> Option<BlockScan> {
    if !opens_math_block(state, start) {
        return None;
    }

    let first = &line_text(state, start)[2..];
    if let Some(single) = first.trim().strip_suffix("$$") {
        return Some(BlockScan {
            span: MathSpan::block(single, start..start + 1),
            next_line: start + 1,
        });
    }

    let mut last = None;
    let mut next = start;
    let stop = loop {
        next += 1;
        if next >= end {
            break Stop::Eof(end);
        }
        if is_dedented(state, next) {
            break Stop::Dedent(next);
        }

        let line = line_text(state, next);
        let close = if line.trim_end().ends_with("$$") {
            line.rfind("$$")
        } else {
            line.find("$$")
        };
        if let Some(close) = close {
            last = Some(&line[..close]);
            break Stop::Closed(next);
        }
    };

    let interior_end = match stop {
        Stop::Closed(line) | Stop::Dedent(line) | Stop::Eof(line) => line,
    };

    let mut parts: Vec<String> = Vec::new();
    if !first.trim().is_empty() {
        parts.push(first.to_owned());
    }
    if interior_end > start + 1 {
        let (interior, _) = state.get_lines(start + 1, interior_end, indent(state, start), false);
        parts.push(interior);
    }
    if let Some(last) = last.filter(|l| !l.trim().is_empty()) {
        parts.push(last.to_owned());
    }

    let next_line = stop.next_line();
    tracing::debug!(start, next_line, ?stop, "math block");
    Some(BlockScan {
        span: MathSpan::block(parts.join("\n"), start..next_line),
        next_line,
    })
}

/// Whether `start` opens a bare environment block: the line begins with
/// `\begin{name}` and the previous line, if any, is blank. Environments
/// glued to a paragraph are left to the inline crossing form.
pub fn opens_bare_block(state: &BlockState, start: usize) -> bool {
    start < state.line_max
        && opens_environment(line_text(state, start))
        && (start == 0 || state.is_empty(start - 1))
}

/// Scan a bare environment block. The construct closes on the line where
/// the environment stack empties. Without a balancing `\end` it closes at
/// `end` anyway.
pub fn scan_bare_block(state: &BlockState, start: usize, end: usize) -> Option<BlockScan> {
    if !opens_bare_block(state, start) {
        return None;
    }

    let mut stack = EnvStack::default();
    let mut next = start;
    let stop = loop {
        if next >= end {
            break Stop::Eof(end);
        }
        if is_dedented(state, next) {
            break Stop::Dedent(next);
        }
        if stack.feed_line(line_text(state, next)) {
            break Stop::Closed(next);
        }
        next += 1;
    };

    let indent = indent(state, start);
    let content = match stop {
        Stop::Closed(line) => {
            let (mut content, _) = state.get_lines(start, line, indent, true);
            content.push_str(line_text(state, line));
            content
        }
        Stop::Dedent(line) | Stop::Eof(line) => state.get_lines(start, line, indent, true).0,
    };

    let next_line = stop.next_line();
    tracing::debug!(start, next_line, depth = stack.depth(), "bare math block");
    Some(BlockScan {
        span: MathSpan::bare(content.trim(), Some(start..next_line)),
        next_line,
    })
}
