//! `\begin{..}` / `\end{..}` nesting.

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

/// A line that opens a bare environment.
pub static BEGIN_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\\begin\s*\{([^{}]+)\}").unwrap());

/// Any environment marker in a line.
pub static ENV_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\begin|\\end)\s*\{([^{}]+)\}").unwrap());

/// Open environments of one scan, innermost last.
///
/// Balance is structural only: an `\end{b}` closes whatever is on top of
/// the stack, even if that is `a`. Changing this would change which line
/// closes a malformed construct.
#[derive(Debug, Default, Clone)]
pub struct EnvStack {
    open: Vec<SmolStr>,
}

impl EnvStack {
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn innermost(&self) -> Option<&str> {
        self.open.last().map(SmolStr::as_str)
    }

    /// Feed one line. Returns `true` as soon as an `\end` leaves the stack
    /// empty; markers after it on the same line are not looked at.
    pub fn feed_line(&mut self, line: &str) -> bool {
        for caps in ENV_MARKER_RE.captures_iter(line) {
            if &caps[1] == r"\begin" {
                self.open.push(SmolStr::new(caps[2].trim()));
            } else {
                self.open.pop();
                if self.open.is_empty() {
                    return true;
                }
            }
        }
        false
    }
}

/// Whether `line` starts (after whitespace) with `\begin{name}`.
pub fn opens_environment(line: &str) -> bool {
    BEGIN_LINE_RE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_environment_closes() {
        let mut stack = EnvStack::default();
        assert!(stack.feed_line(r"\begin{align} x \end{align}"));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_nested_environments_close_on_outermost_end() {
        let mut stack = EnvStack::default();
        assert!(!stack.feed_line(r"\begin{A}\begin{B}"));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.innermost(), Some("B"));
        assert!(!stack.feed_line(r"\end{B}"));
        assert_eq!(stack.depth(), 1);
        assert!(stack.feed_line(r"\end{A}"));
    }

    #[test]
    fn test_names_are_not_matched() {
        // `\end{A}` pops `B`, so the construct is still open.
        let mut stack = EnvStack::default();
        assert!(!stack.feed_line(r"\begin{A}\begin{B}\end{A}"));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.innermost(), Some("A"));
        assert!(stack.feed_line(r"\end{whatever}"));
    }

    #[test]
    fn test_markers_after_close_are_ignored() {
        let mut stack = EnvStack::default();
        assert!(stack.feed_line(r"\begin{a}\end{a}\begin{b}"));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_whitespace_inside_marker() {
        let mut stack = EnvStack::default();
        assert!(!stack.feed_line(r"\begin {  matrix }"));
        assert_eq!(stack.innermost(), Some("matrix"));
        assert!(stack.feed_line(r"\end{matrix}"));
    }

    #[test]
    fn test_opens_environment() {
        assert!(opens_environment(r"\begin{equation}"));
        assert!(opens_environment(r"  \begin {x} y"));
        assert!(!opens_environment(r"x \begin{equation}"));
        assert!(!opens_environment(r"\begin{}"));
        assert!(!opens_environment(r"\beginning"));
    }
}
