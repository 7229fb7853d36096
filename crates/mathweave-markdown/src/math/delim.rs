//! Delimiter classification and escape-aware close matching.
//!
//! Positions are byte offsets. Markers are ASCII, so every position handed
//! to these functions sits on a char boundary.

/// Whether a delimiter position may open and/or close a span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delim {
    pub can_open: bool,
    pub can_close: bool,
}

impl Delim {
    const NONE: Delim = Delim {
        can_open: false,
        can_close: false,
    };
    const BOTH: Delim = Delim {
        can_open: true,
        can_close: true,
    };
}

fn char_before(src: &str, pos: usize) -> Option<char> {
    src.get(..pos)?.chars().next_back()
}

fn char_at(src: &str, pos: usize) -> Option<char> {
    src.get(pos..)?.chars().next()
}

/// ASCII `\w`, which already covers digits.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A neighbour that does not glue the marker to a word.
fn is_boundary(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c.is_whitespace() || !is_word_char(c),
    }
}

/// Classify a single `$` at `pos`.
///
/// It can open when the previous char is absent, whitespace or punctuation
/// (but not `$` or `\`). It can close when the next char is absent,
/// whitespace or punctuation (but not `$`).
pub fn classify_single(src: &str, pos: usize) -> Delim {
    if src.as_bytes().get(pos) != Some(&b'$') {
        return Delim::NONE;
    }
    let prev = char_before(src, pos);
    let next = char_at(src, pos + 1);

    Delim {
        can_open: !matches!(prev, Some('$' | '\\')) && is_boundary(prev),
        can_close: next != Some('$') && is_boundary(next),
    }
}

/// Classify a `$$` pair at `pos`. Word boundaries do not matter here, only
/// that the pair is not part of a longer `$` run or escaped.
pub fn classify_double(src: &str, pos: usize) -> Delim {
    let bytes = src.as_bytes();
    let valid = bytes.get(pos) == Some(&b'$')
        && bytes.get(pos + 1) == Some(&b'$')
        && bytes.get(pos + 2) != Some(&b'$')
        && !matches!(pos.checked_sub(1).map(|p| bytes[p]), Some(b'$' | b'\\'));
    if valid { Delim::BOTH } else { Delim::NONE }
}

/// Find the next occurrence of `marker` at or after `from` that is not
/// escaped by an odd run of backslashes.
pub fn find_unescaped(src: &str, from: usize, marker: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut search = from;
    while search <= src.len() {
        let found = search + src.get(search..)?.find(marker)?;
        let backslashes = bytes[..found]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        if backslashes % 2 == 0 {
            return Some(found);
        }
        search = found + marker.len();
    }
    None
}
