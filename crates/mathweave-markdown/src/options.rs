//! Parser options.

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Optional math behaviours. Every flag is off unless set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MathOptions {
    /// Recognize bare `\begin{..}` / `\end{..}` environments without `$$`.
    pub enable_bare_blocks: bool,
    /// Split `$$..$$` spans out of raw HTML blocks.
    pub enable_math_block_in_html: bool,
    /// Split `$..$` spans out of raw HTML blocks.
    pub enable_math_inline_in_html: bool,
    /// Typeset fenced code blocks tagged `math`.
    pub enable_fenced_blocks: bool,
    /// Surface typesetting failures in the error log.
    pub throw_on_error: bool,
}

/// Options for a whole parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownOptions {
    /// Recognize raw HTML blocks and inline tags.
    pub html: bool,
    #[serde(flatten)]
    pub math: MathOptions,
}

impl MarkdownOptions {
    /// Parse options from a JSON document, e.g.
    /// `{"html": true, "enableBareBlocks": true}`.
    pub fn from_json(src: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(src).map_err(|err| OptionsError::from_json(err, src))
    }

    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    pub fn with_math(mut self, math: MathOptions) -> Self {
        self.math = math;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_off() {
        let opts = MarkdownOptions::from_json("{}").unwrap();
        assert_eq!(opts, MarkdownOptions::default());
        assert!(!opts.math.enable_bare_blocks);
        assert!(!opts.html);
    }

    #[test]
    fn test_camel_case_keys() {
        let opts = MarkdownOptions::from_json(
            r#"{"html": true, "enableBareBlocks": true, "enableMathInlineInHtml": true}"#,
        )
        .unwrap();
        assert!(opts.html);
        assert!(opts.math.enable_bare_blocks);
        assert!(opts.math.enable_math_inline_in_html);
        assert!(!opts.math.enable_math_block_in_html);
        assert!(!opts.math.throw_on_error);
    }

    #[test]
    fn test_invalid_json_reports_location() {
        let err = MarkdownOptions::from_json("{\n  \"html\": yes\n}").unwrap_err();
        assert_eq!(err.line_col().0, 2);
        assert!(err.to_string().contains("invalid options"));
    }
}
