//! Error types.
//!
//! Tokenizing never fails: malformed math degrades to literal text. The only
//! fallible surface is loading [`MarkdownOptions`](crate::MarkdownOptions).

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};

/// Options document could not be deserialized.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("invalid options: {source}")]
#[diagnostic(
    code(mathweave::options),
    help("options are a JSON object with camelCase boolean flags")
)]
pub struct OptionsError {
    source: serde_json::Error,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    location: SourceSpan,
    line_col: (usize, usize),
}

impl OptionsError {
    pub(crate) fn from_json(err: serde_json::Error, src: &str) -> Self {
        let (line, column) = (err.line(), err.column());
        let offset = SourceOffset::from_location(src, line, column.max(1));
        Self {
            source: err,
            src: NamedSource::new("options.json", src.to_owned()),
            location: SourceSpan::new(offset, 0),
            line_col: (line, column),
        }
    }

    /// 1-based line and column of the failure.
    pub fn line_col(&self) -> (usize, usize) {
        self.line_col
    }

    /// Attach a different source name, e.g. the path the options came from.
    pub fn with_name(self, name: impl AsRef<str>) -> Self {
        let src = NamedSource::new(name, self.src.inner().clone());
        Self { src, ..self }
    }
}
