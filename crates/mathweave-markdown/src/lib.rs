//! Mathweave markdown
//!
//! TeX math recognition for the markdown-it parser: `$..$` inline spans,
//! `$$..$$` inline and block spans, bare `\begin{..}`/`\end{..}`
//! environments, `math` fences, and math embedded in raw HTML blocks.
//! Spans land in the syntax tree as [`MathSpan`] nodes; typesetting lives in
//! the `mathweave-renderer` crate.
//!

pub mod error;
pub mod math;
pub mod options;
pub mod parser;
pub mod plugin;

pub use error::OptionsError;
pub use markdown_it::Node;
pub use math::html::HtmlFragment;
pub use math::{Marker, MathSpan, SpanKind, math_spans};
pub use options::{MarkdownOptions, MathOptions};
pub use parser::MarkdownParser;
