//! Mathweave renderer
//!
//! Turns documents parsed by `mathweave-markdown` into HTML, typesetting
//! math spans to MathML with pulldown-latex.
//!

use mathweave_markdown::MarkdownOptions;

pub mod error;
pub mod html;
pub mod math;

pub use error::MathError;
pub use html::{HtmlRenderer, TypesetMath};
pub use math::{
    MathRenderOptions, MathRenderer, MathSpanRenderer, PulldownLatex, display_mode_for,
    escape_html,
};

/// Parse and render `src` in one call, with the default typesetter.
pub fn render_markdown(src: &str, options: &MarkdownOptions) -> String {
    HtmlRenderer::new(*options, MathRenderOptions::default()).render(src)
}
