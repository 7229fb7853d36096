//! LaTeX math rendering via pulldown-latex → MathML
//!
//! [`MathSpanRenderer`] wraps a [`MathRenderer`] and turns every failure into
//! an escaped error element, so a bad span never breaks the document.

use std::sync::LazyLock;

use pulldown_cmark_escape::FmtWriter;
use pulldown_latex::{
    Parser, Storage,
    config::{DisplayMode, RenderConfig},
    mathml::push_mathml,
};
use regex::Regex;

use crate::error::MathError;

/// Environments that only make sense typeset on their own line.
static DISPLAY_ENV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\\begin\{(align|equation|gather|cd|alignat)\}").unwrap()
});

/// Turns TeX source into presentation markup.
pub trait MathRenderer {
    fn render(&self, latex: &str, display_mode: bool) -> Result<String, MathError>;
}

/// Options handed through to the typesetter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MathRenderOptions {
    /// Emit the MathML namespace, for XHTML output.
    pub xml: bool,
    /// Embed the TeX source as an `application/x-tex` annotation.
    pub annotate: bool,
}

/// MathML output through `pulldown-latex`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulldownLatex {
    pub options: MathRenderOptions,
}

impl PulldownLatex {
    pub fn new(options: MathRenderOptions) -> Self {
        Self { options }
    }
}

impl MathRenderer for PulldownLatex {
    fn render(&self, latex: &str, display_mode: bool) -> Result<String, MathError> {
        let storage = Storage::new();
        let parser = Parser::new(latex, &storage);

        // pulldown-latex renders parse errors inline, so check for them first.
        let events: Vec<_> = parser.collect();
        let errors: Vec<String> = events
            .iter()
            .filter_map(|e| e.as_ref().err().map(|err| err.to_string()))
            .collect();
        if !errors.is_empty() {
            return Err(MathError::Parse {
                message: errors.join("; "),
            });
        }

        let annotation = self.options.annotate.then(|| escape_html(latex));
        let config = RenderConfig {
            display_mode: if display_mode {
                DisplayMode::Block
            } else {
                DisplayMode::Inline
            },
            xml: self.options.xml,
            annotation: annotation.as_deref(),
            ..Default::default()
        };

        let mut mathml = String::new();
        push_mathml(&mut mathml, events.into_iter(), config)?;
        Ok(mathml)
    }
}

/// Whether a span is typeset in display mode. Blocks always are; inline spans
/// only when they hold a line break or a multi-line environment.
pub fn display_mode_for(content: &str, is_block: bool) -> bool {
    is_block || content.contains('\n') || DISPLAY_ENV_RE.is_match(content)
}

/// Renders recognized spans to HTML, degrading failures to error elements.
#[derive(Debug, Clone, Default)]
pub struct MathSpanRenderer<R = PulldownLatex> {
    renderer: R,
    throw_on_error: bool,
}

impl MathSpanRenderer<PulldownLatex> {
    pub fn new(options: MathRenderOptions, throw_on_error: bool) -> Self {
        Self::with_renderer(PulldownLatex::new(options), throw_on_error)
    }
}

impl<R: MathRenderer> MathSpanRenderer<R> {
    pub fn with_renderer(renderer: R, throw_on_error: bool) -> Self {
        Self {
            renderer,
            throw_on_error,
        }
    }

    pub fn render_inline(&self, content: &str) -> String {
        match self
            .renderer
            .render(content, display_mode_for(content, false))
        {
            Ok(markup) => markup,
            Err(err) => {
                self.report(content, &err);
                format!(
                    r#"<span class="math math-error" title="{}">{}</span>"#,
                    escape_html(content),
                    escape_html(&err.to_string())
                )
            }
        }
    }

    pub fn render_block(&self, content: &str) -> String {
        match self.renderer.render(content, true) {
            Ok(markup) => format!(r#"<p class="math-block">{markup}</p>"#),
            Err(err) => {
                self.report(content, &err);
                format!(
                    r#"<p class="math-block math-error" title="{}">{}</p>"#,
                    escape_html(content),
                    escape_html(&err.to_string())
                )
            }
        }
    }

    fn report(&self, latex: &str, err: &MathError) {
        if self.throw_on_error {
            tracing::error!(%err, latex, "failed to render math");
        } else {
            tracing::debug!(%err, latex, "failed to render math");
        }
    }
}

/// Escape `& < > " '` for text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, part) in s.split('\'').enumerate() {
        if i > 0 {
            out.push_str("&#039;");
        }
        // Writing into a String won't fail.
        let _ = pulldown_cmark_escape::escape_html(FmtWriter(&mut out), part);
    }
    out
}
