//! HTML output for a parsed document, with math typeset through a
//! [`MathRenderer`].

use markdown_it::{Node, NodeValue, Renderer};
use mathweave_markdown::{MarkdownOptions, MarkdownParser, MathSpan};

use crate::math::{MathRenderOptions, MathRenderer, MathSpanRenderer, PulldownLatex};

/// A math span after typesetting. The markup is written as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypesetMath {
    pub html: String,
    pub block: bool,
}

impl NodeValue for TypesetMath {
    fn render(&self, _: &Node, fmt: &mut dyn Renderer) {
        if self.block {
            fmt.cr();
            fmt.text_raw(&self.html);
            fmt.cr();
        } else {
            fmt.text_raw(&self.html);
        }
    }
}

/// Markdown to HTML, with math typeset through `R`.
pub struct HtmlRenderer<R = PulldownLatex> {
    parser: MarkdownParser,
    math: MathSpanRenderer<R>,
}

impl HtmlRenderer<PulldownLatex> {
    pub fn new(options: MarkdownOptions, render: MathRenderOptions) -> Self {
        Self::with_renderer(MarkdownParser::new(options), PulldownLatex::new(render))
    }
}

impl<R: MathRenderer> HtmlRenderer<R> {
    pub fn with_renderer(parser: MarkdownParser, renderer: R) -> Self {
        let throw_on_error = parser.options().math.throw_on_error;
        Self {
            parser,
            math: MathSpanRenderer::with_renderer(renderer, throw_on_error),
        }
    }

    pub fn parser(&self) -> &MarkdownParser {
        &self.parser
    }

    /// Replace every [`MathSpan`] under `root` with its typeset form.
    pub fn typeset(&self, root: &mut Node) {
        let mut count = 0usize;
        root.walk_mut(|node, _| {
            let Some(span) = node.cast::<MathSpan>() else {
                return;
            };
            let block = span.is_display();
            let html = if block {
                self.math.render_block(&span.content)
            } else {
                self.math.render_inline(&span.content)
            };
            *node = Node::new(TypesetMath { html, block });
            count += 1;
        });
        tracing::debug!(count, "typeset math");
    }

    pub fn render(&self, src: &str) -> String {
        let mut root = self.parser.parse(src);
        self.typeset(&mut root);
        root.render()
    }

    /// Write HTML to an I/O stream. Wrap unbuffered writers in a
    /// [`BufWriter`](std::io::BufWriter).
    pub fn write_html_io<W>(&self, mut writer: W, src: &str) -> std::io::Result<()>
    where
        W: std::io::Write,
    {
        writer.write_all(self.render(src).as_bytes())?;
        writer.flush()
    }
}
