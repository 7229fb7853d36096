use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use mathweave_markdown::{MarkdownOptions, MarkdownParser};
use mathweave_renderer::{HtmlRenderer, MathRenderOptions, PulldownLatex};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;

#[derive(Parser)]
#[command(
    version,
    about = "Mathweave - markdown with TeX math to HTML and MathML",
    long_about = None
)]
struct Cli {
    /// Markdown file to render (stdin when omitted)
    input: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON options file, e.g. {"html": true, "enableBareBlocks": true}
    #[arg(long, env = "MATHWEAVE_CONFIG")]
    config: Option<PathBuf>,

    /// Allow raw HTML blocks and inline tags
    #[arg(long)]
    html: bool,

    /// Recognize bare \begin{..} / \end{..} environments
    #[arg(long)]
    bare_blocks: bool,

    /// Typeset $$..$$ inside raw HTML blocks
    #[arg(long)]
    math_block_in_html: bool,

    /// Typeset $..$ inside raw HTML blocks
    #[arg(long)]
    math_inline_in_html: bool,

    /// Typeset ```math fenced code blocks
    #[arg(long)]
    fenced_blocks: bool,

    /// Log typesetting failures as errors
    #[arg(long)]
    throw_on_error: bool,

    /// Emit the MathML namespace on every <math> element
    #[arg(long)]
    xml: bool,

    /// Embed the TeX source as a MathML annotation
    #[arg(long)]
    annotate: bool,

    /// Print the recognized math spans as JSON instead of HTML
    #[arg(long)]
    spans: bool,
}

/// Render settings that may sit next to the parser options in a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenderConfig {
    xml: bool,
    annotate: bool,
}

impl Cli {
    fn options(&self) -> Result<(MarkdownOptions, MathRenderOptions)> {
        let (mut options, render) = match &self.config {
            Some(path) => {
                let src = std::fs::read_to_string(path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("reading {}", path.display()))?;
                let options = MarkdownOptions::from_json(&src)
                    .map_err(|err| err.with_name(path.display().to_string()))?;
                let render: RenderConfig = serde_json::from_str(&src).into_diagnostic()?;
                (options, render)
            }
            None => Default::default(),
        };

        options.html |= self.html;
        let math = &mut options.math;
        math.enable_bare_blocks |= self.bare_blocks;
        math.enable_math_block_in_html |= self.math_block_in_html;
        math.enable_math_inline_in_html |= self.math_inline_in_html;
        math.enable_fenced_blocks |= self.fenced_blocks;
        math.throw_on_error |= self.throw_on_error;

        let render = MathRenderOptions {
            xml: render.xml || self.xml,
            annotate: render.annotate || self.annotate,
        };
        Ok((options, render))
    }

    fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading {}", path.display())),
            None => {
                let mut src = String::new();
                std::io::stdin()
                    .read_to_string(&mut src)
                    .into_diagnostic()
                    .wrap_err("reading stdin")?;
                Ok(src)
            }
        }
    }
}

fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();
    let (options, render) = cli.options()?;
    let src = cli.read_input()?;

    let parser = MarkdownParser::new(options);
    tracing::debug!(len = src.len(), ?options, "read input");

    let mut out: BufWriter<Box<dyn Write>> = BufWriter::new(match &cli.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    });

    if cli.spans {
        let spans = parser.math_spans(&src);
        serde_json::to_writer_pretty(&mut out, &spans).into_diagnostic()?;
        writeln!(out).into_diagnostic()?;
    } else {
        HtmlRenderer::with_renderer(parser, PulldownLatex::new(render))
            .write_html_io(&mut out, &src)
            .into_diagnostic()?;
    }
    out.flush().into_diagnostic()?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(2)
                .tab_width(2)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_or_ed_onto_defaults() {
        let cli = Cli::parse_from(["mathweave", "--bare-blocks", "--xml", "in.md"]);
        let (options, render) = cli.options().unwrap();
        assert!(options.math.enable_bare_blocks);
        assert!(!options.html);
        assert!(render.xml);
        assert!(!render.annotate);
        assert_eq!(cli.input, Some(PathBuf::from("in.md")));
    }

    #[test]
    fn test_spans_flag() {
        let cli = Cli::parse_from(["mathweave", "--spans"]);
        assert!(cli.spans);
        assert_eq!(cli.input, None);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
