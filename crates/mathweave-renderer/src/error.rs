use miette::Diagnostic;

/// Typesetting failure for one math span.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum MathError {
    /// The TeX source did not parse.
    #[error("{message}")]
    #[diagnostic(code(mathweave::math::parse), help("check the TeX source of this span"))]
    Parse { message: String },

    /// MathML could not be written out.
    #[error("failed to write MathML: {0}")]
    #[diagnostic(code(mathweave::math::write))]
    Write(#[from] std::io::Error),
}
