//! Formatting of generated code
//!
//! Rust output is parsed with `syn` and printed with `prettyplease`, so the
//! layout of rendered code never depends on how the renderer spaced it.

/// Format Rust code using prettyplease
pub fn format_rust(code: &str) -> Result<String, FormatError> {
    match syn::parse_file(code) {
        Ok(syntax_tree) => Ok(prettyplease::unparse(&syntax_tree)),
        Err(e) => Err(FormatError::ParseError {
            language: "Rust".to_string(),
            message: e.to_string(),
        }),
    }
}

/// Formatting errors
#[derive(Debug, Clone)]
pub enum FormatError {
    /// Failed to parse the code
    ParseError { language: String, message: String },
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::ParseError { language, message } => {
                write!(f, "Failed to parse {} code: {}", language, message)
            }
        }
    }
}

impl std::error::Error for FormatError {}

impl From<FormatError> for crate::error::Error {
    fn from(e: FormatError) -> Self {
        crate::error::Error::Render(e.to_string())
    }
}
