//! Error types for crdgen
//!
//! Generation-time errors only. Errors raised by generated code at runtime
//! live in [`crate::genruntime`].

use crate::astmodel::TypeName;
use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// crdgen errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("no conversion found to assign {destination:?} from {origin:?}")]
    Synthesis { destination: String, origin: String },

    #[error("stage {stage} failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Aggregate(AggregateError),

    #[error("couldn't find definition for {0}")]
    MissingDefinition(TypeName),

    #[error("{from} references {to}, which is not defined")]
    DanglingReference { from: TypeName, to: TypeName },

    #[error("duplicate definition for {0}")]
    DuplicateDefinition(TypeName),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Evaluation error: {0}")]
    Eval(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl Error {
    /// Number of leaf failures carried by this error
    pub fn failure_count(&self) -> usize {
        match self {
            Error::Aggregate(agg) => agg.len(),
            Error::Stage { source, .. } => source.failure_count(),
            _ => 1,
        }
    }
}

/// A collection of errors, one entry per underlying failure.
///
/// Nested aggregates are flattened on construction so that every leaf
/// failure appears exactly once.
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<Error>,
}

impl AggregateError {
    pub fn new(errors: Vec<Error>) -> Self {
        let mut flat = Vec::with_capacity(errors.len());
        for err in errors {
            match err {
                Error::Aggregate(inner) => flat.extend(inner.errors),
                other => flat.push(other),
            }
        }
        Self { errors: flat }
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no errors"),
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "[")?;
                for (i, err) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Collapse a list of errors into a single result.
///
/// Empty list is success; one error is returned as-is; more than one becomes
/// an [`Error::Aggregate`].
pub fn aggregate(mut errors: Vec<Error>) -> Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(Error::Aggregate(AggregateError::new(errors))),
    }
}
