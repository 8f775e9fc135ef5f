use miette::Diagnostic;
use thiserror::Error;

/// Failures at the canvas persistence boundary.
///
/// These are recorded as load/save state for the host to display. They are
/// never retried and never roll back the in-memory strokes.
#[derive(Clone, Debug, PartialEq, Eq, Error, Diagnostic)]
#[non_exhaustive]
pub enum PersistenceError {
    #[error("failed to fetch canvas: {0}")]
    #[diagnostic(code(margin::canvas::fetch))]
    Fetch(String),

    #[error("failed to save canvas: {0}")]
    #[diagnostic(
        code(margin::canvas::save),
        help("strokes are kept in memory; a later change or manual save retries")
    )]
    Save(String),

    #[error("malformed canvas data: {0}")]
    #[diagnostic(code(margin::canvas::decode))]
    Decode(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Decode(err.to_string())
    }
}
