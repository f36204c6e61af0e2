use thiserror::Error;

/// Failure to fetch or make sense of a listing page. Aborts the ward it
/// happened in, never its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Blocked by site: {0}")]
    Blocked(String),
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Cancelled")]
    Cancelled,
}
