//! Errors that cross the extraction pipeline boundary.
//!
//! Only caller errors and transport failures are meant to escape an
//! extraction call. Structural absence inside a document is absorbed by the
//! field readers and record assemblers and never shows up here, with the one
//! exception of [`ScrapeError::MissingSection`]: a detail page whose anchor
//! region is missing is not the page we asked for.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Invalid taxonomy value, malformed date, out-of-range parameter.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The upstream site answered with a non-success status.
    #[error("failed to fetch {url}: upstream returned {status}")]
    Fetch { url: String, status: StatusCode },

    /// The request never produced a response.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The region a detail record is anchored on is absent.
    #[error("could not find {0} in the fetched document")]
    MissingSection(&'static str),

    #[error("not found: {0}")]
    NotFound(String),
}

impl ScrapeError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidQuery(reason.into())
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_carries_status() {
        let err = ScrapeError::Fetch {
            url: "https://example.com/x".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/x"));
        assert!(msg.contains("404"));
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_invalid_query_is_caller_error() {
        let err = ScrapeError::invalid("Invalid type: cartoon");
        assert!(err.is_caller_error());
        assert_eq!(err.to_string(), "invalid query: Invalid type: cartoon");
    }
}
