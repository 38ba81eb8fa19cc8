// geo-search/src/error.rs
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Missing or malformed input; the caller has to fix the request.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// The backing store could not answer; the same request may succeed later.
    #[error("listing store unavailable: {0}")]
    Unavailable(#[from] StoreError),

    #[error("invalid search configuration: {0}")]
    Config(String),
}

impl SearchError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SearchError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::Unavailable(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Unavailable(String),

    #[error("cannot read listing snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed listing snapshot {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
