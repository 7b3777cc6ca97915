//! Error types for justmerge

use thiserror::Error;

/// Errors produced while resolving policy, evaluating or merging pull requests
#[derive(Error, Debug)]
pub enum Error {
    /// The target repository does not exist (or is not visible to the token)
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    /// Non-2xx response from the hosting API
    #[error("GitHub API returned {status}: {body}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Transport-level HTTP failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// Branch protection requires bors but another merge method was requested
    #[error(
        "according to branch protections this repo requires 'bors' comments \
         which is not compatible with '{0}'"
    )]
    PolicyConflict(String),

    /// A merge flow the tool deliberately does not attempt
    #[error("unsupported merge flow: {0}")]
    UnsupportedFlow(String),

    /// The hosting API contradicted itself (e.g. an open PR reported closed)
    #[error("inconsistent pull request state: {0}")]
    Inconsistent(String),

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable credential found
    #[error("authentication error: {0}")]
    Auth(String),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status of a `Remote` error, if this is one
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a remote 404
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

/// Result alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
