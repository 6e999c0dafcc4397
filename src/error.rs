//! Error types for talking to Elasticsearch.

use thiserror::Error;

/// Errors that can occur while collecting data from a cluster.
#[derive(Debug, Error)]
pub enum EsError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The API answered with a non-success status.
    #[error("GET /{path} returned status {status}")]
    Http { status: u16, path: String },

    /// Authentication failed (401/403).
    #[error("Authentication failed for user '{0}'")]
    Auth(String),

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The response body did not match the expected shape.
    #[error("Failed to parse response of /{path}: {reason}")]
    Parse { path: String, reason: String },

    /// Reading or writing snapshot files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EsError {
    /// Whether a single retry may help.
    ///
    /// Dropped connections, timeouts and gateway statuses from a node that is
    /// restarting or behind a proxy qualify.
    pub fn is_transient(&self) -> bool {
        match self {
            EsError::Connection(_) | EsError::Timeout => true,
            EsError::Http { status, .. } => matches!(status, 502 | 503 | 504),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for EsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EsError::Timeout
        } else if err.is_connect() || (err.is_request() && err.status().is_none()) {
            // A send error without a status: the peer closed or reset the connection.
            EsError::Connection(err.to_string())
        } else {
            EsError::Request(err.to_string())
        }
    }
}
