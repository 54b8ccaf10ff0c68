//! Error types for the aioslack client

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the client and its caches
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Websocket connection or framing error on the realtime stream
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// API error reported by the platform (bad status or `ok: false`)
    #[error("API error: {0}")]
    Api(String),

    /// Payload did not have the expected shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A cache write with a record that is not of the cache's declared type
    #[error("{key} is not {expected}")]
    TypeMismatch {
        /// Key (or id) of the rejected record
        key: String,
        /// Name of the declared type the cache holds
        expected: String,
    },

    /// A cache lookup for a key that is not present
    #[error("{kind} {key} not in cache")]
    NotFound {
        /// Name of the declared type the cache holds
        kind: String,
        /// The missing key
        key: String,
    },

    /// Timeout error
    #[error("Request timeout")]
    Timeout,

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new API error
    pub fn api(msg: impl Into<String>) -> Self {
        Error::Api(msg.into())
    }

    /// Create a new websocket error
    pub fn websocket(msg: impl Into<String>) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a new type mismatch error
    pub fn type_mismatch(key: impl Into<String>, expected: impl Into<String>) -> Self {
        Error::TypeMismatch {
            key: key.into(),
            expected: expected.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Create a new other error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create a timeout error
    pub fn timeout() -> Self {
        Error::Timeout
    }

    /// True for errors raised by the entity caches rather than the network
    pub fn is_cache_error(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. } | Error::NotFound { .. })
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(err.to_string())
    }
}
