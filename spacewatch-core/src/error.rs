//! Error types for spacewatch-core

use thiserror::Error;

/// Main error type for the spacewatch-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Credential material is missing or inconsistent
    #[error("authentication not configured: {0}")]
    AuthConfiguration(String),

    /// The apiKeyUser exchange failed or returned no usable token
    #[error("credential exchange failed: {0}")]
    AuthExchange(String),

    /// Non-2xx HTTP response from the GraphQL endpoint
    #[error("HTTP {status} {status_text}")]
    Transport {
        status: u16,
        status_text: String,
        body: Option<String>,
    },

    /// The remote reported application-level GraphQL errors
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client error (connect, timeout, body decode)
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for spacewatch-core
pub type Result<T> = std::result::Result<T, Error>;
