//! Seq client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-2xx status
    #[error("seq api returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode JSON response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("encode JSON request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid request path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("API key contains characters that cannot be sent in an HTTP header")]
    InvalidApiKey,
}

impl ClientError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
