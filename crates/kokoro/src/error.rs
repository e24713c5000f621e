use serde_json::Value;
use thiserror::Error;

/// Error types that can occur while talking to a Kokoro endpoint.
#[derive(Error, Debug)]
pub enum KokoroError {
    /// A required parameter is missing or out of range. Raised before any request is built.
    #[error("Invalid Operation: {0}")]
    InvalidOperation(String),

    /// Network failure or timeout. Never retried.
    #[error("Transport Error: {0}")]
    TransportError(String),

    /// The endpoint answered with a non-2xx status.
    #[error("Transport Error: HTTP {status}. Response: '{body}'")]
    HttpStatus { status: u16, body: String },

    /// A base64 payload in the response could not be decoded.
    #[error("Decode Error: {0}")]
    DecodeError(String),

    /// The service itself reported an `error` field.
    #[error("Error from server: {0}")]
    UpstreamError(String),

    /// Valid JSON that matches none of the expected result shapes.
    #[error("Unexpected response format: {raw}")]
    UnrecognizedShape { raw: Value },

    /// Errors related to malformed response bodies.
    #[error("Response Format Error: {message}. Raw response: '{raw_response}'")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },

    #[error("HTTP Error: {0}")]
    HttpError(String),

    /// Handles JSON serialization and deserialization errors.
    #[error("JSON Error")]
    JsonError(#[from] serde_json::Error),

    /// Handles errors from parsing URLs.
    #[error("Invalid URL")]
    InvalidUrl(#[from] url::ParseError),

    /// Handles standard I/O errors.
    #[error("I/O Error")]
    IoError(#[from] std::io::Error),
}

impl KokoroError {
    /// True for failures that happened on the wire rather than in the payload.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            KokoroError::TransportError(_) | KokoroError::HttpStatus { .. }
        )
    }
}

#[cfg(all(feature = "http-client", not(target_arch = "wasm32")))]
impl From<reqwest::Error> for KokoroError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            KokoroError::TransportError(format!("request timed out: {err}"))
        } else {
            KokoroError::TransportError(err.to_string())
        }
    }
}

impl From<http::Error> for KokoroError {
    fn from(err: http::Error) -> Self {
        KokoroError::HttpError(err.to_string())
    }
}

impl From<base64::DecodeError> for KokoroError {
    fn from(err: base64::DecodeError) -> Self {
        KokoroError::DecodeError(err.to_string())
    }
}
