//! Error types for the Paystack client

use thiserror::Error;

/// Characters of a non-JSON body kept in the error message
pub const SNIPPET_LIMIT: usize = 200;

/// Result type alias for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Paystack secret key is required")]
    MissingSecretKey,

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The upstream answered with something that is not JSON (an HTML error
    /// page from a proxy, a bare "Gateway Timeout", ...). `response_text`
    /// holds the full body.
    #[error("Received non-JSON response from server (HTTP {status}): {snippet}")]
    NonJsonResponse {
        status: u16,
        snippet: String,
        response_text: String,
    },

    #[error("Request timeout after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ClientError {
    /// Build the error for a body that failed to parse as JSON
    pub fn non_json(status: u16, response_text: impl Into<String>) -> Self {
        let response_text = response_text.into();
        Self::NonJsonResponse {
            status,
            snippet: truncate_snippet(&response_text, SNIPPET_LIMIT),
            response_text,
        }
    }

    /// HTTP status associated with the failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::NonJsonResponse { status, .. } => Some(*status),
            ClientError::Timeout { .. } => Some(408),
            ClientError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Untruncated upstream body for non-JSON responses
    pub fn response_text(&self) -> Option<&str> {
        match self {
            ClientError::NonJsonResponse { response_text, .. } => Some(response_text),
            _ => None,
        }
    }
}

/// Keep the first `limit` characters, marking a cut with `...`
pub fn truncate_snippet(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut snippet: String = text.chars().take(limit).collect();
        snippet.push_str("...");
        snippet
    }
}
