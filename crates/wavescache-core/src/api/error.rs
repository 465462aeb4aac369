use thiserror::Error;

/// Envelope code that marks a successful response.
pub const SUCCESS_CODE: i64 = 0;

/// Internal code for failures that never reached the application layer
/// (timeouts, connection errors, non-2xx HTTP statuses).
pub const TRANSPORT_FAILURE_CODE: i64 = 999;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Remote service returned code {code}: {message}")]
    Application { code: i64, message: String },

    #[error("Transport failure: {0}")]
    Transient(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl RemoteError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        RemoteError::Transient(format!("HTTP {}: {}", status, Self::truncate_body(body)))
    }

    /// Uniform envelope code for this failure.
    pub fn code(&self) -> i64 {
        match self {
            RemoteError::Application { code, .. } => *code,
            RemoteError::Transient(_) | RemoteError::InvalidResponse(_) => TRANSPORT_FAILURE_CODE,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Transient(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Transient(format!("request timed out: {}", e))
        } else if e.is_decode() {
            RemoteError::InvalidResponse(e.to_string())
        } else {
            RemoteError::Transient(e.to_string())
        }
    }
}
