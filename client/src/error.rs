//! Error types for the post aggregate service client

use thiserror::Error;

/// Errors that can occur when talking to the post aggregate service
#[derive(Debug, Error)]
pub enum PostServiceError {
    /// Missing `DAYLOG_API_URL` environment variable
    #[error("Missing DAYLOG_API_URL environment variable")]
    MissingBaseUrl,

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response body could not be parsed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Not signed in (401)
    #[error("Unauthorized - sign in required")]
    Unauthorized,

    /// Signed in but not allowed - e.g. mutating someone else's post (403)
    #[error("Forbidden - only the author may do this")]
    Forbidden,

    /// Post or comment does not exist (404)
    #[error("Not found")]
    NotFound,

    /// Any other non-success response
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },
}

impl PostServiceError {
    /// Whether the failure is an authorization denial (401/403).
    ///
    /// The core drops non-author mutations locally before issuing them, so
    /// seeing one of these usually means the session expired mid-edit.
    #[must_use]
    pub const fn is_authorization_denied(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}
