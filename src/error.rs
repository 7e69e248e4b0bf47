use thiserror::Error;

/// Errors that can occur when fetching post data through the Instagram session
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Post does not exist, was deleted, or is not visible to the session
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network, HTTP or upstream status error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Anything else (malformed responses, invalid identifiers, ...)
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Whether this is a connection failure caused by upstream rate limiting.
    ///
    /// Instagram does not expose a dedicated signal, so this looks for `429`
    /// in the connection error message.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::Connection(msg) if msg.contains("429"))
    }
}

/// Errors that can occur while establishing the authenticated session
#[derive(Debug, Clone, Error)]
pub enum LoginError {
    /// Instagram rejected the password
    #[error("Login error: Wrong password.")]
    BadCredentials,

    /// The username does not exist
    #[error("Login error: User {0} does not exist.")]
    UserNotFound(String),

    /// The account requires a second factor, which is not supported
    #[error("Login error: two-factor authentication is required for {0}")]
    TwoFactorRequired(String),

    /// Instagram asked for a security checkpoint in the browser
    #[error("Login error: checkpoint required. Point your browser to {0} and follow the instructions")]
    Checkpoint(String),

    /// Network or HTTP error during login
    #[error("Connection error during login: {0}")]
    Connection(String),

    /// The configured Instagram origin is not a usable URL
    #[error("Invalid Instagram base URL: {0}")]
    InvalidBaseUrl(String),

    /// Login endpoint returned something we could not interpret
    #[error("Login error: unexpected response: {0}")]
    UnexpectedResponse(String),
}
