//! Unified error handling for lottolink.
//!
//! Every failure a caller can observe maps onto one of five kinds: input
//! rejected before any network call, a failed OTP exchange, a non-2xx from
//! an authenticated backend call, a transport-level failure, or unavailable
//! device storage. All of them are returned as values for the UI layer to
//! render; nothing in this crate aborts the process.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected client-side; the action never reached the network.
    #[error("{0}")]
    Validation(String),

    /// OTP request or verification failed. Carries the backend's message
    /// verbatim when one was returned.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// An authenticated backend call returned a non-2xx status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure: no connectivity, timeout, DNS failure, or
    /// a response body that could not be decoded.
    #[error("network error: {0}")]
    Network(String),

    /// Device storage is unavailable or a write failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth(message.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Error::Network(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(message.into())
    }

    /// True when the backend rejected the bearer token. Callers react by
    /// clearing the session and routing back to the login flow; there is
    /// no refresh mechanism.
    pub fn requires_relogin(&self) -> bool {
        matches!(self, Error::Api { status: 401, .. })
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_relogin_only_for_401() {
        assert!(Error::api(401, "Token has expired.").requires_relogin());
        assert!(!Error::api(403, "Agent access required.").requires_relogin());
        assert!(!Error::api(500, "boom").requires_relogin());
        assert!(!Error::network("timed out").requires_relogin());
        assert!(!Error::auth("Invalid OTP.").requires_relogin());
    }

    #[test]
    fn test_display_includes_status_and_message() {
        let err = Error::api(404, "Agent not found.");
        assert_eq!(err.to_string(), "backend returned 404: Agent not found.");
    }

    #[test]
    fn test_validation_displays_message_only() {
        let err = Error::validation("Mobile number too short");
        assert_eq!(err.to_string(), "Mobile number too short");
    }
}
