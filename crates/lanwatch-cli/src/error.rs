//! Error types for talking to the lanwatch daemon.
//!
//! **Panic-Free Policy:** No `.unwrap()`, `.expect()`, `panic!()`,
//! `unreachable!()`, or `todo!()` in this module.

use lanwatch_protocol::version::VersionError;
use thiserror::Error;

/// Daemon client errors.
///
/// Connection failures suggest checking that `lanwatchd` is running; HTTP
/// rejections carry the daemon's own error message.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The daemon URL could not be parsed.
    #[error("invalid daemon URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request never got a response.
    #[error("failed to reach daemon at {url}: {source} (is lanwatchd running?)")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The daemon answered with a non-success status.
    #[error("daemon rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body was not what the API promises.
    #[error("unexpected response from daemon: {0}")]
    InvalidResponse(String),

    /// The daemon speaks an incompatible API version.
    #[error(transparent)]
    Version(#[from] VersionError),
}

impl ClientError {
    /// HTTP status of a rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Convenience Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_includes_message() {
        let err = ClientError::Rejected {
            status: 409,
            message: "device with this IP already exists".to_string(),
        };
        assert!(err.to_string().contains("409"));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found() {
        let err = ClientError::Rejected {
            status: 404,
            message: "not found".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(ClientError::InvalidResponse("x".into()).status(), None);
    }
}
