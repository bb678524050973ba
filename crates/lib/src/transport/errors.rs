//! Transport error types.
//!
//! These are produced by [`Transport`](super::Transport) implementations and are
//! surfaced to callers unmodified.

use thiserror::Error;

/// Errors raised by a transport while executing a command.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("Connection failed: {reason}")]
    Connection {
        /// Why the connection failed
        reason: String,
    },

    /// The server rejected the command.
    #[error("Protocol error: {reason}")]
    Protocol {
        /// Description returned by the server
        reason: String,
    },

    /// The response does not belong to the command that was sent.
    #[error("Unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse {
        /// Response kind the command expects
        expected: String,
        /// Response kind actually received
        actual: String,
    },

    /// Any other transport failure.
    #[error("Transport error: {reason}")]
    Other {
        /// Description of the failure
        reason: String,
    },
}

impl TransportError {
    /// Check if this error means the server was unreachable.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, TransportError::Connection { .. })
    }

    /// Check if the server rejected the command.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, TransportError::Protocol { .. })
    }

    /// Check if the response kind did not match the command.
    pub fn is_unexpected_response(&self) -> bool {
        matches!(self, TransportError::UnexpectedResponse { .. })
    }
}

impl From<TransportError> for crate::Error {
    fn from(err: TransportError) -> Self {
        crate::Error::Transport(err)
    }
}
