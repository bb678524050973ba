//! Error types for counter, set, flag and register handles.

use thiserror::Error;

use crate::handle::HandleKind;

/// Misuse of a handle.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HandleError {
    /// The handle slot is `None`.
    #[error("Nil {kind}")]
    NilHandle { kind: HandleKind },

    /// The handle was never bound to a document field.
    #[error(
        "Unknown path to {kind}. Retrieve the {kind} with get or set before updating it"
    )]
    UnboundHandle { kind: HandleKind },

    /// The handle's document location is missing its bucket, bucket type or key.
    #[error("Invalid key in {kind} exec: '{location}'")]
    InvalidKey { kind: HandleKind, location: String },
}

impl HandleError {
    /// Check if the handle slot was empty.
    pub fn is_nil(&self) -> bool {
        matches!(self, HandleError::NilHandle { .. })
    }

    /// Check if the handle was not bound to a document field.
    pub fn is_unbound(&self) -> bool {
        matches!(self, HandleError::UnboundHandle { .. })
    }

    /// Check if the handle's location was incomplete.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, HandleError::InvalidKey { .. })
    }

    /// Get the kind of handle that failed.
    pub fn kind(&self) -> HandleKind {
        match self {
            HandleError::NilHandle { kind }
            | HandleError::UnboundHandle { kind }
            | HandleError::InvalidKey { kind, .. } => *kind,
        }
    }
}

impl From<HandleError> for crate::Error {
    fn from(err: HandleError) -> Self {
        crate::Error::Handle(err)
    }
}
