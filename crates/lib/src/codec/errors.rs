//! Error types for the struct encoder and decoder.

use thiserror::Error;

/// Errors raised while mapping a struct to or from a Riak Map.
///
/// Every variant names the field (its emitted name) that failed.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
    /// A fixed-size array whose elements are not bytes.
    #[error("Unknown array element kind for field '{field}': {kind}")]
    UnsupportedArrayElementKind { field: String, kind: String },

    /// A vector of vectors or arrays whose inner elements are not bytes.
    #[error("Unknown nested slice kind for field '{field}': {kind}")]
    UnsupportedNestedSliceKind { field: String, kind: String },

    /// The encoder met a field kind it cannot store.
    #[error("Unexpected kind for field '{field}': {kind}")]
    UnexpectedFieldKind { field: String, kind: String },

    /// The decoder met a field kind it cannot populate.
    #[error("Unknown kind for field '{field}': {kind}")]
    UnknownFieldKind { field: String, kind: String },

    /// A stored Map entry name that does not parse as the map's key type.
    #[error("Unknown map key kind for field '{field}': cannot read '{key}' as {kind}")]
    UnknownMapKeyKind {
        field: String,
        key: String,
        kind: String,
    },

    /// A map whose value type has no Riak Map representation.
    #[error("Unknown map value kind for field '{field}': {kind}")]
    UnknownMapValueKind { field: String, kind: String },

    /// A Set member or map entry that is not a valid integer.
    #[error("Invalid integer in field '{field}': '{value}'")]
    InvalidInteger { field: String, value: String },

    /// A Set member or map entry that is not valid UTF-8.
    #[error("Invalid UTF-8 text in field '{field}'")]
    InvalidText { field: String },

    /// A Register that does not hold a binary timestamp.
    #[error("Invalid timestamp in field '{field}': {reason}")]
    InvalidTimestamp { field: String, reason: String },

    /// Stored bytes do not fit a fixed-size array.
    #[error("Field '{field}' expects {expected} bytes, found {actual}")]
    ArrayLength {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl CodecError {
    /// Check if this error is about a field type the codec cannot map.
    pub fn is_unsupported_kind(&self) -> bool {
        matches!(
            self,
            CodecError::UnsupportedArrayElementKind { .. }
                | CodecError::UnsupportedNestedSliceKind { .. }
                | CodecError::UnexpectedFieldKind { .. }
                | CodecError::UnknownFieldKind { .. }
                | CodecError::UnknownMapKeyKind { .. }
                | CodecError::UnknownMapValueKind { .. }
        )
    }

    /// Check if this error is about stored data that could not be read.
    pub fn is_invalid_data(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidInteger { .. }
                | CodecError::InvalidText { .. }
                | CodecError::InvalidTimestamp { .. }
                | CodecError::ArrayLength { .. }
        )
    }

    /// Get the name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            CodecError::UnsupportedArrayElementKind { field, .. }
            | CodecError::UnsupportedNestedSliceKind { field, .. }
            | CodecError::UnexpectedFieldKind { field, .. }
            | CodecError::UnknownFieldKind { field, .. }
            | CodecError::UnknownMapKeyKind { field, .. }
            | CodecError::UnknownMapValueKind { field, .. }
            | CodecError::InvalidInteger { field, .. }
            | CodecError::InvalidText { field }
            | CodecError::InvalidTimestamp { field, .. }
            | CodecError::ArrayLength { field, .. } => field,
        }
    }
}

impl From<CodecError> for crate::Error {
    fn from(err: CodecError) -> Self {
        crate::Error::Codec(err)
    }
}
