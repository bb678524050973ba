//!
//! riakmap: struct marshaling for Riak KV Map CRDTs.
//! This library maps plain Rust structs onto Riak's Map data type and back.
//!
//! ## Core Concepts
//!
//! * **Documents (`MapDocument`)**: Structs deriving `MapDocument` are stored as Riak Maps.
//!   Scalars become Registers, `bool` becomes a Flag, vectors become Sets and nested
//!   structs or `HashMap`/`BTreeMap` fields become child Maps.
//! * **Operation trees (`operation::OperationNode`)**: The encoder turns a document into a tree
//!   of register writes, counter increments, set adds/removes and flag writes.
//! * **Field filters (`filter::FieldFilter`)**: Include/exclude path patterns decide which leaf
//!   operations of a tree are sent.
//! * **Handles (`handle::Counter`, `handle::Set`, `handle::Flag`, `handle::Register`)**: Fields that
//!   remember where they live inside a stored document, so that local changes can be sent
//!   as minimal updates with `exec`.
//! * **Transports (`transport::Transport`)**: The boundary to the Riak protocol client. Every
//!   logical operation is a single `execute(command)` round trip.
//! * **Commands (`command::Bucket`)**: A small query builder composing bucket, key and document
//!   into transport commands, wrapped by caller-supplied middleware.

// Lets the derive macro's `::riakmap::` paths resolve inside this crate.
extern crate self as riakmap;

pub mod codec;
pub mod command;
pub mod config;
pub mod constants;
pub mod filter;
pub mod handle;
pub mod operation;
pub mod path;
pub mod session;
pub mod transport;

pub use codec::MapDocument;
pub use command::{Bucket, Outcome};
pub use config::SessionConfig;
pub use filter::FieldFilter;
pub use handle::{Counter, Flag, HandleSlot, Register, Set};
pub use operation::OperationNode;
pub use path::{Location, PathKey};
/// Derive macro for [`MapDocument`], enabled by the "derive" feature.
#[cfg(feature = "derive")]
pub use riakmap_derive::MapDocument;
pub use session::Session;

/// Result type used throughout the riakmap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the riakmap library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured errors from the struct encoder and decoder
    #[error(transparent)]
    Codec(codec::CodecError),

    /// Structured errors from counter, set, flag and register handles
    #[error(transparent)]
    Handle(handle::HandleError),

    /// Errors surfaced unmodified from the transport
    #[error(transparent)]
    Transport(transport::TransportError),

    /// Structured errors from the command builder
    #[error(transparent)]
    Client(command::ClientError),

    /// Structured configuration errors
    #[error(transparent)]
    Config(config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Codec(_) => "codec",
            Error::Handle(_) => "handle",
            Error::Transport(_) => "transport",
            Error::Client(_) => "command",
            Error::Config(_) => "config",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates the requested document was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Client(client_err) => client_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error came from mapping a struct to or from a Riak Map.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Error::Codec(_))
    }

    /// Check if this error is a field kind the codec cannot map.
    pub fn is_unsupported_kind(&self) -> bool {
        match self {
            Error::Codec(codec_err) => codec_err.is_unsupported_kind(),
            _ => false,
        }
    }

    /// Check if this error is stored data that could not be read back.
    pub fn is_invalid_data(&self) -> bool {
        match self {
            Error::Codec(codec_err) => codec_err.is_invalid_data(),
            _ => false,
        }
    }

    /// Check if this error is a misuse of a counter, set, flag or register handle.
    pub fn is_handle_error(&self) -> bool {
        matches!(self, Error::Handle(_))
    }

    /// Check if this error was raised by the transport.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
