//! Mapping between Rust structs and Riak Maps.
//!
//! A struct that derives [`MapDocument`] is encoded into an
//! [`OperationNode`](crate::OperationNode) and decoded from a fetched
//! [`MapValue`](crate::transport::MapValue). Each field type picks its Riak
//! representation through the [`Field`] trait:
//!
//! | field | Riak |
//! |---|---|
//! | integers | Register (decimal text) |
//! | `String` | Register |
//! | `bool` | Flag |
//! | `[u8; N]`, `Vec<u8>` | Register (raw bytes) |
//! | `Vec<String>`, `Vec<integer>`, `Vec<Vec<u8>>`, `Vec<[u8; N]>` | Set |
//! | `chrono::DateTime<Utc>` | Register (binary timestamp) |
//! | nested `MapDocument` | Map |
//! | `HashMap` / `BTreeMap` | Map, one entry per key |
//! | `Option<Counter>`, `Option<Set>`, `Option<Flag>`, `Option<Register>` | the matching CRDT |
//!
//! ```
//! use riakmap::MapDocument;
//! use riakmap::codec::{decode_document, encode_document};
//! use riakmap::path::{Location, PathKey};
//! use riakmap::transport::{FetchMapResponse, MapOperation};
//!
//! #[derive(MapDocument, Default)]
//! struct User {
//!     name: String,
//!     #[riak(rename = "years")]
//!     age: u32,
//!     tags: Vec<String>,
//! }
//!
//! let root = PathKey::root(Location::new("users", "maps", "alice"));
//! let user = User { name: "Alice".into(), age: 30, tags: vec!["admin".into()] };
//!
//! let encoded = encode_document(&user, &root).unwrap();
//! assert_eq!(encoded.tree.register("years"), Some(&b"30"[..]));
//! assert_eq!(MapOperation::from(&encoded.tree).set_adds["tags"], vec![b"admin".to_vec()]);
//! ```

use crate::Result;

mod decode;
mod encode;
mod errors;
mod field;
pub mod timestamp;

pub use decode::{Decoder, decode_document};
pub use encode::{EncodeMode, EncodedDocument, Encoder, encode_document, encode_document_mut};
pub use errors::CodecError;
pub use field::{Element, ElementShape, Field, FieldKind, MapKey};

/// A struct stored as a Riak Map.
///
/// Implemented by `#[derive(MapDocument)]`; the generated code calls [`Field`] for
/// every field in declaration order. Field attributes:
///
/// - `#[riak(rename = "name")]` stores the field under a different name.
/// - `#[riak(skip)]` leaves the field out of the Map.
/// - `#[riak(context)]` marks a byte field that carries the causal context instead of
///   being stored.
pub trait MapDocument {
    /// Emit the operations for every field without changing the struct.
    fn encode_fields(&self, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Emit the operations for every field, binding empty handle slots on the way.
    fn encode_fields_mut(&mut self, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Populate fields from the Map the decoder points at.
    fn decode_fields(&mut self, decoder: &Decoder<'_>) -> Result<()>;
}

/// Encode a nested document as the child Map `name`.
pub fn encode_nested<T: MapDocument + ?Sized>(
    value: &T,
    name: &str,
    encoder: &mut Encoder<'_>,
) -> Result<()> {
    encoder.nested(name, |child| value.encode_fields(child))
}

/// Encode a nested document as the child Map `name`, binding its handle slots.
pub fn encode_nested_mut<T: MapDocument + ?Sized>(
    value: &mut T,
    name: &str,
    encoder: &mut Encoder<'_>,
) -> Result<()> {
    encoder.nested(name, |child| value.encode_fields_mut(child))
}

/// Decode a nested document from the child Map `name`. A missing child leaves it untouched.
pub fn decode_nested<T: MapDocument + ?Sized>(
    value: &mut T,
    name: &str,
    decoder: &Decoder<'_>,
) -> Result<()> {
    decoder.nested(name, |child| value.decode_fields(child))
}
