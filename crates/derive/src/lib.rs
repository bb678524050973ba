//! Derive macro for the riakmap `MapDocument` trait.
//!
//! `#[derive(MapDocument)]` generates:
//! - `impl MapDocument for {Name}`: per-field encode/decode against a Riak Map
//! - `impl Field for {Name}`: so the struct can be nested inside another document
//!   (as a child Map) or used as a map value
//!
//! # Usage
//!
//! ```ignore
//! use riakmap::{Counter, MapDocument};
//!
//! #[derive(MapDocument, Default)]
//! struct User {
//!     name: String,
//!     #[riak(rename = "mail")]
//!     email: String,
//!     #[riak(skip)]
//!     scratch: String,
//!     #[riak(context)]
//!     context: Vec<u8>,
//!     visits: Option<Counter>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod codegen;
mod parse;

/// Derive the `MapDocument` trait for a struct with named fields.
///
/// # Field Attributes
///
/// - `#[riak(rename = "name")]`: store the field under a different Map key
/// - `#[riak(skip)]`: never read or write the field
/// - `#[riak(context)]`: receive the causal context on decode and supply it on encode.
///   The field must implement `AsRef<[u8]>` and `From<&[u8]>` (e.g. `Vec<u8>`).
#[proc_macro_derive(MapDocument, attributes(riak))]
pub fn derive_map_document(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
