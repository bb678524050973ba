//! Parsing logic for the MapDocument derive macro.

use darling::{FromDeriveInput, FromField, ast};
use syn::{Generics, Ident, Type};

/// Parsed struct-level options.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(riak), supports(struct_named))]
pub struct DocumentInput {
    /// The struct identifier.
    pub ident: Ident,

    /// Generic parameters.
    pub generics: Generics,

    /// Struct data (fields).
    pub data: ast::Data<(), FieldInput>,
}

impl DocumentInput {
    /// Get the fields as a vector.
    pub fn fields(&self) -> Vec<&FieldInput> {
        self.data
            .as_ref()
            .take_struct()
            .map(|s| s.fields.to_vec())
            .unwrap_or_default()
    }
}

/// Parsed field-level options.
#[derive(Debug, FromField)]
#[darling(attributes(riak))]
pub struct FieldInput {
    /// Field identifier.
    pub ident: Option<Ident>,

    /// Field type.
    #[allow(dead_code)]
    pub ty: Type,

    /// Store the field under a different Map key.
    #[darling(default)]
    pub rename: Option<String>,

    /// Skip this field in both directions.
    #[darling(default)]
    pub skip: bool,

    /// The field carries the document's causal context.
    #[darling(default)]
    pub context: bool,
}

impl FieldInput {
    /// Get the field identifier (panics if None).
    pub fn ident(&self) -> &Ident {
        self.ident.as_ref().expect("named field required")
    }

    /// Get the Map key this field is stored under.
    pub fn map_key(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.ident().to_string())
    }
}
