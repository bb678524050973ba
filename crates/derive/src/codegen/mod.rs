//! Code generation for the MapDocument derive macro.

mod document;

use crate::parse::DocumentInput;
use darling::FromDeriveInput;
use proc_macro2::TokenStream;
use syn::DeriveInput;

/// Main entry point for code generation.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = DocumentInput::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    for field in parsed.fields() {
        if field.context && field.skip {
            return Err(syn::Error::new_spanned(
                field.ident(),
                "#[riak(context)] and #[riak(skip)] cannot be used together.",
            ));
        }

        if field.context && field.rename.is_some() {
            return Err(syn::Error::new_spanned(
                field.ident(),
                "#[riak(context)] fields are not stored in the Map, so #[riak(rename)] has no effect.",
            ));
        }
    }

    document::generate(&parsed)
}
