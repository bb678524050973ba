//! Generates the `MapDocument` and `Field` impls.

use crate::parse::DocumentInput;
use proc_macro2::TokenStream;
use quote::quote;

/// Generate the trait impls for a parsed document struct.
pub fn generate(input: &DocumentInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut encode = Vec::new();
    let mut encode_mut = Vec::new();
    let mut decode = Vec::new();

    for field in input.fields() {
        if field.skip {
            continue;
        }

        let member = field.ident();

        if field.context {
            encode.push(quote! {
                encoder.set_causal_context(::core::convert::AsRef::<[u8]>::as_ref(&self.#member));
            });
            encode_mut.push(quote! {
                encoder.set_causal_context(::core::convert::AsRef::<[u8]>::as_ref(&self.#member));
            });
            decode.push(quote! {
                self.#member = ::core::convert::From::from(decoder.causal_context());
            });
            continue;
        }

        let key = field.map_key();

        encode.push(quote! {
            ::riakmap::codec::Field::encode(&self.#member, #key, encoder)?;
        });
        encode_mut.push(quote! {
            ::riakmap::codec::Field::encode_mut(&mut self.#member, #key, encoder)?;
        });
        decode.push(quote! {
            ::riakmap::codec::Field::decode(&mut self.#member, #key, decoder)?;
        });
    }

    Ok(quote! {
        impl #impl_generics ::riakmap::MapDocument for #ident #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn encode_fields(
                &self,
                encoder: &mut ::riakmap::codec::Encoder<'_>,
            ) -> ::riakmap::Result<()> {
                #(#encode)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn encode_fields_mut(
                &mut self,
                encoder: &mut ::riakmap::codec::Encoder<'_>,
            ) -> ::riakmap::Result<()> {
                #(#encode_mut)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn decode_fields(
                &mut self,
                decoder: &::riakmap::codec::Decoder<'_>,
            ) -> ::riakmap::Result<()> {
                #(#decode)*
                ::core::result::Result::Ok(())
            }
        }

        impl #impl_generics ::riakmap::codec::Field for #ident #ty_generics #where_clause {
            fn kind() -> ::riakmap::codec::FieldKind {
                ::riakmap::codec::FieldKind::Map
            }

            fn encode(
                &self,
                name: &str,
                encoder: &mut ::riakmap::codec::Encoder<'_>,
            ) -> ::riakmap::Result<()> {
                ::riakmap::codec::encode_nested(self, name, encoder)
            }

            fn encode_mut(
                &mut self,
                name: &str,
                encoder: &mut ::riakmap::codec::Encoder<'_>,
            ) -> ::riakmap::Result<()> {
                ::riakmap::codec::encode_nested_mut(self, name, encoder)
            }

            fn decode(
                &mut self,
                name: &str,
                decoder: &::riakmap::codec::Decoder<'_>,
            ) -> ::riakmap::Result<()> {
                ::riakmap::codec::decode_nested(self, name, decoder)
            }
        }
    })
}
