//! Derive macro for `typegraph` describable composites.
//!
//! `#[derive(Reflect)]` generates the `typegraph::Reflect` implementation for
//! named, tuple and unit structs: a static field table for `type_desc` and
//! per-field value access for `field_value`. Generic type parameters get a
//! `Reflect` bound.
//!
//! # Container Attributes
//!
//! - `#[reflect(crate = "path")]` - Runtime crate path, when re-exported
//! - `#[reflect(name = "...")]` - Display name for the type
//!
//! # Field Attributes
//!
//! - `#[reflect(embed)]` - Anonymous field, flattened into the owner
//! - `#[reflect(tag = "key:\"value\"")]` - Raw annotation string
//! - `#[reflect(rename = "...")]` - Field name override
//! - `#[reflect(skip)]` - Leave the field out of the description

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod attrs;
mod expand;

#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);

    match expand::expand_derive_reflect(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}
