//! Attribute parsing for `#[derive(Reflect)]`.
//!
//! Container level: `#[reflect(crate = "path", name = "...")]`.
//! Field level: `#[reflect(embed, skip, tag = "...", rename = "...")]`.

use darling::{FromDeriveInput, FromField};
use syn::{Generics, Ident, Path, Type};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(reflect), supports(struct_any))]
pub struct ReflectAttrs {
    pub ident: Ident,
    pub generics: Generics,
    pub data: darling::ast::Data<(), ReflectFieldAttrs>,

    /// Path to the runtime crate when it is re-exported or renamed.
    #[darling(default, rename = "crate")]
    pub krate: Option<Path>,

    /// Display name reported for the type instead of its qualified path.
    #[darling(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, FromField)]
#[darling(attributes(reflect))]
pub struct ReflectFieldAttrs {
    pub ident: Option<Ident>,
    pub ty: Type,

    /// Anonymous field: its members are flattened into the owner's model.
    #[darling(default)]
    pub embed: bool,

    #[darling(default)]
    pub skip: bool,

    /// Raw `key:"value"` annotation string.
    #[darling(default)]
    pub tag: Option<String>,

    #[darling(default)]
    pub rename: Option<String>,
}

impl ReflectFieldAttrs {
    pub fn validate(&self) -> darling::Result<()> {
        if self.skip && (self.embed || self.tag.is_some() || self.rename.is_some()) {
            return Err(darling::Error::custom(
                "`skip` cannot be combined with other `reflect` field attributes",
            )
            .with_span(&self.ty));
        }
        Ok(())
    }
}
