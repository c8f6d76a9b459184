use darling::FromDeriveInput;
use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Generics, Ident, Member, Path, parse_quote};

use crate::attrs::{ReflectAttrs, ReflectFieldAttrs};

pub fn expand_derive_reflect(input: &syn::DeriveInput) -> darling::Result<TokenStream> {
    let attrs = ReflectAttrs::from_derive_input(input)?;

    if let Some(lifetime) = attrs.generics.lifetimes().next() {
        return Err(darling::Error::custom(
            "Reflect cannot be derived for types with lifetime parameters; described types must be 'static",
        )
        .with_span(&lifetime.lifetime));
    }

    let runtime = match &attrs.krate {
        Some(path) => path.clone(),
        None => resolve_runtime_crate()?,
    };

    let fields = attrs
        .data
        .as_ref()
        .take_struct()
        .map(|fields| fields.fields)
        .unwrap_or_default();

    let mut errors = darling::Error::accumulator();
    let mut described = Vec::new();
    for (position, field) in fields.into_iter().enumerate() {
        if errors.handle(field.validate()).is_none() || field.skip {
            continue;
        }
        described.push(describe_field(field, position, &runtime));
    }
    errors.finish()?;

    let ident = &attrs.ident;
    let generics = add_reflect_bounds(&attrs.generics, &runtime);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let descs = described.iter().enumerate().map(|(index, field)| {
        let desc = &field.desc;
        quote! { #index => ::core::option::Option::Some(#desc), }
    });
    let values = described.iter().enumerate().map(|(index, field)| {
        let member = &field.member;
        quote! { #index => ::core::option::Option::Some(#runtime::Reflect::as_value(&self.#member)), }
    });
    let name_override = attrs.name.as_ref().map(|name| quote! { .with_name(|| #name) });

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #runtime::Reflect for #ident #ty_generics #where_clause {
            fn type_desc() -> #runtime::TypeDesc {
                #runtime::TypeDesc::composite::<Self>(|index| match index {
                    #(#descs)*
                    _ => ::core::option::Option::None,
                })
                #name_override
            }

            fn as_value(&self) -> #runtime::Value<'_> {
                #runtime::Value::composite(self)
            }

            fn field_value(&self, index: usize) -> ::core::option::Option<#runtime::Value<'_>> {
                match index {
                    #(#values)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

struct DescribedField {
    member: Member,
    desc: TokenStream,
}

fn describe_field(field: &ReflectFieldAttrs, position: usize, runtime: &Path) -> DescribedField {
    let member = match &field.ident {
        Some(ident) => Member::Named(ident.clone()),
        None => Member::Unnamed(position.into()),
    };
    let name = match (&field.rename, &field.ident) {
        (Some(rename), _) => rename.clone(),
        (None, Some(ident)) => ident.to_string().trim_start_matches("r#").to_string(),
        (None, None) => position.to_string(),
    };
    let ty = &field.ty;

    let mut desc = quote! {
        #runtime::FieldDesc::new(#name, <#ty as #runtime::Reflect>::type_desc)
    };
    if let Some(tag) = &field.tag {
        desc = quote! { #desc.with_tag(#tag) };
    }
    if field.embed {
        desc = quote! { #desc.embedded() };
    }

    DescribedField { member, desc }
}

fn add_reflect_bounds(generics: &Generics, runtime: &Path) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#runtime::Reflect));
    }
    generics
}

fn resolve_runtime_crate() -> darling::Result<Path> {
    match crate_name("typegraph") {
        // The runtime crate declares `extern crate self as typegraph`, so the
        // plain name resolves in its own unit tests, doctests and integration tests.
        Ok(FoundCrate::Itself) => Ok(parse_quote!(typegraph)),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name.replace('-', "_"), Span::call_site());
            Ok(parse_quote!(::#ident))
        }
        Err(_) => Err(darling::Error::custom(
            "could not resolve the typegraph runtime crate; add a dependency on `typegraph` or set #[reflect(crate = \"...\")]",
        )),
    }
}
