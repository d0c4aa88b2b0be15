use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Fields, LitStr, Type};

/// Tokens that build `Self` inside a factory closure, plus the
/// `registry.inject` calls for the fields marked `#[inject("id")]`.
pub(crate) struct Construction {
    pub build: TokenStream2,
    pub declarations: Vec<TokenStream2>,
}

pub(crate) fn construction(fields: &Fields) -> syn::Result<Construction> {
    let named = match fields {
        Fields::Unit => {
            return Ok(Construction {
                build: quote!(Self),
                declarations: Vec::new(),
            });
        }
        Fields::Named(named) => &named.named,
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                fields,
                "injectable types must be unit structs or have named fields",
            ));
        }
    };

    let mut inits = Vec::new();
    let mut declarations = Vec::new();
    for field in named {
        let Some(ident) = &field.ident else { continue };
        let name = ident.unraw().to_string();
        match inject_id(&field.attrs)? {
            Some(id) => {
                if !is_arc(&field.ty) {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        "#[inject] fields must be Arc<T>",
                    ));
                }
                declarations.push(quote! { registry.inject::<Self>(#name, #id); });
                inits.push(quote! { #ident: __injector.field(#name)? });
            }
            None => inits.push(quote! { #ident: ::core::default::Default::default() }),
        }
    }

    Ok(Construction {
        build: quote!(Self { #(#inits),* }),
        declarations,
    })
}

/// Removes `#[inject]` from every field. Needed where the struct is re-emitted
/// by an attribute macro rather than a derive.
pub(crate) fn strip_inject_attrs(fields: &mut Fields) {
    for field in fields.iter_mut() {
        field.attrs.retain(|attr| !attr.path().is_ident("inject"));
    }
}

fn inject_id(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut id = None;
    for attr in attrs {
        if attr.path().is_ident("inject") {
            id = Some(attr.parse_args::<LitStr>()?);
        }
    }
    Ok(id)
}

fn is_arc(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Arc"
                && matches!(segment.arguments, syn::PathArguments::AngleBracketed(_));
        }
    }
    false
}
