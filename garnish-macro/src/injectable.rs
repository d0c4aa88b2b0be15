use crate::fields::construction;
use darling::FromDeriveInput;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput};

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_named, struct_unit))]
struct InjectableOpts {
    ident: syn::Ident,
    #[darling(default)]
    id: Option<String>,
}

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_injectable_impl(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err),
    }
}

fn generate_injectable_impl(input: &DeriveInput) -> Result<TokenStream2, TokenStream2> {
    let opts = InjectableOpts::from_derive_input(input).map_err(|e| e.write_errors())?;
    let struct_name = &opts.ident;
    let id = opts.id.unwrap_or_else(|| struct_name.to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(struct_name, "#[derive(Injectable)] only supports structs")
                .to_compile_error())
        }
    };
    let construction = construction(fields).map_err(|e| e.to_compile_error())?;
    let build = &construction.build;
    let declarations = &construction.declarations;

    Ok(quote! {
        impl #impl_generics ::garnish::Injectable for #struct_name #ty_generics #where_clause {
            const ID: &'static str = #id;

            fn register(registry: &mut ::garnish::Registry) {
                #(#declarations)*
                registry.injectable(Self::ID, |__injector| ::core::result::Result::Ok(#build));
            }
        }
    })
}
