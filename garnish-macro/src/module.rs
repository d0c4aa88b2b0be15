use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, parse_macro_input, Attribute, ItemStruct, Path, Token};

struct ModuleItem {
    attrs: Vec<Attribute>,
    path: Path,
}

impl Parse for ModuleItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let path = input.parse()?;
        Ok(ModuleItem { attrs, path })
    }
}

struct ModuleArgs {
    imports: Vec<ModuleItem>,
    controllers: Vec<ModuleItem>,
    providers: Vec<ModuleItem>,
}

impl Parse for ModuleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut imports = Vec::new();
        let mut controllers = Vec::new();
        let mut providers = Vec::new();

        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            // Parse array: [Item1, Item2, ...]
            let content;
            syn::bracketed!(content in input);
            let items: Vec<ModuleItem> = content
                .parse_terminated(ModuleItem::parse, Token![,])?
                .into_iter()
                .collect();

            if name == "imports" {
                imports = items;
            } else if name == "controllers" {
                controllers = items;
            } else if name == "providers" {
                providers = items;
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    "expected `imports`, `controllers` or `providers`",
                ));
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ModuleArgs {
            imports,
            controllers,
            providers,
        })
    }
}

pub fn module_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ModuleArgs);
    let input = parse_macro_input!(item as ItemStruct);
    let expanded = generate_module_impl(&args, &input);

    TokenStream::from(expanded)
}

fn generate_module_impl(args: &ModuleArgs, input: &ItemStruct) -> TokenStream2 {
    let module_name = &input.ident;

    // Imported modules declare their own providers and controllers
    let import_registrations = args.imports.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            {
                <#path as ::garnish::Module>::register(registry);
            }
        }
    });

    let provider_registrations = args.providers.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            {
                registry.provide::<#path>();
            }
        }
    });

    let controller_registrations = args.controllers.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            {
                registry.mount::<#path>();
            }
        }
    });

    quote! {
        #input

        impl ::garnish::Module for #module_name {
            #[allow(unused_variables)]
            fn register(registry: &mut ::garnish::Registry) {
                #(#import_registrations)*
                #(#provider_registrations)*
                #(#controller_registrations)*
            }
        }
    }
}
