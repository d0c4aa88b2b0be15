use crate::fields::{construction, strip_inject_attrs};
use darling::ast::NestedMeta;
use darling::FromMeta;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, FnArg, ImplItem, ItemImpl, ItemStruct, LitStr, Meta, Pat};

const HTTP_METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

#[derive(FromMeta)]
struct ControllerArgs {
    #[darling(default)]
    path: Option<String>,
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(args) => args,
        Err(e) => return TokenStream::from(darling::Error::from(e).write_errors()),
    };
    let args = match ControllerArgs::from_list(&attr_args) {
        Ok(args) => args,
        Err(e) => return TokenStream::from(e.write_errors()),
    };
    let input = parse_macro_input!(item as ItemStruct);
    let expanded = generate_controller_impl(&args, input).unwrap_or_else(|e| e.to_compile_error());
    TokenStream::from(expanded)
}

fn generate_controller_impl(args: &ControllerArgs, mut input: ItemStruct) -> syn::Result<TokenStream2> {
    let construction = construction(&input.fields)?;
    strip_inject_attrs(&mut input.fields);

    let struct_name = &input.ident;
    let base_path = args.path.clone().unwrap_or_else(|| "/".to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let build = &construction.build;
    let declarations = &construction.declarations;

    Ok(quote! {
        #input

        impl #impl_generics ::garnish::Controller for #struct_name #ty_generics #where_clause {
            fn base_path() -> &'static str {
                #base_path
            }

            fn register(registry: &mut ::garnish::Registry) {
                #(#declarations)*
                registry.controller(#base_path, |__injector| ::core::result::Result::Ok(#build));
            }
        }
    })
}

struct QueryParam {
    index: usize,
    name: String,
}

struct RouteInfo {
    method: syn::Ident,
    path: String,
    fn_name: syn::Ident,
    params: Vec<syn::Type>,
    queries: Vec<QueryParam>,
    has_receiver: bool,
    is_async: bool,
}

pub fn routes_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    let expanded = generate_routes_impl(input).unwrap_or_else(|e| e.to_compile_error());
    TokenStream::from(expanded)
}

fn generate_routes_impl(mut input: ItemImpl) -> syn::Result<TokenStream2> {
    let mut routes: Vec<RouteInfo> = Vec::new();

    for item in input.items.iter_mut() {
        if let ImplItem::Fn(method) = item {
            if let Some(route_info) = extract_route_info(method)? {
                routes.push(route_info);
                method.attrs.retain(|attr| !is_http_method_attr(attr));
                for input in method.sig.inputs.iter_mut() {
                    if let FnArg::Typed(pat_type) = input {
                        pat_type.attrs.retain(|attr| !attr.path().is_ident("query"));
                    }
                }
            }
        }
    }

    let route_registrations = routes.iter().map(|route| {
        let method = &route.method;
        let path = &route.path;
        let fn_name = &route.fn_name;
        let fn_name_str = fn_name.unraw().to_string();

        let query_bindings = route.queries.iter().map(|q| {
            let index = q.index;
            let name = &q.name;
            quote! { registry.query_parameter::<Self>(#fn_name_str, #index, #name); }
        });

        let temps: Vec<_> = (0..route.params.len())
            .map(|i| format_ident!("__p_{}", i))
            .collect();
        let extractions = route.params.iter().enumerate().map(|(i, ty)| {
            let temp = &temps[i];
            quote! { let #temp: #ty = __args.arg(#i); }
        });
        let args_binding = if route.params.is_empty() {
            quote!(__args)
        } else {
            quote!(mut __args)
        };
        let call = if route.has_receiver {
            quote! { __controller.#fn_name(#(#temps),*) }
        } else {
            quote! { Self::#fn_name(#(#temps),*) }
        };
        let call = if route.is_async {
            quote! { #call.await }
        } else {
            call
        };

        quote! {
            #(#query_bindings)*
            registry.route(
                ::garnish::Method::#method,
                #path,
                #fn_name_str,
                |__controller: ::std::sync::Arc<Self>, #args_binding: ::garnish::QueryArgs| async move {
                    #(#extractions)*
                    #call
                },
            );
        }
    });

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::garnish::Routes for #self_ty #where_clause {
            #[allow(unused_variables)]
            fn register_routes(registry: &mut ::garnish::Registry) {
                #(#route_registrations)*
            }
        }
    })
}

fn extract_route_info(method: &syn::ImplItemFn) -> syn::Result<Option<RouteInfo>> {
    let mut http_method = None;
    let mut path = String::new();

    for attr in &method.attrs {
        if let Some(ident) = attr.path().get_ident() {
            let name = ident.to_string();
            if HTTP_METHODS.contains(&name.as_str()) {
                http_method = Some(format_ident!("{}", capitalize(&name)));
                if !matches!(attr.meta, Meta::Path(_)) {
                    path = attr.parse_args::<LitStr>()?.value();
                }
            }
        }
    }
    let Some(method_ident) = http_method else {
        return Ok(None);
    };

    let mut has_receiver = false;
    let mut params = Vec::new();
    let mut queries = Vec::new();
    for input in method.sig.inputs.iter() {
        match input {
            FnArg::Receiver(receiver) => {
                if receiver.reference.is_none() || receiver.mutability.is_some() {
                    return Err(syn::Error::new_spanned(
                        receiver,
                        "route handlers take `&self`",
                    ));
                }
                has_receiver = true;
            }
            FnArg::Typed(pat_type) => {
                let index = params.len();
                if let Some(name) = query_name(&pat_type.attrs, &pat_type.pat)? {
                    queries.push(QueryParam { index, name });
                }
                params.push((*pat_type.ty).clone());
            }
        }
    }

    Ok(Some(RouteInfo {
        method: method_ident,
        path,
        fn_name: method.sig.ident.clone(),
        params,
        queries,
        has_receiver,
        is_async: method.sig.asyncness.is_some(),
    }))
}

/// `#[query("key")]` binds to `key`; a bare `#[query]` uses the parameter name.
fn query_name(attrs: &[Attribute], pat: &Pat) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path().is_ident("query") {
            continue;
        }
        if !matches!(attr.meta, Meta::Path(_)) {
            return Ok(Some(attr.parse_args::<LitStr>()?.value()));
        }
        return match pat {
            Pat::Ident(pat_ident) => Ok(Some(pat_ident.ident.unraw().to_string())),
            _ => Err(syn::Error::new_spanned(
                pat,
                "#[query] on a pattern needs an explicit name: #[query(\"name\")]",
            )),
        };
    }
    Ok(None)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_http_method_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| HTTP_METHODS.contains(&ident.to_string().as_str()))
}
