use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, parse_macro_input, Expr, ItemFn, ReturnType, Token, Type};

struct LoggedArgs {
    sink: Option<Expr>,
}

impl Parse for LoggedArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(LoggedArgs { sink: None });
        }
        let name: syn::Ident = input.parse()?;
        if name != "sink" {
            return Err(syn::Error::new(name.span(), "expected `sink = <expr>`"));
        }
        input.parse::<Token![=]>()?;
        let sink = input.parse()?;
        Ok(LoggedArgs { sink: Some(sink) })
    }
}

pub fn logged_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as LoggedArgs);
    let mut input = parse_macro_input!(item as ItemFn);

    let sink = match &args.sink {
        Some(expr) => quote! { &#expr },
        None => quote! { &::garnish::logging::Stdout },
    };
    let body = &input.block;

    let wrapped = if input.sig.asyncness.is_some() {
        quote! {{
            ::garnish::logging::logged_async(#sink, async move #body).await
        }}
    } else {
        // Closures cannot name `impl Trait`, let inference pick those up.
        let output = match &input.sig.output {
            ReturnType::Type(_, ty) if !matches!(**ty, Type::ImplTrait(_)) => quote! { -> #ty },
            ReturnType::Type(_, _) => quote! {},
            ReturnType::Default => quote! { -> () },
        };
        quote! {{
            ::garnish::logging::logged(#sink, move || #output #body)
        }}
    };

    input.block = Box::new(syn::parse_quote!(#wrapped));
    TokenStream::from(quote! { #input })
}
