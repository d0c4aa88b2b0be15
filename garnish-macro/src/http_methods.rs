use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;

/// Outside `#[routes]` a method attribute leaves the item untouched; the
/// route is only declared when `#[routes]` reads it from the impl block.
pub fn http_method_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as syn::ImplItemFn);

    TokenStream::from(quote! {
        #input
    })
}
