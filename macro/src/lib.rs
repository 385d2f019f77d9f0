use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::{parse_macro_input, spanned::Spanned, ItemFn};

/// Reject anything that is not an argument-less `async fn`.
fn check_signature(input: &ItemFn, attr: &str) -> Option<TokenStream> {
    if input.sig.asyncness.is_none() {
        let msg = format!("fn must be `async fn` to use #[{attr}]");
        return Some(
            quote_spanned! { input.sig.fn_token.span()=>
                compile_error!(#msg);
            }
            .into(),
        );
    }

    if !input.sig.inputs.is_empty() {
        let msg = format!("arguments are not supported by #[{attr}]");
        return Some(
            quote_spanned! { input.sig.inputs.span()=>
                compile_error!(#msg);
            }
            .into(),
        );
    }

    None
}

/// Runs `async fn main` to completion on the `debounced` timer runtime.
///
/// ```ignore
/// #[debounced::main]
/// async fn main() {
///     debounced::task::sleep(debounced::time::Duration::from_millis(10)).await;
/// }
/// ```
#[proc_macro_attribute]
pub fn attr_macro_main(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    if let Some(err) = check_signature(&input, "debounced::main") {
        return err;
    }

    if input.sig.ident != "main" {
        return quote_spanned! { input.sig.ident.span()=>
            compile_error!("only `async fn main` can be used for #[debounced::main]");
        }
        .into();
    }

    let attrs = input.attrs;
    let output = input.sig.output;
    let block = input.block;
    quote! {
        pub fn main() #output {

            #(#attrs)*
            async fn __run() #output {
                #block
            }

            ::debounced::runtime::block_on(async {
                __run().await
            })
        }
    }
    .into()
}

/// Turns an `async fn` into a `#[test]` that runs on the `debounced` timer
/// runtime, so timers, sleeps and `Reactor::current()` are available.
#[proc_macro_attribute]
pub fn attr_macro_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    if let Some(err) = check_signature(&input, "debounced::test") {
        return err;
    }

    let name = input.sig.ident;
    let attrs = input.attrs;
    let output = input.sig.output;
    let block = input.block;
    quote! {
        #[test]
        #(#attrs)*
        fn #name() #output {
            async fn __run() #output {
                #block
            }

            ::debounced::runtime::block_on(async {
                __run().await
            })
        }
    }
    .into()
}
