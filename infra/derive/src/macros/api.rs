use crate::macros::error::derived_names;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, ItemStruct, Lit, LitBool, LitStr, MetaNameValue, Token};

/// Expands `#[api_model]`.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    match model_tokens(args, &input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

/// Expands `#[api_handler]`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
}

/// Serde options already present on the struct.
#[derive(Default)]
struct ExistingSerde {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

fn model_tokens(args: TokenStream, input: &ItemStruct) -> syn::Result<TokenStream> {
    let args = parse_model_args(args)?;
    let existing = existing_serde(&input.attrs)?;
    let derives = derived_names(&input.attrs);

    let mut derive_list = Vec::new();
    for (name, path) in [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
        ("ToSchema", quote! { ::utoipa::ToSchema }),
    ] {
        if !derives.contains(name) {
            derive_list.push(path);
        }
    }
    let derive_attr =
        if derive_list.is_empty() { quote! {} } else { quote! { #[derive(#(#derive_list),*)] } };

    let policy = args.rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));
    let rename_attr = match &existing.rename_all {
        Some(current) if current.value() != policy.value() => {
            return Err(syn::Error::new_spanned(
                current,
                "conflicting serde rename_all; drop it or pass the same value to api_model",
            ));
        }
        Some(_) => quote! {},
        None => quote! { #[serde(rename_all = #policy)] },
    };

    let deny = args.deny_unknown_fields.unwrap_or(true);
    let deny_attr = match (existing.deny_unknown_fields, deny) {
        (true, false) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set via serde; remove it before disabling",
            ));
        }
        (false, true) => quote! { #[serde(deny_unknown_fields)] },
        _ => quote! {},
    };

    Ok(quote! {
        #derive_attr
        #rename_attr
        #deny_attr
        #input
    })
}

fn parse_model_args(args: TokenStream) -> syn::Result<ModelArgs> {
    let metas = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse2(args)?;
    let mut parsed = ModelArgs::default();

    for meta in metas {
        let Expr::Lit(lit) = &meta.value else {
            return Err(syn::Error::new_spanned(&meta.value, "expected a literal value"));
        };
        if meta.path.is_ident("rename_all") {
            let Lit::Str(value) = &lit.lit else {
                return Err(syn::Error::new_spanned(lit, "rename_all must be a string literal"));
            };
            if parsed.rename_all.replace(value.clone()).is_some() {
                return Err(syn::Error::new_spanned(&meta, "duplicate argument"));
            }
        } else if meta.path.is_ident("deny_unknown_fields") {
            let Lit::Bool(LitBool { value, .. }) = &lit.lit else {
                return Err(syn::Error::new_spanned(
                    lit,
                    "deny_unknown_fields must be a boolean literal",
                ));
            };
            if parsed.deny_unknown_fields.replace(*value).is_some() {
                return Err(syn::Error::new_spanned(&meta, "duplicate argument"));
            }
        } else {
            return Err(syn::Error::new_spanned(
                &meta.path,
                "unsupported argument; expected rename_all or deny_unknown_fields",
            ));
        }
    }

    Ok(parsed)
}

fn existing_serde(attrs: &[Attribute]) -> syn::Result<ExistingSerde> {
    let mut existing = ExistingSerde::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                existing.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                existing.deny_unknown_fields = true;
            } else if let Ok(value) = meta.value() {
                // Consume the value of unrelated keys such as `tag = "..."`.
                let _: Expr = value.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(existing)
}
