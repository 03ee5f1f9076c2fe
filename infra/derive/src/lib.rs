#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the gateway crates.
//!
//! * [`svcd_error`] turns a struct-variant enum into a `thiserror` error with context support.
//! * [`api_model`] stamps the serde/OpenAPI policy onto request and response DTOs.
//! * [`api_handler`] attaches `utoipa` path metadata to an Axum handler.
//!
//! The examples are `ignore`d because a proc-macro crate cannot use its own macros in doctests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Injected Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A `<Name>Ext` trait with `.context(...)`, implemented for `Result<T, Name>` and for
///   `Result<T, Source>` of every wrapping variant.
/// * `From<Source>` for every variant that carries a `source` (or `#[source]`/`#[from]`) field.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants must use named fields. Variants with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[svcd_derive::svcd_error]
/// pub enum StoreError {
///     #[error("Driver error{}: {source}", format_context(.context))]
///     Driver { source: mongodb::error::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn ping() -> Result<(), StoreError> {
///     run_ping().context("Pinging primary")?;
///     Err("unreachable".into())
/// }
/// ```
#[proc_macro_attribute]
pub fn svcd_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Attribute macro for API data transfer objects.
///
/// Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` derives when missing,
/// `#[serde(rename_all = "camelCase")]` and `#[serde(deny_unknown_fields)]`.
///
/// # Arguments
///
/// * `rename_all = "..."` overrides the rename policy.
/// * `deny_unknown_fields = false` disables strict field checking.
///
/// # Example
///
/// ```rust,ignore
/// #[svcd_derive::api_model]
/// pub struct ItemsResponse {
///     pub items: Vec<String>,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro that documents an Axum handler with `utoipa::path`.
///
/// Accepts the usual `utoipa::path` arguments and silences `clippy::unused_async`,
/// which fires on handlers that never await.
///
/// # Example
///
/// ```rust,ignore
/// #[svcd_derive::api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}
