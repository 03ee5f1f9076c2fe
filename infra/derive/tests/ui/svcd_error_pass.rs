use std::borrow::Cow;
use svcd_derive::svcd_error;

#[svcd_error]
pub enum StoreError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Record missing: {message}")]
    Missing { message: Cow<'static, str> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), StoreError> {
    Err(std::io::Error::other("disk")).context("Reading record")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading record): disk");

    let internal: StoreError = "broken invariant".into();
    assert!(matches!(internal, StoreError::Internal { .. }));

    let missing: Result<(), StoreError> =
        Err(StoreError::Missing { message: "customer".into() });
    assert_eq!(missing.context("ignored").unwrap_err().to_string(), "Record missing: customer");
}
