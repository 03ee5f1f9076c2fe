use std::borrow::Cow;

/// A specialized [`DatabaseError`] enum of this crate.
#[svcd_derive::svcd_error]
pub enum DatabaseError {
    /// Builder parameters are missing or malformed.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when connectivity or health checks fail.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for MongoDB driver errors.
    #[error("MongoDB error{}: {source}", format_context(.context))]
    Driver {
        #[source]
        source: mongodb::error::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A write the store refused (duplicate key, `$push` onto a non-array).
    #[error("Write rejected{}: {message}", format_context(.context))]
    Write { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A query shape the in-process engine does not interpret.
    #[error("Unsupported operation{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
