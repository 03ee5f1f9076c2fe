use std::borrow::Cow;
use svcd_database::bson::oid::ObjectId;

#[svcd_derive::svcd_error]
pub enum IdGuardError {
    #[error("Invalid identifier{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Validation of identifiers arriving in request paths.
#[derive(Debug)]
pub struct ObjectIdGuard;

impl ObjectIdGuard {
    /// Parses a 24-character hexadecimal identifier.
    ///
    /// # Errors
    /// Returns [`IdGuardError::Validation`] for anything that is not exactly 12 bytes of hex.
    pub fn parse(id: impl AsRef<str>) -> Result<ObjectId, IdGuardError> {
        let id = id.as_ref();
        ObjectId::parse_str(id).map_err(|e| IdGuardError::Validation {
            message: e.to_string().into(),
            context: Some(format!("'{id}'").into()),
        })
    }
}
