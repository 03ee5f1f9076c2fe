use crate::validator::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::borrow::Cow;
use svcd_database::DatabaseError;
use svcd_domain::registry::RegistryError;
use svcd_kernel::security::IdGuardError;
use svcd_kernel::server::ErrorBody;
use tracing::{debug, error};

const INTERNAL_MESSAGE: &str = "An internal server error occurred";

/// Every failure a service domain operation can end with.
#[svcd_derive::svcd_error]
pub enum ServiceError {
    /// The `{domain}/{record}` pair is not registered.
    #[error("{source}")]
    Resolution { source: RegistryError, context: Option<Cow<'static, str>> },

    #[error("Not supported business qualifier '{domain}/{qualifier}'")]
    UnknownQualifier { domain: String, qualifier: String },

    /// A path identifier is not a 24-character hex string.
    #[error("Invalid path identifier{}: {source}", format_context(.context))]
    InvalidId { source: IdGuardError, context: Option<Cow<'static, str>> },

    #[error("Resource not found{}", format_context(.context))]
    NotFound { context: Option<Cow<'static, str>> },

    /// A qualifier payload broke its schema.
    #[error("{source}")]
    Validation { source: ValidationError, context: Option<Cow<'static, str>> },

    /// The request body is not a usable JSON document.
    #[error("{message}")]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Operation '{operation}' is not implemented")]
    NotImplemented { operation: &'static str },

    /// The store acknowledged an insert of other than exactly one document.
    #[error("Store reported {inserted_count} inserted documents, expected 1")]
    InsertFailure { inserted_count: u64 },

    /// An update touched more than one document.
    #[error("Store reported {matched_count} matched / {modified_count} modified, expected 1")]
    UpdateMismatch { matched_count: u64, modified_count: u64 },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal service error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ServiceError {
    #[must_use]
    pub const fn not_found() -> Self {
        Self::NotFound { context: None }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Resolution { .. }
            | Self::UnknownQualifier { .. }
            | Self::InvalidId { .. }
            | Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            Self::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::InsertFailure { .. }
            | Self::UpdateMismatch { .. }
            | Self::Database { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `message` sent to the client. Internal details never leave the process.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Resolution { .. }
            | Self::UnknownQualifier { .. }
            | Self::Validation { .. }
            | Self::InvalidPayload { .. } => self.to_string(),
            Self::InvalidId { .. } | Self::NotFound { .. } | Self::NotImplemented { .. } => {
                self.status().canonical_reason().unwrap_or_default().to_owned()
            }
            Self::InsertFailure { .. }
            | Self::UpdateMismatch { .. }
            | Self::Database { .. }
            | Self::Internal { .. } => INTERNAL_MESSAGE.to_owned(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!(error = %self, "Service operation failed");
        } else {
            debug!(error = %self, status = status.as_u16(), "Service request rejected");
        }
        ErrorBody::new(status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_failures_are_not_found_with_detail() {
        let err = ServiceError::from(RegistryError::UnknownDomain { domain: "nope".to_owned() });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Not supported service 'nope'");
    }

    #[test]
    fn store_contract_breaches_hide_details() {
        let err = ServiceError::UpdateMismatch { matched_count: 2, modified_count: 2 };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn not_found_uses_reason_phrase() {
        assert_eq!(ServiceError::not_found().public_message(), "Not Found");
        let err = ServiceError::NotImplemented { operation: "updateQualified" };
        assert_eq!(err.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(err.public_message(), "Not Implemented");
    }

    #[test]
    fn validation_message_is_verbatim() {
        let err = ServiceError::from(ValidationError::Required { key: "customerId".to_owned() });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "\"customerId\" is required");
    }
}
