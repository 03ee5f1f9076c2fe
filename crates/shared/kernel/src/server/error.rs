use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use svcd_derive::api_model;

/// Body of every non-2xx response.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ErrorBody {
    /// HTTP status code, repeated in the body
    pub status_code: u16,
    /// Canonical reason phrase of the status
    pub error: String,
    /// Human readable detail
    pub message: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            message: message.into(),
        }
    }

    /// Uses the reason phrase as the message too, e.g. `Not Found`.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown");
        Self::new(status, reason)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Router fallback for unknown paths.
pub async fn not_found() -> ErrorBody {
    ErrorBody::from_status(StatusCode::NOT_FOUND)
}

/// Router fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> ErrorBody {
    ErrorBody::from_status(StatusCode::METHOD_NOT_ALLOWED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_camel_case() {
        let body = ErrorBody::new(StatusCode::BAD_REQUEST, "\"customerId\" is required");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "\"customerId\" is required"
            })
        );
    }

    #[test]
    fn reason_phrase_doubles_as_message() {
        let body = ErrorBody::from_status(StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body.error, "Not Implemented");
        assert_eq!(body.message, "Not Implemented");
        assert_eq!(body.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
