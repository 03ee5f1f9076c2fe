//! Conversion between HTTP JSON and stored BSON.

use crate::error::ServiceError;
use serde_json::{Map, Value};
use svcd_database::bson::{self, Bson, Document};
use svcd_domain::registry::ServiceDomain;

/// Renders a stored value as client JSON. `ObjectId`s become 24-character hex strings;
/// other BSON-only types use relaxed extended JSON.
pub(crate) fn to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::Document(document) => Value::Object(document_to_map(document)),
        Bson::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Renders an identifier as a plain string.
pub(crate) fn id_string(id: Bson) -> String {
    match to_json(id) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

pub(crate) fn document_to_map(document: Document) -> Map<String, Value> {
    document.into_iter().map(|(key, value)| (key, to_json(value))).collect()
}

/// Parses an optional request body. An empty body is `None`.
pub(crate) fn parse_body(body: &[u8]) -> Result<Option<Value>, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|e| ServiceError::InvalidPayload {
        message: "Invalid request payload JSON format".into(),
        context: Some(e.to_string().into()),
    })
}

/// Turns a record payload into a document. A missing or `null` payload is an empty document.
///
/// Qualifier arrays belong to the qualifier routes, so their names are rejected as keys.
pub(crate) fn record_document(
    payload: Option<Value>,
    domain: &ServiceDomain,
) -> Result<Document, ServiceError> {
    let object = match payload {
        None | Some(Value::Null) => return Ok(Document::new()),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(ServiceError::InvalidPayload {
                message: "\"value\" must be an object".into(),
                context: None,
            });
        }
    };

    if let Some(key) = object.keys().find(|k| k.starts_with('$')) {
        return Err(ServiceError::InvalidPayload {
            message: format!("\"{key}\" is not allowed").into(),
            context: Some("field names must not start with '$'".into()),
        });
    }

    if let Some(key) = object.keys().find(|k| domain.qualifier(k).is_some()) {
        return Err(ServiceError::InvalidPayload {
            message: format!("\"{key}\" is not allowed").into(),
            context: Some("qualifier entries are added through the qualifier routes".into()),
        });
    }

    bson::to_document(&object).map_err(|e| ServiceError::InvalidPayload {
        message: "Invalid request payload input".into(),
        context: Some(e.to_string().into()),
    })
}
