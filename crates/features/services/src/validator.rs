//! Qualifier payload validation.
//!
//! A qualifier schema is closed: the payload must be an object holding exactly one key,
//! `<qualifier>Id`, whose value is a non-empty ASCII alphanumeric string. Checks run in a
//! fixed order and the first violation is reported.

use serde_json::Value;
use svcd_domain::registry::QualifierSchema;

/// Key used in messages about the payload as a whole.
const VALUE_KEY: &str = "value";

#[svcd_derive::svcd_error]
#[derive(Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("\"{key}\" is required")]
    Required { key: String },

    #[error("\"{key}\" must be an object")]
    NotObject { key: String },

    #[error("\"{key}\" must be a string")]
    NotString { key: String },

    #[error("\"{key}\" is not allowed to be empty")]
    Empty { key: String },

    #[error("\"{key}\" must only contain alpha-numeric characters")]
    NotAlphanumeric { key: String },

    #[error("\"{key}\" is not allowed")]
    NotAllowed { key: String },
}

/// Checks `payload` against `schema` and returns the reference value on success.
///
/// # Errors
/// Returns the first [`ValidationError`] found.
pub fn validate<'a>(
    payload: Option<&'a Value>,
    schema: &QualifierSchema,
) -> Result<&'a str, ValidationError> {
    let field = schema.field();

    let Some(payload) = payload else {
        return Err(ValidationError::Required { key: VALUE_KEY.to_owned() });
    };
    let Value::Object(object) = payload else {
        return Err(ValidationError::NotObject { key: VALUE_KEY.to_owned() });
    };

    let reference = match object.get(field) {
        None => return Err(ValidationError::Required { key: field.to_owned() }),
        Some(Value::String(s)) if s.is_empty() => {
            return Err(ValidationError::Empty { key: field.to_owned() });
        }
        Some(Value::String(s)) if !s.chars().all(|c| c.is_ascii_alphanumeric()) => {
            return Err(ValidationError::NotAlphanumeric { key: field.to_owned() });
        }
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(ValidationError::NotString { key: field.to_owned() }),
    };

    if let Some(extra) = object.keys().find(|k| k.as_str() != field) {
        return Err(ValidationError::NotAllowed { key: extra.clone() });
    }

    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use svcd_domain::registry::QualifierDefinition;

    fn customer() -> QualifierDefinition {
        QualifierDefinition::new("customer")
    }

    fn check(payload: Option<&Value>) -> Result<&str, String> {
        validate(payload, customer().schema()).map_err(|e| e.to_string())
    }

    #[test]
    fn accepts_exact_payload() {
        let payload = json!({ "customerId": "C1234" });
        assert_eq!(check(Some(&payload)), Ok("C1234"));
    }

    #[test]
    fn reports_missing_payload_and_non_objects() {
        assert_eq!(check(None).unwrap_err(), "\"value\" is required");
        assert_eq!(check(Some(&json!([1]))).unwrap_err(), "\"value\" must be an object");
        assert_eq!(check(Some(&json!("C1"))).unwrap_err(), "\"value\" must be an object");
    }

    #[test]
    fn wrong_qualifier_key_reports_required_first() {
        let payload = json!({ "productId": "C1234" });
        assert_eq!(check(Some(&payload)).unwrap_err(), "\"customerId\" is required");
    }

    #[test]
    fn extra_key_is_not_allowed() {
        let payload = json!({ "customerId": "C1234", "productId": "P1234" });
        assert_eq!(check(Some(&payload)).unwrap_err(), "\"productId\" is not allowed");
    }

    #[test]
    fn reference_must_be_a_non_empty_alphanumeric_string() {
        assert_eq!(
            check(Some(&json!({ "customerId": 42 }))).unwrap_err(),
            "\"customerId\" must be a string"
        );
        assert_eq!(
            check(Some(&json!({ "customerId": "" }))).unwrap_err(),
            "\"customerId\" is not allowed to be empty"
        );
        assert_eq!(
            check(Some(&json!({ "customerId": "C-1" }))).unwrap_err(),
            "\"customerId\" must only contain alpha-numeric characters"
        );
    }

    proptest! {
        #[test]
        fn any_alphanumeric_reference_is_accepted(reference in "[A-Za-z0-9]{1,32}") {
            let payload = json!({ "customerId": reference.clone() });
            prop_assert_eq!(check(Some(&payload)), Ok(reference.as_str()));
        }

        #[test]
        fn any_additional_key_is_rejected(extra in "[a-zA-Z_]{1,16}") {
            prop_assume!(extra != "customerId");
            let mut object = serde_json::Map::new();
            object.insert("customerId".to_owned(), json!("C1"));
            object.insert(extra.clone(), json!(true));
            let payload = Value::Object(object);
            prop_assert_eq!(
                validate(Some(&payload), customer().schema()),
                Err(ValidationError::NotAllowed { key: extra })
            );
        }

        #[test]
        fn references_with_symbols_are_rejected(
            head in "[A-Za-z0-9]{0,8}",
            symbol in "[^A-Za-z0-9]",
            tail in "[A-Za-z0-9]{0,8}",
        ) {
            let payload = json!({ "customerId": format!("{head}{symbol}{tail}") });
            prop_assert!(matches!(
                validate(Some(&payload), customer().schema()),
                Err(ValidationError::NotAlphanumeric { .. })
            ), "expected NotAlphanumeric");
        }
    }
}
