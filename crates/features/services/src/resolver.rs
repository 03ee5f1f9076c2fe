//! Maps request path parameters onto registered domains, qualifiers and identifiers.

use crate::error::{ServiceError, ServiceErrorExt};
use serde::Deserialize;
use svcd_database::bson::oid::ObjectId;
use svcd_domain::registry::{DomainRegistry, QualifierDefinition, ServiceDomain};
use svcd_kernel::security::ObjectIdGuard;

/// `/services/{domain}/{record}`
#[derive(Debug, Deserialize)]
pub struct RecordPath {
    pub domain: String,
    pub record: String,
}

/// `/services/{domain}/{record}/{id}`
#[derive(Debug, Deserialize)]
pub struct DocumentPath {
    pub domain: String,
    pub record: String,
    pub id: String,
}

/// `/services/{domain}/{record}/{id}/{qualifier}`
#[derive(Debug, Deserialize)]
pub struct QualifierPath {
    pub domain: String,
    pub record: String,
    pub id: String,
    pub qualifier: String,
}

/// `/services/{domain}/{record}/{id}/{qualifier}/{qualifier_id}`
#[derive(Debug, Deserialize)]
pub struct QualifiedPath {
    pub domain: String,
    pub record: String,
    pub id: String,
    pub qualifier: String,
    pub qualifier_id: String,
}

/// Resolves `(domain, record)` against the registry.
///
/// # Errors
/// Returns [`ServiceError::Resolution`] for unknown domains or mismatched record names.
pub fn resolve<'r>(
    registry: &'r DomainRegistry,
    domain: &str,
    record: &str,
) -> Result<&'r ServiceDomain, ServiceError> {
    Ok(registry.resolve(domain, record)?)
}

/// Looks up a qualifier registered for `domain`.
///
/// # Errors
/// Returns [`ServiceError::UnknownQualifier`] when the name is not registered.
pub fn resolve_qualifier<'d>(
    domain: &'d ServiceDomain,
    qualifier: &str,
) -> Result<&'d QualifierDefinition, ServiceError> {
    domain.qualifier(qualifier).ok_or_else(|| ServiceError::UnknownQualifier {
        domain: domain.name().to_owned(),
        qualifier: qualifier.to_owned(),
    })
}

/// Parses a hex path identifier.
///
/// # Errors
/// Returns [`ServiceError::InvalidId`]; the client sees a plain 404.
pub fn parse_id(id: &str, what: &'static str) -> Result<ObjectId, ServiceError> {
    ObjectIdGuard::parse(id).context(what)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use svcd_domain::config::default_domains;

    fn registry() -> DomainRegistry {
        DomainRegistry::from_config(&default_domains()).unwrap()
    }

    #[test]
    fn resolves_registered_pair_and_qualifiers() {
        let registry = registry();
        let domain = resolve(&registry, "customer-offer", "customer-offer-procedure").unwrap();

        assert_eq!(resolve_qualifier(domain, "product").unwrap().name(), "product");
        assert!(matches!(
            resolve_qualifier(domain, "supplier"),
            Err(ServiceError::UnknownQualifier { .. })
        ));
    }

    #[test]
    fn invalid_ids_map_to_invalid_id() {
        assert!(matches!(parse_id("xyz", "record id"), Err(ServiceError::InvalidId { .. })));
        assert!(parse_id("000000000000000000000000", "record id").is_ok());
    }

    proptest! {
        #[test]
        fn unknown_domains_never_resolve(domain in "[a-z-]{1,24}") {
            prop_assume!(domain != "customer-offer");
            let registry = registry();
            let err = resolve(&registry, &domain, "customer-offer-procedure").unwrap_err();
            prop_assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
            prop_assert!(err.public_message().starts_with("Not supported service"));
        }

        #[test]
        fn mismatched_records_never_resolve(record in "[a-z-]{1,32}") {
            prop_assume!(record != "customer-offer-procedure");
            let registry = registry();
            let err = resolve(&registry, "customer-offer", &record).unwrap_err();
            prop_assert!(err.public_message().starts_with("Not supported control record name"));
        }
    }
}
