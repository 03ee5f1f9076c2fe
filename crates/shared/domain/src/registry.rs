//! Static registry of service domains.
//!
//! The registry is built once from [`DomainsConfig`] and shared read-only afterwards.
//! Lookups are exact string matches on the `{domain}` and `{record}` path segments.

use crate::config::{DomainConfig, DomainsConfig};
use crate::constants::{ID_SUFFIX, QUALIFIERS_SEGMENT, REFERENCE_SUFFIX};
use heck::ToLowerCamelCase;
use std::borrow::Cow;
use std::collections::BTreeMap;

#[svcd_derive::svcd_error]
pub enum RegistryError {
    /// The `{domain}` segment names no registered domain.
    #[error("Not supported service '{domain}'")]
    UnknownDomain { domain: String },

    /// The domain exists but its record segment is different.
    #[error("Not supported control record name '{domain}/{record}'")]
    RecordNameMismatch { domain: String, record: String },

    /// A configured domain is malformed.
    #[error("Invalid service domain definition{}: {message}", format_context(.context))]
    InvalidDefinition { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Closed schema for a qualifier payload: exactly one alphanumeric string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifierSchema {
    field: String,
}

impl QualifierSchema {
    fn for_qualifier(name: &str) -> Self {
        Self { field: format!("{name}{ID_SUFFIX}") }
    }

    /// The single required key, `<qualifier>Id`.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// A named business qualifier and the schema its payloads must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifierDefinition {
    name: String,
    schema: QualifierSchema,
}

impl QualifierDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let schema = QualifierSchema::for_qualifier(&name);
        Self { name, schema }
    }

    /// Also the name of the array field holding the sub-documents.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn schema(&self) -> &QualifierSchema {
        &self.schema
    }

    /// Response key for the sub-document identifier, `<qualifier>Id`.
    #[must_use]
    pub fn id_key(&self) -> &str {
        self.schema.field()
    }

    /// Response key for the reference value, `<qualifier>Reference`.
    #[must_use]
    pub fn reference_key(&self) -> String {
        format!("{}{REFERENCE_SUFFIX}", self.name)
    }
}

/// One resource family exposed under `/services/{domain}/{record}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDomain {
    name: String,
    record_parameter_name: String,
    record_property_name: String,
    collection: String,
    qualifiers: Vec<QualifierDefinition>,
}

impl ServiceDomain {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn record_parameter_name(&self) -> &str {
        &self.record_parameter_name
    }

    #[must_use]
    pub fn record_property_name(&self) -> &str {
        &self.record_property_name
    }

    /// Response key for the record identifier, `<recordPropertyName>Id`.
    #[must_use]
    pub fn record_id_key(&self) -> String {
        format!("{}{ID_SUFFIX}", self.record_property_name)
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn qualifier(&self, name: &str) -> Option<&QualifierDefinition> {
        self.qualifiers.iter().find(|q| q.name == name)
    }

    /// Qualifiers in registry order.
    pub fn qualifiers(&self) -> impl Iterator<Item = &QualifierDefinition> {
        self.qualifiers.iter()
    }

    fn from_config(name: &str, cfg: &DomainConfig) -> Result<Self, RegistryError> {
        let context = || Cow::Owned(format!("domain '{name}'"));

        if name.trim().is_empty() {
            return Err(RegistryError::InvalidDefinition {
                message: "domain name cannot be empty".into(),
                context: None,
            });
        }
        if cfg.record.trim().is_empty() {
            return Err(RegistryError::InvalidDefinition {
                message: "record name cannot be empty".into(),
                context: Some(context()),
            });
        }
        if cfg.record == QUALIFIERS_SEGMENT {
            return Err(RegistryError::InvalidDefinition {
                message: format!("record name '{QUALIFIERS_SEGMENT}' is reserved").into(),
                context: Some(context()),
            });
        }

        let mut qualifiers: Vec<QualifierDefinition> = Vec::with_capacity(cfg.qualifiers.len());
        for qualifier in &cfg.qualifiers {
            if qualifier.is_empty() || !qualifier.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(RegistryError::InvalidDefinition {
                    message: format!("qualifier '{qualifier}' must be a non-empty alphanumeric name")
                        .into(),
                    context: Some(context()),
                });
            }
            if qualifiers.iter().any(|q| q.name == *qualifier) {
                return Err(RegistryError::InvalidDefinition {
                    message: format!("qualifier '{qualifier}' is declared twice").into(),
                    context: Some(context()),
                });
            }
            qualifiers.push(QualifierDefinition::new(qualifier.as_str()));
        }

        let record_property_name = cfg
            .property
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| cfg.record.to_lower_camel_case());
        let collection =
            cfg.collection.clone().filter(|c| !c.trim().is_empty()).unwrap_or_else(|| cfg.record.clone());

        Ok(Self {
            name: name.to_owned(),
            record_parameter_name: cfg.record.clone(),
            record_property_name,
            collection,
            qualifiers,
        })
    }
}

/// Immutable mapping from domain name to [`ServiceDomain`].
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    domains: BTreeMap<String, ServiceDomain>,
}

impl DomainRegistry {
    /// Builds and validates the registry from configuration.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidDefinition`] for empty names, reserved record names,
    /// non-alphanumeric or duplicate qualifiers.
    pub fn from_config(domains: &DomainsConfig) -> Result<Self, RegistryError> {
        let domains = domains
            .iter()
            .map(|(name, cfg)| ServiceDomain::from_config(name, cfg).map(|d| (name.clone(), d)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { domains })
    }

    /// Resolves a `(domain, record)` path pair.
    ///
    /// # Errors
    /// * [`RegistryError::UnknownDomain`] if `domain` is not registered.
    /// * [`RegistryError::RecordNameMismatch`] if `record` differs from the registered record name.
    pub fn resolve(&self, domain: &str, record: &str) -> Result<&ServiceDomain, RegistryError> {
        let service_domain = self
            .domains
            .get(domain)
            .ok_or_else(|| RegistryError::UnknownDomain { domain: domain.to_owned() })?;

        if service_domain.record_parameter_name != record {
            return Err(RegistryError::RecordNameMismatch {
                domain: domain.to_owned(),
                record: record.to_owned(),
            });
        }
        Ok(service_domain)
    }

    pub fn domains(&self) -> impl Iterator<Item = &ServiceDomain> {
        self.domains.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_domains;

    #[test]
    fn default_registry_exposes_customer_offer() {
        let registry = DomainRegistry::from_config(&default_domains()).unwrap();
        let domain = registry.resolve("customer-offer", "customer-offer-procedure").unwrap();

        assert_eq!(domain.record_property_name(), "customerOfferProcedure");
        assert_eq!(domain.record_id_key(), "customerOfferProcedureId");
        assert_eq!(domain.collection(), "customer-offer-procedure");
        let names: Vec<_> = domain.qualifiers().map(QualifierDefinition::name).collect();
        assert_eq!(names, ["customer", "product"]);
    }

    #[test]
    fn qualifier_keys_derive_from_name() {
        let q = QualifierDefinition::new("customer");
        assert_eq!(q.schema().field(), "customerId");
        assert_eq!(q.id_key(), "customerId");
        assert_eq!(q.reference_key(), "customerReference");
    }

    #[test]
    fn duplicate_qualifiers_are_rejected() {
        let mut domains = default_domains();
        if let Some(cfg) = domains.get_mut("customer-offer") {
            cfg.qualifiers.push("customer".to_owned());
        }
        let err = DomainRegistry::from_config(&domains).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDefinition { .. }));
    }

    #[test]
    fn reserved_record_name_is_rejected() {
        let mut domains = DomainsConfig::new();
        domains.insert(
            "x".to_owned(),
            DomainConfig {
                record: "qualifiers".to_owned(),
                property: None,
                collection: None,
                qualifiers: vec![],
            },
        );
        assert!(DomainRegistry::from_config(&domains).is_err());
    }
}
