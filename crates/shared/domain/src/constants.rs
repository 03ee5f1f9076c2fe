//! Names and limits used across the HTTP surface.

/// `OpenAPI` tag for service domain routes.
pub const SERVICES_TAG: &str = "Services";
/// `OpenAPI` tag for operational routes.
pub const SYSTEM_TAG: &str = "System";

/// Upper bound on identifiers returned by list operations.
pub const LIST_LIMIT: i64 = 100;

/// Suffix appended to record property and qualifier names to form identifier keys.
pub const ID_SUFFIX: &str = "Id";
/// Suffix for the key carrying a qualifier's domain-specific reference value.
pub const REFERENCE_SUFFIX: &str = "Reference";

/// Path segment reserved for listing qualifier names.
pub const QUALIFIERS_SEGMENT: &str = "qualifiers";

/// Domain shipped in the default configuration.
pub const CUSTOMER_OFFER: &str = "customer-offer";
pub const CUSTOMER_OFFER_PROCEDURE: &str = "customer-offer-procedure";
