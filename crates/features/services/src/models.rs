use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use svcd_database::bson::oid::ObjectId;
use svcd_derive::api_model;
use svcd_domain::registry::{QualifierDefinition, ServiceDomain};
use utoipa::openapi::schema::{ObjectBuilder, Schema, Type};
use utoipa::openapi::RefOr;

/// A list of identifiers or names
#[api_model]
pub struct ItemsResponse {
    /// Record identifiers (24-character hex) or qualifier names
    pub items: Vec<String>,
}

impl ItemsResponse {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { items: items.into_iter().map(Into::into).collect() }
    }
}

/// `{ "<recordProperty>Id": "<hex>" }`
#[derive(Debug)]
pub struct RecordView<'a> {
    domain: &'a ServiceDomain,
    id: ObjectId,
}

impl<'a> RecordView<'a> {
    pub const fn new(domain: &'a ServiceDomain, id: ObjectId) -> Self {
        Self { domain, id }
    }
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.domain.record_id_key(), &self.id.to_hex())?;
        map.end()
    }
}

/// `{ "<recordProperty>Id", "<qualifier>Id", "<qualifier>Reference" }`
#[derive(Debug)]
pub struct QualifiedView<'a> {
    domain: &'a ServiceDomain,
    qualifier: &'a QualifierDefinition,
    record_id: ObjectId,
    qualifier_id: ObjectId,
    reference: Value,
}

impl<'a> QualifiedView<'a> {
    pub const fn new(
        domain: &'a ServiceDomain,
        qualifier: &'a QualifierDefinition,
        record_id: ObjectId,
        qualifier_id: ObjectId,
        reference: Value,
    ) -> Self {
        Self { domain, qualifier, record_id, qualifier_id, reference }
    }
}

impl Serialize for QualifiedView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(&self.domain.record_id_key(), &self.record_id.to_hex())?;
        map.serialize_entry(self.qualifier.id_key(), &self.qualifier_id.to_hex())?;
        map.serialize_entry(&self.qualifier.reference_key(), &self.reference)?;
        map.end()
    }
}

/// OpenAPI stand-in for bodies whose keys depend on the domain.
#[derive(Debug)]
pub struct DynamicObject;

impl utoipa::PartialSchema for DynamicObject {
    fn schema() -> RefOr<Schema> {
        RefOr::T(Schema::Object(
            ObjectBuilder::new()
                .schema_type(Type::Object)
                .description(Some("Keys are derived from the service domain and qualifier names"))
                .build(),
        ))
    }
}

impl utoipa::ToSchema for DynamicObject {}
