//! Filters, projections and updates sent to the document store.
//!
//! Qualifier names only reach these builders after they were matched against the
//! registry, so they are safe to use as field names.

use svcd_database::bson::oid::ObjectId;
use svcd_database::bson::{Bson, Document, doc};
use svcd_domain::registry::QualifierDefinition;

pub(crate) const ID: &str = "_id";

/// `{ _id: <id> }`
pub(crate) fn by_id(id: ObjectId) -> Document {
    doc! { ID: id }
}

/// Only the identifier of each record.
pub(crate) fn ids_only() -> Document {
    doc! { ID: 1 }
}

/// The identifiers of one qualifier array, without the record identifier.
pub(crate) fn qualifier_ids(qualifier: &QualifierDefinition) -> Document {
    doc! { ID: 0, format!("{}.{ID}", qualifier.name()): 1 }
}

/// The first element of the qualifier array whose `_id` is `qualifier_id`.
pub(crate) fn qualifier_element(qualifier: &QualifierDefinition, qualifier_id: ObjectId) -> Document {
    doc! { qualifier.name(): { "$elemMatch": { ID: qualifier_id } } }
}

/// Appends `{ _id, <qualifier>Id: reference }` to the qualifier array.
pub(crate) fn push_qualifier(
    qualifier: &QualifierDefinition,
    sub_id: ObjectId,
    reference: &str,
) -> Document {
    doc! {
        "$push": {
            qualifier.name(): {
                ID: sub_id,
                qualifier.id_key(): reference,
            }
        }
    }
}

/// Prepends a freshly generated `_id`, dropping any client-supplied one.
pub(crate) fn with_new_id(document: Document) -> (ObjectId, Document) {
    let id = ObjectId::new();
    let mut with_id = by_id(id);
    for (key, value) in without_id(document) {
        with_id.insert(key, value);
    }
    (id, with_id)
}

/// Removes a client-supplied `_id`; identifiers are always generated by the store layer.
pub(crate) fn without_id(mut document: Document) -> Document {
    document.remove(ID);
    document
}

/// Reads a document's `_id` as an `ObjectId`.
pub(crate) fn object_id(document: &Document) -> Option<ObjectId> {
    match document.get(ID) {
        Some(Bson::ObjectId(id)) => Some(*id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifier_projections_use_registered_name() {
        let customer = QualifierDefinition::new("customer");
        let sub = ObjectId::new();

        assert_eq!(qualifier_ids(&customer), doc! { "_id": 0, "customer._id": 1 });
        assert_eq!(
            qualifier_element(&customer, sub),
            doc! { "customer": { "$elemMatch": { "_id": sub } } }
        );
    }

    #[test]
    fn push_builds_sub_document_with_reference_key() {
        let product = QualifierDefinition::new("product");
        let sub = ObjectId::new();

        assert_eq!(
            push_qualifier(&product, sub, "P1"),
            doc! { "$push": { "product": { "_id": sub, "productId": "P1" } } }
        );
    }

    #[test]
    fn object_id_ignores_foreign_id_types() {
        let id = ObjectId::new();
        assert_eq!(object_id(&by_id(id)), Some(id));
        assert_eq!(object_id(&doc! { "_id": "5c23a4fc5acdb259389328d0" }), None);
        assert!(without_id(by_id(id)).is_empty());

        let (fresh, document) = with_new_id(doc! { "_id": "mine", "a": 1 });
        assert_ne!(fresh, id);
        assert_eq!(document, doc! { "_id": fresh, "a": 1 });
    }
}
