//! In-process document engine.
//!
//! Supports the query shapes the gateway issues against MongoDB:
//! * filters: top-level equality on any field;
//! * projections: `_id` exclusion, inclusion of top-level or dotted paths (one document or
//!   array level per dot), and `{ field: { $elemMatch: { .. } } }`;
//! * updates: `$set` and `$push` on top-level fields, and whole-document replacement.

use crate::{DatabaseError, InsertOutcome, UpdateOutcome};
use fxhash::FxHashMap;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use parking_lot::RwLock;
use std::sync::Arc;

const ID: &str = "_id";

#[derive(Debug, Default)]
pub(crate) struct MemoryEngine {
    collections: RwLock<FxHashMap<String, Vec<Document>>>,
}

#[derive(Debug, Clone)]
pub(crate) struct MemoryCollection {
    engine: Arc<MemoryEngine>,
    name: String,
}

impl MemoryCollection {
    pub(crate) fn new(engine: Arc<MemoryEngine>, name: &str) -> Self {
        Self { engine, name: name.to_owned() }
    }

    pub(crate) fn insert_one(&self, mut document: Document) -> Result<InsertOutcome, DatabaseError> {
        let inserted_id = match document.get(ID) {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                let mut with_id = Document::new();
                with_id.insert(ID, id.clone());
                for (key, value) in document {
                    with_id.insert(key, value);
                }
                document = with_id;
                id
            }
        };

        let mut collections = self.engine.collections.write();
        let documents = collections.entry(self.name.clone()).or_default();
        if documents.iter().any(|d| d.get(ID) == Some(&inserted_id)) {
            return Err(DatabaseError::Write {
                message: format!("duplicate key {ID}: {inserted_id}").into(),
                context: Some(self.name.clone().into()),
            });
        }
        documents.push(document);

        Ok(InsertOutcome { inserted_id, inserted_count: 1 })
    }

    pub(crate) fn find_one(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Option<Document>, DatabaseError> {
        Ok(self.find(filter, projection, 1)?.pop())
    }

    pub(crate) fn find(
        &self,
        filter: &Document,
        projection: Option<&Document>,
        limit: usize,
    ) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.engine.collections.read();
        let Some(documents) = collections.get(&self.name) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for document in documents {
            if found.len() == limit {
                break;
            }
            if matches(document, filter)? {
                found.push(match projection {
                    Some(p) => project(document, p)?,
                    None => document.clone(),
                });
            }
        }
        Ok(found)
    }

    pub(crate) fn update_one(
        &self,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateOutcome, DatabaseError> {
        if update.keys().any(|k| !k.starts_with('$')) {
            return Err(DatabaseError::Validation {
                message: "update document requires atomic operators".into(),
                context: Some(self.name.clone().into()),
            });
        }

        let mut collections = self.engine.collections.write();
        let Some(document) = first_match(collections.get_mut(&self.name), filter)? else {
            return Ok(UpdateOutcome::default());
        };

        let mut updated = document.clone();
        for (operator, fields) in update {
            let Bson::Document(fields) = fields else {
                return Err(DatabaseError::Write {
                    message: format!("modifier {operator} expects a document").into(),
                    context: None,
                });
            };
            for (field, value) in fields {
                apply_operator(&mut updated, operator, field, value)?;
            }
        }

        let modified = updated != *document;
        *document = updated;
        Ok(UpdateOutcome { matched_count: 1, modified_count: u64::from(modified) })
    }

    pub(crate) fn replace_one(
        &self,
        filter: &Document,
        replacement: Document,
    ) -> Result<UpdateOutcome, DatabaseError> {
        if replacement.keys().any(|k| k.starts_with('$')) {
            return Err(DatabaseError::Validation {
                message: "replacement document must not contain update operators".into(),
                context: Some(self.name.clone().into()),
            });
        }

        let mut collections = self.engine.collections.write();
        let Some(document) = first_match(collections.get_mut(&self.name), filter)? else {
            return Ok(UpdateOutcome::default());
        };

        let mut updated = Document::new();
        if let Some(id) = document.get(ID) {
            if replacement.get(ID).is_some_and(|new_id| new_id != id) {
                return Err(DatabaseError::Write {
                    message: format!("the field '{ID}' is immutable").into(),
                    context: Some(self.name.clone().into()),
                });
            }
            updated.insert(ID, id.clone());
        }
        for (key, value) in replacement {
            if key != ID {
                updated.insert(key, value);
            }
        }

        let modified = updated != *document;
        *document = updated;
        Ok(UpdateOutcome { matched_count: 1, modified_count: u64::from(modified) })
    }
}

fn first_match<'a>(
    documents: Option<&'a mut Vec<Document>>,
    filter: &Document,
) -> Result<Option<&'a mut Document>, DatabaseError> {
    let Some(documents) = documents else {
        return Ok(None);
    };
    for document in documents.iter_mut() {
        if matches(document, filter)? {
            return Ok(Some(document));
        }
    }
    Ok(None)
}

fn matches(document: &Document, filter: &Document) -> Result<bool, DatabaseError> {
    for (key, expected) in filter {
        if key.starts_with('$') {
            return Err(unsupported(format!("filter operator {key}")));
        }
        if document.get(key) != Some(expected) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn apply_operator(
    document: &mut Document,
    operator: &str,
    field: &str,
    value: &Bson,
) -> Result<(), DatabaseError> {
    if field.contains('.') {
        return Err(unsupported(format!("dotted update path '{field}'")));
    }
    match operator {
        "$set" => {
            if field == ID && document.get(ID) != Some(value) {
                return Err(DatabaseError::Write {
                    message: format!("the field '{ID}' is immutable").into(),
                    context: None,
                });
            }
            document.insert(field, value.clone());
        }
        "$push" => match document.get_mut(field) {
            Some(Bson::Array(items)) => items.push(value.clone()),
            Some(other) => {
                return Err(DatabaseError::Write {
                    message: format!(
                        "The field '{field}' must be an array but is of type {:?}",
                        other.element_type()
                    )
                    .into(),
                    context: None,
                });
            }
            None => {
                document.insert(field, Bson::Array(vec![value.clone()]));
            }
        },
        other => return Err(unsupported(format!("update operator {other}"))),
    }
    Ok(())
}

fn project(document: &Document, projection: &Document) -> Result<Document, DatabaseError> {
    let mut include_id = true;
    let mut paths = Vec::new();
    let mut elem_matches = Vec::new();

    for (key, value) in projection {
        match value {
            Bson::Document(operator) if operator.contains_key("$elemMatch") => {
                let criteria = operator
                    .get_document("$elemMatch")
                    .map_err(|e| unsupported(format!("$elemMatch on '{key}': {e}")))?;
                elem_matches.push((key.as_str(), criteria));
            }
            Bson::Document(_) => return Err(unsupported(format!("projection operator on '{key}'"))),
            _ if key == ID => include_id = is_truthy(value),
            _ if is_truthy(value) => paths.push(key.as_str()),
            _ => return Err(unsupported(format!("exclusion of '{key}'"))),
        }
    }

    if paths.is_empty() && elem_matches.is_empty() {
        let mut projected = document.clone();
        if !include_id {
            projected.remove(ID);
        }
        return Ok(projected);
    }

    let mut projected = Document::new();
    if include_id {
        if let Some(id) = document.get(ID) {
            projected.insert(ID, id.clone());
        }
    }
    for path in paths {
        let (head, rest) = path.split_once('.').map_or((path, None), |(h, r)| (h, Some(r)));
        let Some(value) = document.get(head) else {
            continue;
        };
        let value = match rest {
            None => value.clone(),
            Some(rest) => match select_path(value, rest) {
                Some(v) => v,
                None => continue,
            },
        };
        let merged = match projected.remove(head) {
            Some(existing) => merge(existing, value),
            None => value,
        };
        projected.insert(head, merged);
    }
    for (field, criteria) in elem_matches {
        let Some(Bson::Array(items)) = document.get(field) else {
            continue;
        };
        let mut hit = None;
        for item in items {
            if let Bson::Document(element) = item {
                if matches(element, criteria)? {
                    hit = Some(item.clone());
                    break;
                }
            }
        }
        if let Some(hit) = hit {
            projected.insert(field, Bson::Array(vec![hit]));
        }
    }
    Ok(projected)
}

/// Projects `path` out of a nested value; arrays are mapped element-wise.
fn select_path(value: &Bson, path: &str) -> Option<Bson> {
    match value {
        Bson::Document(inner) => {
            let (head, rest) = path.split_once('.').map_or((path, None), |(h, r)| (h, Some(r)));
            let mut out = Document::new();
            if let Some(child) = inner.get(head) {
                let child = match rest {
                    None => child.clone(),
                    Some(rest) => select_path(child, rest)?,
                };
                out.insert(head, child);
            }
            Some(Bson::Document(out))
        }
        Bson::Array(items) => Some(Bson::Array(
            items
                .iter()
                .filter(|item| matches!(item, Bson::Document(_) | Bson::Array(_)))
                .filter_map(|item| select_path(item, path))
                .collect(),
        )),
        _ => None,
    }
}

/// Combines two projections of the same source value.
fn merge(left: Bson, right: Bson) -> Bson {
    match (left, right) {
        (Bson::Document(mut l), Bson::Document(r)) => {
            for (key, value) in r {
                let combined = match l.remove(&key) {
                    Some(existing) => merge(existing, value),
                    None => value,
                };
                l.insert(key, combined);
            }
            Bson::Document(l)
        }
        (Bson::Array(l), Bson::Array(r)) => {
            Bson::Array(l.into_iter().zip(r).map(|(a, b)| merge(a, b)).collect())
        }
        (_, right) => right,
    }
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        _ => true,
    }
}

fn unsupported(message: String) -> DatabaseError {
    DatabaseError::Unsupported { message: message.into(), context: Some("mem://".into()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn collection() -> MemoryCollection {
        MemoryCollection::new(Arc::new(MemoryEngine::default()), "records")
    }

    #[test]
    fn insert_generates_leading_object_id() {
        let c = collection();
        let outcome = c.insert_one(doc! { "status": "open" }).unwrap();
        assert!(matches!(outcome.inserted_id, Bson::ObjectId(_)));

        let stored = c.find_one(&doc! {}, None).unwrap().unwrap();
        assert_eq!(stored.keys().next().map(String::as_str), Some("_id"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let c = collection();
        let id = ObjectId::new();
        c.insert_one(doc! { "_id": id }).unwrap();
        assert!(matches!(c.insert_one(doc! { "_id": id }), Err(DatabaseError::Write { .. })));
    }

    #[test]
    fn find_respects_insertion_order_and_limit() {
        let c = collection();
        let ids: Vec<_> = (0..5).map(|_| c.insert_one(doc! {}).unwrap().inserted_id).collect();

        let found = c.find(&doc! {}, Some(&doc! { "_id": 1 }), 3).unwrap();
        let found: Vec<_> = found.iter().filter_map(|d| d.get("_id").cloned()).collect();
        assert_eq!(found, ids[..3]);
    }

    #[test]
    fn dotted_projection_maps_over_arrays() {
        let c = collection();
        let (a, b) = (ObjectId::new(), ObjectId::new());
        let id = c
            .insert_one(doc! {
                "customer": [ { "_id": a, "customerId": "C1" }, { "_id": b, "customerId": "C2" } ],
                "other": 1,
            })
            .unwrap()
            .inserted_id;

        let projected =
            c.find_one(&doc! { "_id": id }, Some(&doc! { "_id": 0, "customer._id": 1 })).unwrap();
        assert_eq!(projected, Some(doc! { "customer": [ { "_id": a }, { "_id": b } ] }));
    }

    #[test]
    fn elem_match_projection_keeps_first_hit_only() {
        let c = collection();
        let (a, b) = (ObjectId::new(), ObjectId::new());
        let id = c
            .insert_one(doc! {
                "customer": [ { "_id": a, "customerId": "C1" }, { "_id": b, "customerId": "C2" } ],
            })
            .unwrap()
            .inserted_id;

        let hit = c
            .find_one(&doc! { "_id": id.clone() }, Some(&doc! { "customer": { "$elemMatch": { "_id": b } } }))
            .unwrap()
            .unwrap();
        assert_eq!(hit, doc! { "_id": id.clone(), "customer": [ { "_id": b, "customerId": "C2" } ] });

        let miss = c
            .find_one(
                &doc! { "_id": id.clone() },
                Some(&doc! { "customer": { "$elemMatch": { "_id": ObjectId::new() } } }),
            )
            .unwrap()
            .unwrap();
        assert_eq!(miss, doc! { "_id": id });
    }

    #[test]
    fn push_creates_and_appends_arrays() {
        let c = collection();
        let id = c.insert_one(doc! { "name": "x" }).unwrap().inserted_id;

        for reference in ["C1", "C2"] {
            let outcome = c
                .update_one(&doc! { "_id": id.clone() }, &doc! { "$push": { "customer": { "customerId": reference } } })
                .unwrap();
            assert_eq!(outcome, UpdateOutcome { matched_count: 1, modified_count: 1 });
        }

        let stored = c.find_one(&doc! { "_id": id.clone() }, None).unwrap().unwrap();
        assert_eq!(stored.get_array("customer").unwrap().len(), 2);
    }

    #[test]
    fn push_onto_scalar_is_rejected() {
        let c = collection();
        let id = c.insert_one(doc! { "customer": "C1" }).unwrap().inserted_id;
        let err = c.update_one(&doc! { "_id": id }, &doc! { "$push": { "customer": 1 } });
        assert!(matches!(err, Err(DatabaseError::Write { .. })));
    }

    #[test]
    fn update_without_match_reports_zero_counts() {
        let c = collection();
        let outcome =
            c.update_one(&doc! { "_id": ObjectId::new() }, &doc! { "$set": { "a": 1 } }).unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
    }

    #[test]
    fn replace_keeps_id_and_reports_no_op() {
        let c = collection();
        let id = c.insert_one(doc! { "a": 1 }).unwrap().inserted_id;

        let changed = c.replace_one(&doc! { "_id": id.clone() }, doc! { "b": 2 }).unwrap();
        assert_eq!(changed.modified_count, 1);
        let unchanged = c.replace_one(&doc! { "_id": id.clone() }, doc! { "b": 2 }).unwrap();
        assert_eq!(unchanged, UpdateOutcome { matched_count: 1, modified_count: 0 });

        let stored = c.find_one(&doc! { "_id": id.clone() }, None).unwrap().unwrap();
        assert_eq!(stored, doc! { "_id": id, "b": 2 });
    }

    #[test]
    fn operator_filters_are_unsupported() {
        let c = collection();
        c.insert_one(doc! {}).unwrap();
        let err = c.find_one(&doc! { "$where": "true" }, None);
        assert!(matches!(err, Err(DatabaseError::Unsupported { .. })));
    }
}
