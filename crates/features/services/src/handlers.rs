use crate::error::{ServiceError, ServiceErrorExt};
use crate::models::{DynamicObject, ItemsResponse, QualifiedView, RecordView};
use crate::resolver::{
    DocumentPath, QualifiedPath, QualifierPath, RecordPath, parse_id, resolve, resolve_qualifier,
};
use crate::{query, render, validator};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{OriginalUri, Path, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use svcd_database::bson::oid::ObjectId;
use svcd_database::bson::{Bson, doc};
use svcd_derive::api_handler;
use svcd_domain::constants::{LIST_LIMIT, SERVICES_TAG};
use svcd_domain::registry::QualifierDefinition;
use svcd_kernel::server::{ApiState, ErrorBody};
use tracing::{error, info, instrument};

/// `201 Created` with an empty body and `Location: <request path>/<id>`.
fn created(uri: &Uri, id: &str) -> Response {
    let location = format!("{}/{id}", uri.path().trim_end_matches('/'));
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

#[api_handler(
    get,
    path = "/services/{domain}/{record}",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
    ),
    responses(
        (status = OK, description = "Up to 100 record identifiers", body = ItemsResponse),
        (status = NOT_FOUND, description = "Unknown domain or record", body = ErrorBody),
    ),
    tag = SERVICES_TAG,
)]
#[instrument(skip_all, fields(domain = %path.domain))]
pub(crate) async fn list_ids(
    State(state): State<ApiState>,
    Path(path): Path<RecordPath>,
) -> Result<Json<ItemsResponse>, ServiceError> {
    let domain = resolve(&state.registry, &path.domain, &path.record)?;

    let documents = state
        .database
        .collection(domain.collection())
        .find(doc! {}, Some(query::ids_only()), LIST_LIMIT)
        .await
        .context("Listing record ids")?;

    let items = documents.into_iter().filter_map(|mut d| d.remove(query::ID)).map(render::id_string);
    Ok(Json(ItemsResponse::new(items)))
}

#[api_handler(
    post,
    path = "/services/{domain}/{record}",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
    ),
    request_body(content = DynamicObject, description = "Initial record content; empty body creates an empty record"),
    responses(
        (status = CREATED, description = "Record created",
            headers(("location" = String, description = "Path of the new record"))),
        (status = BAD_REQUEST, description = "Body is not a JSON object", body = ErrorBody),
        (status = NOT_FOUND, description = "Unknown domain or record", body = ErrorBody),
    ),
    tag = SERVICES_TAG,
)]
#[instrument(skip_all, fields(domain = %path.domain))]
pub(crate) async fn create(
    State(state): State<ApiState>,
    Path(path): Path<RecordPath>,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ServiceError> {
    let domain = resolve(&state.registry, &path.domain, &path.record)?;
    let payload = render::record_document(render::parse_body(&body)?, domain)?;
    let (_, document) = query::with_new_id(payload);

    let outcome = state
        .database
        .collection(domain.collection())
        .insert_one(document)
        .await
        .context("Inserting record")?;

    if outcome.inserted_count != 1 {
        return Err(ServiceError::InsertFailure { inserted_count: outcome.inserted_count });
    }

    let id = render::id_string(outcome.inserted_id);
    info!(id = %id, "Record created");
    Ok(created(&uri, &id))
}

#[api_handler(
    get,
    path = "/services/{domain}/{record}/{id}",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
        ("id" = String, Path, description = "Record identifier (24-character hex)"),
    ),
    responses(
        (status = OK, description = "`{ <recordProperty>Id }`", body = DynamicObject),
        (status = NOT_FOUND, description = "Unknown domain, record or identifier", body = ErrorBody),
    ),
    tag = SERVICES_TAG,
)]
#[instrument(skip_all, fields(domain = %path.domain, id = %path.id))]
pub(crate) async fn get_record(
    State(state): State<ApiState>,
    Path(path): Path<DocumentPath>,
) -> Result<Response, ServiceError> {
    let domain = resolve(&state.registry, &path.domain, &path.record)?;
    let id = parse_id(&path.id, "record id")?;

    state
        .database
        .collection(domain.collection())
        .find_one(query::by_id(id), Some(query::ids_only()))
        .await
        .context("Reading record")?
        .ok_or_else(ServiceError::not_found)?;

    Ok(Json(RecordView::new(domain, id)).into_response())
}

#[api_handler(
    put,
    path = "/services/{domain}/{record}/{id}",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
        ("id" = String, Path, description = "Record identifier (24-character hex)"),
    ),
    request_body(content = DynamicObject, description = "Replacement content; `_id` is ignored"),
    responses(
        (status = OK, description = "The record after replacement", body = DynamicObject),
        (status = BAD_REQUEST, description = "Body is not a JSON object", body = ErrorBody),
        (status = NOT_FOUND, description = "Unknown domain, record or identifier", body = ErrorBody),
    ),
    tag = SERVICES_TAG,
)]
#[instrument(skip_all, fields(domain = %path.domain, id = %path.id))]
pub(crate) async fn update(
    State(state): State<ApiState>,
    Path(path): Path<DocumentPath>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let domain = resolve(&state.registry, &path.domain, &path.record)?;
    let id = parse_id(&path.id, "record id")?;
    let payload = render::record_document(render::parse_body(&body)?, domain)?;
    let replacement = query::without_id(payload);

    let collection = state.database.collection(domain.collection());
    let outcome =
        collection.replace_one(query::by_id(id), replacement).await.context("Replacing record")?;

    match outcome.matched_count {
        0 => return Err(ServiceError::not_found()),
        1 => {}
        _ => {
            error!(matched = outcome.matched_count, "Replacement matched several records");
            return Err(ServiceError::UpdateMismatch {
                matched_count: outcome.matched_count,
                modified_count: outcome.modified_count,
            });
        }
    }

    // Separate round trip; a concurrent writer may land in between.
    let updated = collection
        .find_one(query::by_id(id), None)
        .await
        .context("Re-reading record")?
        .ok_or_else(ServiceError::not_found)?;

    Ok(Json(Value::Object(render::document_to_map(updated))))
}

#[api_handler(
    get,
    path = "/services/{domain}/{record}/qualifiers",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
    ),
    responses(
        (status = OK, description = "Registered business qualifier names", body = ItemsResponse),
        (status = NOT_FOUND, description = "Unknown domain or record", body = ErrorBody),
    ),
    tag = SERVICES_TAG,
)]
pub(crate) async fn list_qualifier_names(
    State(state): State<ApiState>,
    Path(path): Path<RecordPath>,
) -> Result<Json<ItemsResponse>, ServiceError> {
    let domain = resolve(&state.registry, &path.domain, &path.record)?;
    Ok(Json(ItemsResponse::new(domain.qualifiers().map(QualifierDefinition::name))))
}

#[api_handler(
    get,
    path = "/services/{domain}/{record}/{id}/{qualifier}",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
        ("id" = String, Path, description = "Record identifier (24-character hex)"),
        ("qualifier" = String, Path, description = "Business qualifier name"),
    ),
    responses(
        (status = OK, description = "Identifiers of the record's qualifier entries", body = ItemsResponse),
        (status = NOT_FOUND, description = "Unknown domain, record, identifier or qualifier", body = ErrorBody),
    ),
    tag = SERVICES_TAG,
)]
#[instrument(skip_all, fields(domain = %path.domain, id = %path.id, qualifier = %path.qualifier))]
pub(crate) async fn list_qualified_ids(
    State(state): State<ApiState>,
    Path(path): Path<QualifierPath>,
) -> Result<Json<ItemsResponse>, ServiceError> {
    let domain = resolve(&state.registry, &path.domain, &path.record)?;
    let qualifier = resolve_qualifier(domain, &path.qualifier)?;
    let id = parse_id(&path.id, "record id")?;

    let record = state
        .database
        .collection(domain.collection())
        .find_one(query::by_id(id), Some(query::qualifier_ids(qualifier)))
        .await
        .context("Reading qualifier ids")?
        .ok_or_else(ServiceError::not_found)?;

    let items: Vec<String> = match record.get(qualifier.name()) {
        Some(Bson::Array(entries)) => entries
            .iter()
            .filter_map(Bson::as_document)
            .filter_map(|entry| entry.get(query::ID).cloned())
            .map(render::id_string)
            .collect(),
        _ => Vec::new(),
    };
    Ok(Json(ItemsResponse { items }))
}

#[api_handler(
    post,
    path = "/services/{domain}/{record}/{id}/{qualifier}",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
        ("id" = String, Path, description = "Record identifier (24-character hex)"),
        ("qualifier" = String, Path, description = "Business qualifier name"),
    ),
    request_body(content = DynamicObject, description = "Exactly `{ \"<qualifier>Id\": \"<alphanumeric>\" }`"),
    responses(
        (status = CREATED, description = "Qualifier entry appended",
            headers(("location" = String, description = "Path of the new qualifier entry"))),
        (status = BAD_REQUEST, description = "Payload violates the qualifier schema", body = ErrorBody),
        (status = NOT_FOUND, description = "Unknown domain, record, identifier or qualifier", body = ErrorBody),
    ),
    tag = SERVICES_TAG,
)]
#[instrument(skip_all, fields(domain = %path.domain, id = %path.id, qualifier = %path.qualifier))]
pub(crate) async fn create_qualified(
    State(state): State<ApiState>,
    Path(path): Path<QualifierPath>,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ServiceError> {
    let domain = resolve(&state.registry, &path.domain, &path.record)?;
    let qualifier = resolve_qualifier(domain, &path.qualifier)?;
    let id = parse_id(&path.id, "record id")?;

    let payload = render::parse_body(&body)?;
    let reference = validator::validate(payload.as_ref(), qualifier.schema())?;

    let sub_id = ObjectId::new();
    let outcome = state
        .database
        .collection(domain.collection())
        .update_one(query::by_id(id), query::push_qualifier(qualifier, sub_id, reference))
        .await
        .context("Appending qualifier")?;

    match outcome.modified_count {
        0 => Err(ServiceError::not_found()),
        1 => {
            info!(sub_id = %sub_id, "Qualifier entry created");
            Ok(created(&uri, &sub_id.to_hex()))
        }
        _ => Err(ServiceError::UpdateMismatch {
            matched_count: outcome.matched_count,
            modified_count: outcome.modified_count,
        }),
    }
}

#[api_handler(
    get,
    path = "/services/{domain}/{record}/{id}/{qualifier}/{qualifier_id}",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
        ("id" = String, Path, description = "Record identifier (24-character hex)"),
        ("qualifier" = String, Path, description = "Business qualifier name"),
        ("qualifier_id" = String, Path, description = "Qualifier entry identifier (24-character hex)"),
    ),
    responses(
        (status = OK, description = "`{ <recordProperty>Id, <qualifier>Id, <qualifier>Reference }`", body = DynamicObject),
        (status = NOT_FOUND, description = "Record or qualifier entry absent", body = ErrorBody),
    ),
    tag = SERVICES_TAG,
)]
#[instrument(skip_all, fields(domain = %path.domain, id = %path.id, qualifier = %path.qualifier))]
pub(crate) async fn get_qualified(
    State(state): State<ApiState>,
    Path(path): Path<QualifiedPath>,
) -> Result<Response, ServiceError> {
    let domain = resolve(&state.registry, &path.domain, &path.record)?;
    let qualifier = resolve_qualifier(domain, &path.qualifier)?;
    let id = parse_id(&path.id, "record id")?;
    let qualifier_id = parse_id(&path.qualifier_id, "qualifier id")?;

    let record = state
        .database
        .collection(domain.collection())
        .find_one(query::by_id(id), Some(query::qualifier_element(qualifier, qualifier_id)))
        .await
        .context("Reading qualifier entry")?
        .ok_or_else(ServiceError::not_found)?;

    let entry = match record.get(qualifier.name()) {
        Some(Bson::Array(entries)) => entries.first().and_then(Bson::as_document),
        _ => None,
    }
    .ok_or_else(ServiceError::not_found)?;

    let record_id = query::object_id(&record).unwrap_or(id);
    let entry_id = query::object_id(entry).unwrap_or(qualifier_id);
    let reference = entry.get(qualifier.id_key()).cloned().map_or(Value::Null, render::to_json);

    Ok(Json(QualifiedView::new(domain, qualifier, record_id, entry_id, reference)).into_response())
}

#[api_handler(
    put,
    path = "/services/{domain}/{record}/{id}/{qualifier}/{qualifier_id}",
    params(
        ("domain" = String, Path, description = "Service domain name"),
        ("record" = String, Path, description = "Control record name"),
        ("id" = String, Path, description = "Record identifier (24-character hex)"),
        ("qualifier" = String, Path, description = "Business qualifier name"),
        ("qualifier_id" = String, Path, description = "Qualifier entry identifier (24-character hex)"),
    ),
    responses((status = NOT_IMPLEMENTED, description = "Not supported yet", body = ErrorBody)),
    tag = SERVICES_TAG,
)]
pub(crate) async fn update_qualified() -> Result<Response, ServiceError> {
    Err(ServiceError::NotImplemented { operation: "updateQualified" })
}
