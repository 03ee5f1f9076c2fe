use crate::handlers;
use svcd_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// All `/services/...` routes.
///
/// `qualifiers` is a reserved record-level segment and takes precedence over `{id}`.
pub fn services_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_ids, handlers::create))
        .routes(routes!(handlers::list_qualifier_names))
        .routes(routes!(handlers::get_record, handlers::update))
        .routes(routes!(handlers::list_qualified_ids, handlers::create_qualified))
        .routes(routes!(handlers::get_qualified, handlers::update_qualified))
}
