use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use svcd_kernel::prelude::{ApiState, ErrorBody, system_router};
use svcd_kernel::server::{method_not_allowed, not_found};
use svcd_services::services_router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[cfg(not(panic = "unwind"))]
compile_error!("svcd-server isolates handler panics with CatchPanicLayer and must be built with panic = \"unwind\"");

#[derive(OpenApi)]
#[openapi(info(
    title = "Service Domains API",
    description = "Generic CRUD gateway for configured service domains"
))]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();

    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(system_router())
        .merge(services_router())
        .with_state(state)
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/api", api_doc);

    Router::new()
        .merge(openapi_routes)
        .merge(scalar_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Converts a handler panic into the standard 500 body; the process keeps serving.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(detail, "Request handler panicked");

    ErrorBody::new(StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred")
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn panicking_handler_yields_internal_error_body() {
        let app = Router::new()
            .route("/boom", get(|| async { panic!("handler exploded") as () }))
            .route("/ok", get(|| async { "ok" }))
            .layer(CatchPanicLayer::custom(handle_panic));

        let res = app
            .clone()
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value =
            serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(body["statusCode"], 500);
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["message"], "An internal server error occurred");

        let res = app.oneshot(Request::get("/ok").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
