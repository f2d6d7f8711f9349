pub mod forms;
pub mod integrations;
pub mod storage;
pub mod webhooks;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::responses::JsonResponse;
use crate::state::AppState;

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("Hello, RecordPoint!").into_response()
}

/// All application routes. Middleware (CORS, tracing, rate limiting) is layered on in `main`.
pub fn app_router(state: AppState) -> Router {
    // Public webhook routes (no auth; rate limited globally)
    let webhook_routes = Router::new().route(
        "/{customer_id}",
        post(webhooks::webhook_receive).get(webhooks::webhook_status),
    );

    let integration_routes = Router::new().route(
        "/token-extract/connection",
        post(integrations::ensure_token_extract_connection),
    );

    Router::new()
        .route("/", get(root))
        .nest("/api/webhooks", webhook_routes)
        .nest("/api/integrations", integration_routes)
        .route("/api/minio/get-public-url/{*id}", get(storage::get_public_url))
        .route(
            "/api/schema/{form_id}/{customer_id}",
            get(forms::get_form_schema).post(forms::add_form_field),
        )
        .route("/api/record-actions", get(forms::list_record_actions))
        .route("/api/flow-runs", get(integrations::list_flow_runs))
        .with_state(state)
}
