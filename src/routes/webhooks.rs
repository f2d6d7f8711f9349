use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::responses::JsonResponse;
use crate::services::dispatcher::{self, DispatchError, EnqueueFailure};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookDispatchResponse {
    success: bool,
    message: String,
    customer_id: String,
    execution_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed_workflows: Vec<EnqueueFailure>,
}

fn parse_payload(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body)
}

pub async fn webhook_receive(
    State(app_state): State<AppState>,
    Path(customer_id): Path<String>,
    body: Bytes,
) -> Response {
    if customer_id.trim().is_empty() {
        return JsonResponse::bad_request(&DispatchError::MissingCustomerId.to_string());
    }

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(err) => {
            info!(%customer_id, error = %err, "rejected webhook with invalid JSON body");
            return JsonResponse::bad_request("Invalid JSON payload");
        }
    };

    info!(%customer_id, payload = %payload, "received webhook");

    match dispatcher::dispatch(
        app_state.workflow_repo.as_ref(),
        app_state.execution_queue.as_ref(),
        &customer_id,
        payload,
    )
    .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(WebhookDispatchResponse {
                success: outcome.is_complete(),
                message: outcome.message(),
                customer_id,
                execution_ids: outcome.execution_ids,
                failed_workflows: outcome.failures,
            }),
        )
            .into_response(),
        Err(DispatchError::MissingCustomerId) => {
            JsonResponse::bad_request(&DispatchError::MissingCustomerId.to_string())
        }
        Err(err) => {
            error!(%customer_id, error = %err, "error processing webhook");
            JsonResponse::server_error()
        }
    }
}

/// Lets integrators check the URL before wiring it up.
pub async fn webhook_status(Path(customer_id): Path<String>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "message": "Webhook endpoint is active",
            "customerId": customer_id,
            "endpoint": format!("/api/webhooks/{}", customer_id),
        })),
    )
        .into_response()
}
