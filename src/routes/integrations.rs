use axum::{
    body::Bytes,
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::models::integration::Integration;
use crate::responses::JsonResponse;
use crate::services::integration_app::{ensure_connection, ConnectionError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EnsureConnectionBody {
    #[serde(default)]
    pub integration: Option<Integration>,
}

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

fn bearer_token(bearer: BearerHeader) -> Option<String> {
    bearer.map(|TypedHeader(auth)| auth.token().to_string())
}

/// A missing or unreadable body means no integration was supplied.
fn parse_body(body: &[u8]) -> EnsureConnectionBody {
    if body.iter().all(u8::is_ascii_whitespace) {
        return EnsureConnectionBody::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|err| {
        warn!(error = %err, "unreadable connection request body");
        EnsureConnectionBody::default()
    })
}

/// Always 200: the outcome, failures included, is carried in the body.
pub async fn ensure_token_extract_connection(
    State(app_state): State<AppState>,
    bearer: BearerHeader,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    let client = app_state.integration_client(bearer_token(bearer));
    let result = ensure_connection(&client, body.integration.as_ref()).await;
    Json(result).into_response()
}

/// Relays the caller's flow runs from the integration platform as `{items}`.
pub async fn list_flow_runs(State(app_state): State<AppState>, bearer: BearerHeader) -> Response {
    let client = app_state.integration_client(bearer_token(bearer));
    match client.list_flow_runs().await {
        Ok(page) => Json(json!({ "items": page.items })).into_response(),
        Err(ConnectionError::MissingToken) => {
            JsonResponse::unauthorized(&ConnectionError::MissingToken.to_string())
        }
        Err(err) => {
            error!(error = %err, status = ?err.status(), "error listing flow runs");
            JsonResponse::bad_gateway(&err.to_string())
        }
    }
}
