use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;

use crate::responses::JsonResponse;
use crate::services::storage::{mock_presigned_url, StorageError};
use crate::state::AppState;

#[derive(Serialize)]
struct PublicUrlResponse {
    url: String,
}

pub async fn get_public_url(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match mock_presigned_url(&app_state.config.storage, &id, Utc::now()) {
        Ok(url) => Json(PublicUrlResponse { url }).into_response(),
        Err(err @ StorageError::MissingId) => JsonResponse::bad_request(&err.to_string()),
    }
}
