use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::models::form_schema::AddFieldRequest;
use crate::responses::JsonResponse;
use crate::services::form_schemas::{self, FormSchemaError, RECORD_ACTIONS};
use crate::state::AppState;

fn error_response(err: FormSchemaError) -> Response {
    match err {
        FormSchemaError::UnknownForm(_) => JsonResponse::not_found(&err.to_string()),
        FormSchemaError::Store(ref db) => {
            error!(error = ?db, "form schema store error");
            JsonResponse::server_error()
        }
        other => JsonResponse::bad_request(&other.to_string()),
    }
}

pub async fn get_form_schema(
    State(app_state): State<AppState>,
    Path((form_id, customer_id)): Path<(String, String)>,
) -> Response {
    match form_schemas::load_schema(app_state.form_schema_repo.as_ref(), &form_id, &customer_id)
        .await
    {
        Ok(schema) => (StatusCode::OK, Json(schema)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn add_form_field(
    State(app_state): State<AppState>,
    Path((form_id, customer_id)): Path<(String, String)>,
    body: Result<Json<AddFieldRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return JsonResponse::bad_request(&rejection.body_text()),
    };

    match form_schemas::add_field(
        app_state.form_schema_repo.as_ref(),
        &form_id,
        &customer_id,
        &request.field,
    )
    .await
    {
        Ok(schema) => (
            StatusCode::OK,
            Json(json!({ "success": true, "schema": schema })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list_record_actions() -> Response {
    Json(RECORD_ACTIONS).into_response()
}
