use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

/// Body of every non-2xx response: `{"error": "..."}`.
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

impl JsonResponse {
    pub fn success(msg: &str) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(JsonResponse {
                success: true,
                message: msg.to_string(),
            }),
        )
    }

    pub fn bad_request(msg: &str) -> Response {
        error(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Response {
        error(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: &str) -> Response {
        error(StatusCode::NOT_FOUND, msg)
    }

    pub fn bad_gateway(msg: &str) -> Response {
        error(StatusCode::BAD_GATEWAY, msg)
    }

    /// Details stay in the logs; callers only ever see the generic message.
    pub fn server_error() -> Response {
        error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_MESSAGE)
    }

    pub fn too_many_requests(msg: &str) -> Response {
        error(StatusCode::TOO_MANY_REQUESTS, msg)
    }
}
