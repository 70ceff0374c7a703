use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::schedule::ScheduleError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Internal(String),
}

impl ApiError {
    fn to_error_response(code: &str, message: &str) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            error: ErrorObject {
                code: code.to_string(),
                message: message.to_string(),
            },
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(code, msg) => {
                (StatusCode::BAD_REQUEST, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::NotFound(code, msg) => {
                (StatusCode::NOT_FOUND, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Conflict(code, msg) => {
                (StatusCode::CONFLICT, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::to_error_response("INTERNAL", &msg),
            )
                .into_response(),
        }
    }
}

/// Domain errors already carry the context a caller reacts to (conflicting
/// id, attempted states); the HTTP status and stable code are decided here.
impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match &err {
            ScheduleError::Validation(msg) => ApiError::BadRequest("VALIDATION_ERROR", msg.clone()),
            ScheduleError::SlotInvalid(_) => ApiError::BadRequest("SLOT_INVALID", err.to_string()),
            ScheduleError::NotFound(_) => ApiError::NotFound("NOT_FOUND", err.to_string()),
            ScheduleError::SlotOccupied(_) => ApiError::Conflict("SLOT_OCCUPIED", err.to_string()),
            ScheduleError::InvalidTransition { .. } => {
                ApiError::Conflict("INVALID_TRANSITION", err.to_string())
            }
        }
    }
}
