use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::limiter::CounterStoreError;
use crate::utils::error_codes;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TooManyRequests,
    NotFound(String),
    InternalServerError,
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match self {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, message)
            }
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                error_codes::RATE_LIMIT,
                "请求次数已达上限".to_string(),
            ),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND, message),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "内部服务器错误".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            code,
            error_message,
        });

        (status, body).into_response()
    }
}

impl From<CounterStoreError> for AppError {
    fn from(e: CounterStoreError) -> Self {
        tracing::error!("Counter store failure: {}", e);
        AppError::InternalServerError
    }
}
