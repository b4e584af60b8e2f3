use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Slot conflict: {0}")]
    SlotConflict(String),
    #[error("Payment declined by gateway (status {0})")]
    PaymentDeclined(String),
    #[error("Payment verification failed")]
    PaymentVerificationFailed,
    #[error("Booking context lost for correlation key {0}")]
    BookingContextLost(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::SlotConflict(_) => "slot_conflict",
            AppError::PaymentDeclined(_) => "payment_declined",
            AppError::PaymentVerificationFailed => "payment_verification_failed",
            AppError::BookingContextLost(_) => "booking_context_lost",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Upstream(_) => "upstream_error",
            AppError::Internal | AppError::InternalWithMsg(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::SlotConflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::PaymentDeclined(_) => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            AppError::PaymentVerificationFailed => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            AppError::BookingContextLost(_) => (StatusCode::GONE, "Booking context lost".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Upstream(msg) => {
                error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Upstream service unavailable".to_string())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
