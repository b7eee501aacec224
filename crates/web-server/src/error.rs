use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use booking::error::BookingError;
use serde_json::json;
use thiserror::Error;

/// Every error this API returns, bucketed into the four wire categories
/// clients dispatch on.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AppError::InvalidArgument(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        AppError::Unauthenticated(message.into())
    }

    /// The machine-readable category carried in the response body, so
    /// clients do not have to parse human-oriented messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "invalid-argument",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::AlreadyExists(_) => "already-exists",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(message) => AppError::InvalidArgument(message),
            conflict @ BookingError::Conflict => AppError::AlreadyExists(conflict.to_string()),
            BookingError::Store(store_err) => {
                // Storage details stay in the log; the client gets a generic 500.
                tracing::error!(error = ?store_err, "Storage error.");
                AppError::Internal("An internal error occurred while booking.".to_string())
            }
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (status, body).into_response()
    }
}
