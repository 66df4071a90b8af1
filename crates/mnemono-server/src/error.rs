use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mnemono_core::error::MnemonoError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<MnemonoError>() {
            Some(MnemonoError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            Some(MnemonoError::MissingToken) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::warn!(status = %status, error = %self.0, "request failed");
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
