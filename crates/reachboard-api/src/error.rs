use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reachboard_core::ReachboardError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Reachboard error: {0}")]
    Reachboard(#[from] ReachboardError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Input data failures are server errors; a request naming something the
    /// dashboard does not have is the client's.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Reachboard(err) if err.is_data_error() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Reachboard(ReachboardError::UnknownMetric(_))
            | ApiError::Reachboard(ReachboardError::Selection(_))
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Reachboard(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            let data_error = matches!(self, ApiError::Reachboard(ref err) if err.is_data_error());
            error!(error = %self, data_error, "dashboard request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
