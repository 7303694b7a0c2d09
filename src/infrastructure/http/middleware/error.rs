use crate::domain::errors::{EngineError, ErrorKind, ErrorPayload};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// Engine error carried to the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(EngineError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::NotFoundError => StatusCode::NOT_FOUND,
            ErrorKind::InactiveResourceError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::CapacityExceededError
            | ErrorKind::ConflictError
            | ErrorKind::GuardError => StatusCode::CONFLICT,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let body: ErrorPayload = self.0.payload();
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
