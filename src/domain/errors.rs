use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error taxonomy surfaced to callers as `errorKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    NotFoundError,
    InactiveResourceError,
    CapacityExceededError,
    ConflictError,
    GuardError,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::NotFoundError => "NotFoundError",
            ErrorKind::InactiveResourceError => "InactiveResourceError",
            ErrorKind::CapacityExceededError => "CapacityExceededError",
            ErrorKind::ConflictError => "ConflictError",
            ErrorKind::GuardError => "GuardError",
            ErrorKind::InternalError => "InternalError",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Kennel in maintenance: {0}")]
    InactiveResource(String),
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Guard violation: {0}")]
    Guard(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::ValidationError,
            EngineError::NotFound(_) => ErrorKind::NotFoundError,
            EngineError::InactiveResource(_) => ErrorKind::InactiveResourceError,
            EngineError::CapacityExceeded(_) => ErrorKind::CapacityExceededError,
            EngineError::Conflict(_) => ErrorKind::ConflictError,
            EngineError::Guard(_) => ErrorKind::GuardError,
            EngineError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// The bare message, without the kind prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            EngineError::Validation(msg)
            | EngineError::NotFound(msg)
            | EngineError::InactiveResource(msg)
            | EngineError::CapacityExceeded(msg)
            | EngineError::Conflict(msg)
            | EngineError::Guard(msg)
            | EngineError::Internal(msg) => msg,
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error_kind: self.kind(),
            message: self.message().to_string(),
        }
    }
}

/// Wire shape of an engine error: `{ "errorKind": ..., "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error_kind: ErrorKind,
    pub message: String,
}

pub type EngineResult<T> = Result<T, EngineError>;
