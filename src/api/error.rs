use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorResponse;
use crate::services::RequirementError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    InternalError { message: String, detail: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InternalError { message, detail } => {
                write!(f, "Internal error: {}: {}", message, detail)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Store messages are passed through to the caller.
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg, None)),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Server Error", Some(msg)),
                )
            }
            ApiError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Incomplete requirement Details", Some(msg)),
            ),
            ApiError::InternalError { message, detail } => {
                tracing::error!("{}: {}", message, detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(message, Some(detail)),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal("Server Error", format!("{err:#}"))
    }
}

impl From<RequirementError> for ApiError {
    fn from(err: RequirementError) -> Self {
        match err {
            RequirementError::Validation(msg) => Self::validation(msg),
            RequirementError::NotFound(_) => Self::requirement_not_found(),
            RequirementError::Persistence(msg) => Self::DatabaseError(msg),
            err @ RequirementError::MalformedRecord { .. } => {
                Self::internal("Error in generating Excel file", err.to_string())
            }
            RequirementError::Internal(msg) => Self::internal("Server Error", msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl ApiError {
    pub fn requirement_not_found() -> Self {
        ApiError::NotFound("requirement not found".to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::InternalError {
            message: message.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequirementId;

    #[test]
    fn maps_service_errors_to_status_codes() {
        let cases = [
            (
                RequirementError::Validation("missing phone".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RequirementError::NotFound(RequirementId::new(7)),
                StatusCode::NOT_FOUND,
            ),
            (
                RequirementError::Persistence("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RequirementError::MalformedRecord {
                    id: RequirementId::new(1),
                    field: "RequiredPropertyDetails",
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
