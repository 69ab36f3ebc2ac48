use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Unauthorized: {0}")]
    UnauthorizedError(String),

    #[error("Bad Request: {0}")]
    BadRequestError(String),

    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Already Deleted: {0}")]
    AlreadyDeletedError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    UnavailableError(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),
}

impl CustomError {
    /// Stable tag naming the error kind, carried in every error response so
    /// clients can tell kinds apart even when status codes overlap
    /// (AlreadyDeleted and Conflict both map to 409).
    pub fn error_tag(&self) -> &'static str {
        match *self {
            CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
            CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            CustomError::ForbiddenError(..) => "FORBIDDEN_ERROR",
            CustomError::ConflictError(..) => "CONFLICT_ERROR",
            CustomError::AlreadyDeletedError(..) => "ALREADY_DELETED_ERROR",
            CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
            CustomError::UnavailableError(..) => "UNAVAILABLE_ERROR",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::ForbiddenError(..) => StatusCode::FORBIDDEN,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::AlreadyDeletedError(..) => StatusCode::CONFLICT,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::UnavailableError(..) => StatusCode::SERVICE_UNAVAILABLE,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.error_tag(),
            "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CustomError::NotFoundError("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CustomError::AlreadyDeletedError("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CustomError::ConflictError("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CustomError::ForbiddenError("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            CustomError::UnavailableError("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_already_deleted_tag_is_distinct_from_conflict() {
        let deleted = CustomError::AlreadyDeletedError("gone".into());
        let conflict = CustomError::ConflictError("dup".into());
        assert_eq!(deleted.status_code(), conflict.status_code());
        assert_ne!(deleted.error_tag(), conflict.error_tag());
    }
}
