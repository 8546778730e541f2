use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Payroll failure taxonomy. Validation failures are rejected before any
/// database call and are never retried; remote failures carry the backend's
/// message verbatim as a displayable string.
#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Remote(String),
}

impl PayrollError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PayrollError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        PayrollError::NotFound(msg.into())
    }
}

impl From<sqlx::Error> for PayrollError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => PayrollError::NotFound("Record not found".into()),
            other => PayrollError::Remote(other.to_string()),
        }
    }
}

impl actix_web::ResponseError for PayrollError {
    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::Validation(_) => StatusCode::BAD_REQUEST,
            PayrollError::NotFound(_) => StatusCode::NOT_FOUND,
            PayrollError::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}
