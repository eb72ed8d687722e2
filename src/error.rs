use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::response::{ApiResponse, Meta};

/// One rejected request field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Why a request failed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken,
    Expired,
    UnknownUser,
    InvalidCredentials,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "Not authorized, no token provided",
            AuthFailure::InvalidToken => "Not authorized, invalid token signature or format",
            AuthFailure::Expired => "Not authorized, token expired",
            AuthFailure::UnknownUser => "Not authorized, user not found",
            AuthFailure::InvalidCredentials => "Invalid email or password",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{}", .0.message())]
    Unauthorized(AuthFailure),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::DbError(err) => err
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation()),
            AppError::OrmError(err) => matches!(
                err.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ),
            _ => false,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            AppError::DbError(err) => err
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation()),
            AppError::OrmError(err) => matches!(
                err.sql_err(),
                Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_))
            ),
            _ => false,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(fields)
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                AppError::DbError(err) => tracing::error!(error = %err, "database error"),
                AppError::OrmError(err) => tracing::error!(error = %err, "orm error"),
                AppError::Internal(err) => tracing::error!(error = ?err, "internal error"),
                _ => {}
            }
        }

        let message = self.to_string();
        let fields = match self {
            AppError::Validation(fields) => fields,
            _ => Vec::new(),
        };

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData {
                error: message,
                fields,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "name too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            AppError::Validation(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("dup".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized(AuthFailure::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("no".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = AppError::Internal(anyhow::anyhow!("connection string postgres://secret"));
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn unauthorized_message_names_the_reason() {
        assert_eq!(
            AppError::Unauthorized(AuthFailure::UnknownUser).to_string(),
            "Not authorized, user not found"
        );
        assert_eq!(
            AppError::Unauthorized(AuthFailure::Expired).to_string(),
            "Not authorized, token expired"
        );
    }

    #[test]
    fn validation_errors_become_sorted_field_messages() {
        let probe = Probe {
            name: "ab".into(),
            email: "not-an-email".into(),
        };
        let err: AppError = probe.validate().unwrap_err().into();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "email");
                assert_eq!(fields[0].message, "email is invalid");
                assert_eq!(fields[1], FieldError::new("name", "name too short"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn non_database_errors_are_not_constraint_violations() {
        let err = AppError::NotFound("x".into());
        assert!(!err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
    }
}
