use crate::envelope::{Envelope, Operation};
use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// The body did not decode into the entity, whatever its content type.
    #[error("Request body could not be bound: {0}")]
    Binding(String),
    #[error("Request body has no id")]
    MissingId,
    #[error("{operation:?} failed: {source}")]
    Database {
        operation: Operation,
        source: DbError,
    },
    #[error("Database unreachable: {0}")]
    Unavailable(DbError),
    #[error("No database session attached to the request")]
    SessionMissing,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Binding(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Binding(rejection.body_text())
    }
}

impl AppError {
    pub fn database(operation: Operation) -> impl FnOnce(DbError) -> Self {
        move |source| AppError::Database { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Binding(_) | AppError::MissingId | AppError::Database { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SessionMissing => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Binding(detail) => {
                tracing::debug!(error = %detail, "Rejected request body.");
                "Incorrect data"
            }
            AppError::MissingId => "Incorrect data: id is required",
            AppError::Database { operation, source } => {
                tracing::error!(error = ?source, ?operation, "Database error.");
                operation.failure_message()
            }
            AppError::Unavailable(db_err) => {
                tracing::error!(error = %db_err, "Database session could not be established.");
                "can't reach db"
            }
            AppError::SessionMissing => {
                tracing::error!("Handler ran without a database session.");
                "can't connect to db"
            }
        };

        (status, Json(Envelope::failure(message))).into_response()
    }
}
