use crate::config::ConfigError;
use crate::storage::RepositoryError;
use crate::telemetry::TelemetryError;
use crate::workflows::documents::{AlertError, DocumentError, ImportError};
use crate::workflows::signatures::AuditError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Documents(DocumentError),
    Alerts(AlertError),
    Import(ImportError),
    Audit(AuditError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Documents(err) if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Documents(DocumentError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Documents(DocumentError::Repository(err))
            | AppError::Alerts(AlertError::Repository(err))
            | AppError::Audit(AuditError::Repository(err))
            | AppError::Import(ImportError::Repository(err)) => repository_status(err),
            AppError::Documents(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Alerts(AlertError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Alerts(AlertError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            AppError::Alerts(AlertError::RequiredField { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Audit(AuditError::Reference(_)) => StatusCode::NOT_FOUND,
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Documents(err) => write!(f, "document error: {}", err),
            AppError::Alerts(err) => write!(f, "alert error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Audit(err) => write!(f, "audit error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Documents(err) => Some(err),
            AppError::Alerts(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Audit(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DocumentError> for AppError {
    fn from(value: DocumentError) -> Self {
        Self::Documents(value)
    }
}

impl From<AlertError> for AppError {
    fn from(value: AlertError) -> Self {
        Self::Alerts(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<AuditError> for AppError {
    fn from(value: AuditError) -> Self {
        Self::Audit(value)
    }
}
