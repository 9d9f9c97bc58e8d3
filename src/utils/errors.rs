//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const PATCH_REQUEST_EMPTY: &str = "At least one field must be provided for update";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{resource} with {field} {value} already exists")]
    DuplicateValue {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{resource} not found with {field}: {value}")]
    NotFound {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{}", PATCH_REQUEST_EMPTY)]
    EmptyPatch,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código estable expuesto al cliente
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::DuplicateValue { .. } => "DUPLICATE_VALUE",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::EmptyPatch => "EMPTY_PATCH",
            AppError::InvalidBody(_) => "INVALID_BODY",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::EmptyPatch | AppError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::DuplicateValue { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = Some(self.code().to_string());
        let message = self.to_string();

        let error_response = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ErrorResponse {
                    error: "Database Error".to_string(),
                    message: "An error occurred while accessing the database".to_string(),
                    details: None,
                    code,
                }
            }

            AppError::Validation(e) => {
                tracing::debug!("Validation error: {}", e);
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: "The provided data is invalid".to_string(),
                    details: Some(json!(e)),
                    code,
                }
            }

            AppError::DuplicateValue { resource, field, value } => {
                tracing::debug!("Duplicate value: {}", message);
                ErrorResponse {
                    error: "Conflict".to_string(),
                    message,
                    details: Some(json!({ "resource": resource, "field": field, "value": value })),
                    code,
                }
            }

            AppError::NotFound { .. } => {
                tracing::debug!("Resource not found: {}", message);
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message,
                    details: None,
                    code,
                }
            }

            AppError::EmptyPatch | AppError::InvalidBody(_) => ErrorResponse {
                error: "Bad Request".to_string(),
                message,
                details: None,
                code,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &'static str, field: &'static str, value: impl ToString) -> AppError {
    AppError::NotFound {
        resource,
        field,
        value: value.to_string(),
    }
}

/// Función helper para crear errores de valor duplicado
pub fn duplicate_error(resource: &'static str, field: &'static str, value: impl ToString) -> AppError {
    AppError::DuplicateValue {
        resource,
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = duplicate_error("Customer", "CPF", "52998224725");
        assert_eq!(err.to_string(), "Customer with CPF 52998224725 already exists");

        let err = not_found_error("Vehicle", "id", "abc");
        assert_eq!(err.to_string(), "Vehicle not found with id: abc");

        assert_eq!(AppError::EmptyPatch.to_string(), PATCH_REQUEST_EMPTY);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::EmptyPatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(duplicate_error("Vehicle", "license plate", "ABC1234").status(), StatusCode::CONFLICT);
        assert_eq!(not_found_error("Customer", "id", "x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Validation(validator::ValidationErrors::new()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = duplicate_error("Customer", "email", "a@b.com").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError::EmptyPatch.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err = AppError::InvalidBody("missing field `phone`".to_string());
        assert_eq!(err.code(), "INVALID_BODY");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
