//! # Manejo de errores
//!
//! Jerarquía de errores HTTP construida con thiserror. Cada variante decide su
//! código de estado y el cuerpo JSON:
//!
//! - entrada inválida → `400` con `{ "errors": [...] }` o `{ "error": ... }`
//! - fallos del store o del proveedor de IA → `500` con el mensaje original
//! - configuración ausente → `501`

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::error::Error;
use thiserror::Error;

use crate::ai::AiError;
use crate::db::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Lista de campos ausentes o inválidos
    #[error("Error de validación: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Petición mal formada (JSON inválido, falta un identificador...)
    #[error("Petición inválida: {0}")]
    BadRequest(String),

    #[error("No encontrado: {resource_type} con ID '{id}'")]
    NotFoundWithId { resource_type: String, id: String },

    #[error("Conflicto: {0}")]
    Conflict(String),

    /// Error del store con la operación que lo produjo
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Store {
        operation: String,
        #[source]
        source: StoreError,
    },

    #[error("Error del servicio de IA: {0}")]
    Ai(#[from] AiError),

    #[error("Servicio de IA no configurado: {0}")]
    AiNotConfigured(String),
}

impl AppError {
    pub fn store(operation: &str, source: StoreError) -> Self {
        Self::Store {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn not_found_id(resource_type: &str, id: &str) -> Self {
        Self::NotFoundWithId {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Mensaje que ve el cliente en el campo `error`
    fn client_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.join(", "),
            Self::BadRequest(message)
            | Self::Conflict(message)
            | Self::AiNotConfigured(message) => message.clone(),
            Self::NotFoundWithId { resource_type, id } => {
                format!("{} con ID '{}' no encontrado", resource_type, id)
            }
            Self::Store { source, .. } => source.to_string(),
            Self::Ai(source) => source.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFoundWithId { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::AiNotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Store { .. } | Self::Ai(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            Self::Validation(errors) => {
                tracing::warn!(errors = ?errors, "Validation error");
                return HttpResponse::build(status).json(ValidationErrorResponse {
                    errors: errors.clone(),
                });
            }
            Self::Store { operation, source } => {
                tracing::error!(
                    operation = %operation,
                    error = %source,
                    error_chain = ?source.source(),
                    "Database error occurred"
                );
            }
            Self::NotFoundWithId { resource_type, id } => {
                tracing::info!(
                    resource_type = %resource_type,
                    id = %id,
                    "Resource not found"
                );
            }
            error if status.is_client_error() => {
                tracing::warn!(error = %error, "Client error");
            }
            error => {
                tracing::error!(
                    error = %error,
                    error_chain = ?error.source(),
                    "General error"
                );
            }
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.client_message(),
        })
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(serde::Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<String>,
}

pub type AppResult<T> = Result<T, AppError>;

pub trait ResultExt<T> {
    /// Convierte un error del store en `AppError::Store` con la operación
    fn map_err_store(self, operation: &str) -> AppResult<T>;
}

impl<T> ResultExt<T> for Result<T, StoreError> {
    fn map_err_store(self, operation: &str) -> AppResult<T> {
        self.map_err(|e| AppError::store(operation, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn validation_error_lists_every_field() {
        let (status, json) = response_parts(AppError::Validation(vec![
            "customer_name es requerido".to_string(),
            "party_size debe ser al menos 1".to_string(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
        assert!(json.get("error").is_none());
    }

    #[actix_web::test]
    async fn store_error_carries_underlying_message() {
        let err = AppError::store(
            "list_reservations",
            StoreError::Unavailable("connection refused".to_string()),
        );
        let (status, json) = response_parts(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "connection refused");
    }

    #[actix_web::test]
    async fn not_found_returns_404() {
        let (status, json) = response_parts(AppError::not_found_id("Reserva", "abc")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Reserva con ID 'abc' no encontrado");
    }

    #[actix_web::test]
    async fn missing_ai_key_returns_501() {
        let (status, json) =
            response_parts(AppError::AiNotConfigured("OPENAI_API_KEY no definida".to_string()))
                .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(json["error"], "OPENAI_API_KEY no definida");
    }

    #[actix_web::test]
    async fn conflict_returns_409() {
        let (status, _) = response_parts(AppError::Conflict("stale".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
