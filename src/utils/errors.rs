//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del cliente y su
//! clasificación (sesión, capacidad no disponible, acción fallida).

use thiserror::Error;

/// Errores principales del cliente
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),
}

impl ApiError {
    /// Código HTTP asociado, si el error viene del backend
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Un endpoint más nuevo que el backend todavía no expone (o que falla
    /// del lado del servidor). Dispara el siguiente paso de un fallback.
    pub fn is_capability_unavailable(&self) -> bool {
        match self {
            ApiError::Http { status, .. } => {
                matches!(status, 404 | 405 | 500 | 501 | 502 | 503 | 504)
            }
            ApiError::Network(_) | ApiError::Decode(_) => true,
            _ => false,
        }
    }

    /// Fallo transitorio: se puede reintentar un GET idempotente
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http { status, .. } => matches!(status, 502 | 503 | 504),
            ApiError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Conflicto de capacidad (p. ej. centro lleno para esa especialidad)
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Http { status: 409, .. })
    }

    /// Mensaje corto para mostrar en un aviso de fila
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized(_) => "Session expired, please log in again".to_string(),
            ApiError::Http { message, .. } if !message.trim().is_empty() => message.clone(),
            ApiError::Http { status, .. } => format!("Request failed ({})", status),
            ApiError::Network(_) => "Network error, please retry".to_string(),
            ApiError::Decode(_) => "Unexpected response from server".to_string(),
            ApiError::Validation(e) => format!("Invalid data: {}", e),
            ApiError::Precondition(msg) => msg.clone(),
            ApiError::InvalidTransition { from, event } => {
                format!("Cannot {} a request in status {}", event, from)
            }
            ApiError::Config(msg) | ApiError::Session(msg) => msg.clone(),
        }
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type ApiResult<T> = Result<T, ApiError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> ApiError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.message = Some(message.into());
    error.add_param("field".into(), &field);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    ApiError::Validation(errors)
}

/// Función helper para crear errores de precondición
pub fn precondition_error(operation: &str, reason: &str) -> ApiError {
    ApiError::Precondition(format!("Cannot {}: {}", operation, reason))
}

/// Función helper para crear errores HTTP
pub fn http_error(status: u16, message: impl Into<String>) -> ApiError {
    ApiError::Http {
        status,
        message: message.into(),
    }
}
