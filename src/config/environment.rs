//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del cliente: URL del backend,
//! servicio de geocoding, timeouts, reintentos y archivo de sesión.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::errors::ApiError;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    /// URL base del backend, incluyendo el prefijo `/api`
    pub api_base_url: String,
    pub geocoding_base_url: String,
    pub http_timeout_secs: u64,
    /// Reintentos adicionales para GET idempotentes (0 = sin reintentos)
    pub get_retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub session_file: PathBuf,
    pub log_level: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_base_url: "http://localhost:8080/api".to_string(),
            geocoding_base_url: "https://nominatim.openstreetmap.org".to_string(),
            http_timeout_secs: 30,
            get_retry_attempts: 2,
            retry_base_delay_ms: 200,
            session_file: PathBuf::from(".roadside_session.json"),
            log_level: "info".to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde variables de entorno, con valores por defecto
    pub fn from_env() -> Result<Self, ApiError> {
        let defaults = Self::default();

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            api_base_url: env::var("ROADSIDE_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            geocoding_base_url: env::var("GEOCODING_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.geocoding_base_url),
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            get_retry_attempts: parse_var("GET_RETRY_ATTEMPTS", defaults.get_retry_attempts)?,
            retry_base_delay_ms: parse_var("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms)?,
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ApiError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ApiError::Config(format!("{} must be a valid number, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
