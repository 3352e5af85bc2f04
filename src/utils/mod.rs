//! Utilidades del cliente
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! y lectura de tokens JWT.

pub mod errors;
pub mod validation;
pub mod jwt;

pub use errors::{ApiError, ApiResult};
