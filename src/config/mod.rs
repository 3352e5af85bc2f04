//! Configuración del cliente
//!
//! Este módulo contiene la configuración de entorno del cliente.

pub mod environment;

pub use environment::*;
