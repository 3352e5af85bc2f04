//! Cliente de asistencia en carretera
//!
//! Cliente asíncrono del backend REST de asistencia en carretera: sesión,
//! cliente HTTP, resolución de mecánicos, asignación, ciclo de vida de las
//! solicitudes y dashboards de admin, cliente y mecánico.

pub mod cache;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;

pub use clients::{RoadsideApi, RoadsideApiClient};
pub use config::EnvironmentConfig;
pub use state::{Session, SessionContext};
pub use utils::errors::{ApiError, ApiResult};
