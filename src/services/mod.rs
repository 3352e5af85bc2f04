//! Services module
//!
//! Este módulo contiene la lógica de negocio del cliente: resolución de
//! candidatos, coordinación de asignaciones, ciclo de vida y flujos de
//! pago, feedback, mecánico, centros, autenticación y geocoding.

pub mod assignment_service;
pub mod auth_service;
pub mod center_service;
pub mod feedback_service;
pub mod geocoding_service;
pub mod in_flight;
pub mod lifecycle;
pub mod mechanic_resolution_service;
pub mod mechanic_service;
pub mod payment_service;

pub use assignment_service::{AssignOutcome, AssignmentCoordinator};
pub use auth_service::AuthService;
pub use center_service::CenterService;
pub use feedback_service::FeedbackService;
pub use geocoding_service::{GeocodingResponse, GeocodingService};
pub use in_flight::{InFlight, InFlightGuard};
pub use mechanic_resolution_service::{MechanicResolutionService, Resolution, ResolutionQuery, ResolutionStep};
pub use mechanic_service::MechanicService;
pub use payment_service::PaymentService;
