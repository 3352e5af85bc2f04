//! Modelo de ServiceRequest
//!
//! Solicitud de asistencia creada por un cliente: tipo de problema,
//! ubicación, importe fijo y estado del ciclo de vida.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::deserialize_timestamp;
use super::mechanic::Mechanic;
use crate::utils::validation::validate_not_empty;

/// Categoría del problema declarada por el cliente.
/// Los valores desconocidos se conservan tal cual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProblemType {
    Towing,
    TireChange,
    Battery,
    Fuel,
    Lockout,
    Mechanic,
    Other(String),
}

impl ProblemType {
    pub const ALL: [ProblemType; 6] = [
        ProblemType::Towing,
        ProblemType::TireChange,
        ProblemType::Battery,
        ProblemType::Fuel,
        ProblemType::Lockout,
        ProblemType::Mechanic,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ProblemType::Towing => "TOWING",
            ProblemType::TireChange => "TIRE_CHANGE",
            ProblemType::Battery => "BATTERY",
            ProblemType::Fuel => "FUEL",
            ProblemType::Lockout => "LOCKOUT",
            ProblemType::Mechanic => "MECHANIC",
            ProblemType::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ProblemType::Other(_))
    }

    /// Importe fijo cobrado por categoría en el momento de la creación
    pub fn fixed_price(&self) -> Option<Decimal> {
        let amount = match self {
            ProblemType::Towing => 1500,
            ProblemType::TireChange => 500,
            ProblemType::Battery => 800,
            ProblemType::Fuel => 300,
            ProblemType::Lockout => 600,
            ProblemType::Mechanic => 1000,
            ProblemType::Other(_) => return None,
        };
        Some(Decimal::new(amount, 0))
    }
}

impl From<String> for ProblemType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "TOWING" => ProblemType::Towing,
            "TIRE_CHANGE" => ProblemType::TireChange,
            "BATTERY" => ProblemType::Battery,
            "FUEL" => ProblemType::Fuel,
            "LOCKOUT" => ProblemType::Lockout,
            "MECHANIC" => ProblemType::Mechanic,
            _ => ProblemType::Other(raw),
        }
    }
}

impl From<&str> for ProblemType {
    fn from(raw: &str) -> Self {
        ProblemType::from(raw.to_string())
    }
}

impl From<ProblemType> for String {
    fn from(problem: ProblemType) -> Self {
        match problem {
            ProblemType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estado de la solicitud en el backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Created,
    Assigned,
    InProgress,
    PaymentPending,
    Paid,
    Completed,
    Cancelled,
    Other(String),
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Created => "CREATED",
            RequestStatus::Assigned => "ASSIGNED",
            RequestStatus::InProgress => "IN_PROGRESS",
            RequestStatus::PaymentPending => "PAYMENT_PENDING",
            RequestStatus::Paid => "PAID",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Cancelled => "CANCELLED",
            RequestStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for RequestStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "CREATED" => RequestStatus::Created,
            "ASSIGNED" => RequestStatus::Assigned,
            "IN_PROGRESS" => RequestStatus::InProgress,
            "PAYMENT_PENDING" => RequestStatus::PaymentPending,
            "PAID" => RequestStatus::Paid,
            "COMPLETED" => RequestStatus::Completed,
            "CANCELLED" => RequestStatus::Cancelled,
            _ => RequestStatus::Other(raw),
        }
    }
}

impl From<&str> for RequestStatus {
    fn from(raw: &str) -> Self {
        RequestStatus::from(raw.to_string())
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ServiceRequest tal como lo devuelve el backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(alias = "requestId")]
    pub id: i64,
    pub problem_type: ProblemType,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub amount: Decimal,
    pub status: RequestStatus,
    #[serde(default)]
    pub mechanic: Option<Mechanic>,
    #[serde(default)]
    pub mechanic_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

impl ServiceRequest {
    /// Id del mecánico asignado, venga embebido o como referencia
    pub fn assigned_mechanic_id(&self) -> Option<i64> {
        self.mechanic_id.or_else(|| self.mechanic.as_ref().map(|m| m.id))
    }

    pub fn has_mechanic(&self) -> bool {
        self.assigned_mechanic_id().is_some()
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Formulario de creación de solicitud (lado cliente)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_request_coordinates", skip_on_field_errors = false))]
pub struct CreateServiceRequest {
    #[validate(custom = "validate_known_problem")]
    pub problem_type: ProblemType,

    #[validate(length(min = 3, max = 255), custom = "validate_not_empty")]
    pub location: String,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn validate_known_problem(problem: &ProblemType) -> Result<(), ValidationError> {
    if problem.is_known() {
        Ok(())
    } else {
        let mut error = ValidationError::new("problem_type");
        error.add_param("value".into(), &problem.as_str().to_string());
        Err(error)
    }
}

fn validate_request_coordinates(form: &CreateServiceRequest) -> Result<(), ValidationError> {
    match (form.latitude, form.longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => crate::utils::validation::validate_coordinates(lat, lng),
        _ => Err(ValidationError::new("incomplete_coordinates")),
    }
}

/// Cuerpo enviado a `POST /requests`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRequestBody {
    pub problem_type: ProblemType,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_problem_and_status_survive_roundtrip() {
        let raw = json!({
            "id": 7,
            "problemType": "WINCH_OUT",
            "location": "Ring Road",
            "amount": 0,
            "status": "REJECTED"
        });
        let request: ServiceRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(request.problem_type, ProblemType::Other("WINCH_OUT".into()));
        assert_eq!(request.status.as_str(), "REJECTED");

        let back = serde_json::to_value(&request).unwrap();
        assert_eq!(back["problemType"], "WINCH_OUT");
        assert_eq!(back["status"], "REJECTED");
    }

    #[test]
    fn test_assigned_mechanic_id_prefers_reference() {
        let request: ServiceRequest = serde_json::from_value(json!({
            "requestId": 3,
            "problemType": "BATTERY",
            "status": "IN_PROGRESS",
            "mechanic": { "id": 11, "name": "Ravi", "skillType": "BATTERY_EXPERT" },
            "createdAt": "2024-05-02T10:15:30"
        }))
        .unwrap();
        assert_eq!(request.id, 3);
        assert_eq!(request.assigned_mechanic_id(), Some(11));
        assert!(request.created_at.is_some());
    }

    #[test]
    fn test_create_form_validation() {
        let form = CreateServiceRequest {
            problem_type: ProblemType::Other("SPACESHIP".into()),
            location: "  ".into(),
            latitude: Some(12.9),
            longitude: None,
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("problem_type"));
        assert!(fields.contains_key("location"));
        assert!(fields.contains_key("__all__"));

        let ok = CreateServiceRequest {
            problem_type: ProblemType::Fuel,
            location: "MG Road, Bengaluru".into(),
            latitude: Some(12.97),
            longitude: Some(77.6),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_fixed_price_table() {
        assert_eq!(ProblemType::Towing.fixed_price(), Some(Decimal::new(1500, 0)));
        assert_eq!(ProblemType::Fuel.fixed_price(), Some(Decimal::new(300, 0)));
        assert_eq!(ProblemType::Other("X".into()).fixed_price(), None);
    }
}
