//! Modelo de pagos
//!
//! El procesamiento es simulado: el cliente registra el pago en el backend y
//! luego mueve la solicitud a PAID.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_non_negative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Upi,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Cash => "CASH",
        }
    }
}

/// Cuerpo de `POST /payments`
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub request_id: i64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
}

/// Respuesta de `POST /payments`; el backend puede devolver sólo parte de los campos
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub request_id: Option<i64>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Respuesta de `GET /requests/{id}/payment-status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub can_pay: bool,
}
