//! Modelo de ServiceCenter
//!
//! Centro físico al que se adscriben mecánicos, con capacidad por especialidad.
//! La capacidad la hace cumplir el backend; el cliente sólo muestra el error.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCenter {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub max_mechanics_per_skill: u32,
    #[serde(default = "default_active", alias = "active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Formulario de creación de centro (`POST /centers`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_center_coordinates"))]
pub struct CreateCenterRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 2, max = 100))]
    pub city: String,

    #[validate(length(min = 3, max = 255))]
    pub address: String,

    pub latitude: f64,
    pub longitude: f64,

    #[validate(range(min = 1, max = 100))]
    pub max_mechanics_per_skill: u32,

    pub is_active: bool,
}

fn validate_center_coordinates(form: &CreateCenterRequest) -> Result<(), ValidationError> {
    crate::utils::validation::validate_coordinates(form.latitude, form.longitude)
}
