//! Modelo de Mechanic
//!
//! Mecánico con especialidad, verificación administrativa y disponibilidad.
//! `distance` sólo viene poblado en el contexto de una consulta "nearest".

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_phone;

/// Especialidad declarada del mecánico
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SkillType {
    Towing,
    TireSpecialist,
    BatteryExpert,
    Locksmith,
    GeneralMechanic,
    Other(String),
}

impl SkillType {
    pub fn as_str(&self) -> &str {
        match self {
            SkillType::Towing => "TOWING",
            SkillType::TireSpecialist => "TIRE_SPECIALIST",
            SkillType::BatteryExpert => "BATTERY_EXPERT",
            SkillType::Locksmith => "LOCKSMITH",
            SkillType::GeneralMechanic => "GENERAL_MECHANIC",
            SkillType::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SkillType::Other(_))
    }
}

impl Default for SkillType {
    fn default() -> Self {
        SkillType::Other(String::new())
    }
}

impl From<String> for SkillType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "TOWING" => SkillType::Towing,
            "TIRE_SPECIALIST" => SkillType::TireSpecialist,
            "BATTERY_EXPERT" => SkillType::BatteryExpert,
            "LOCKSMITH" => SkillType::Locksmith,
            "GENERAL_MECHANIC" => SkillType::GeneralMechanic,
            _ => SkillType::Other(raw),
        }
    }
}

impl From<&str> for SkillType {
    fn from(raw: &str) -> Self {
        SkillType::from(raw.to_string())
    }
}

impl From<SkillType> for String {
    fn from(skill: SkillType) -> Self {
        match skill {
            SkillType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disponibilidad para despacho
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    Busy,
    #[default]
    Offline,
    #[serde(other)]
    Unknown,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "AVAILABLE",
            Availability::Busy => "BUSY",
            Availability::Offline => "OFFLINE",
            Availability::Unknown => "UNKNOWN",
        }
    }
}

/// Mechanic tal como lo devuelve el backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mechanic {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "skill")]
    pub skill_type: SkillType,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default, alias = "serviceCenterId")]
    pub center_id: Option<i64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Mechanic {
    /// Elegible para asignación: verificado, disponible y con la especialidad requerida
    pub fn is_eligible_for(&self, skill: &SkillType) -> bool {
        self.verified && self.availability == Availability::Available && &self.skill_type == skill
    }

    /// Distancia formateada para la lista de candidatos
    pub fn distance_label(&self) -> Option<String> {
        self.distance.map(|km| format!("{:.1} km", km))
    }
}

/// Formulario de registro de mecánico (`POST /mechanics/register`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MechanicRegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(custom = "validate_phone")]
    pub phone: String,

    #[validate(length(min = 6, max = 100))]
    pub password: String,

    pub skill_type: SkillType,
}

/// Cuerpo de `PATCH /mechanics/location`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
}
