//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos tal como los expone el backend
//! REST (JSON camelCase), junto con los formularios del lado cliente.

pub mod auth;
pub mod feedback;
pub mod mechanic;
pub mod payment;
pub mod service_center;
pub mod service_request;

pub use auth::*;
pub use feedback::*;
pub use mechanic::*;
pub use payment::*;
pub use service_center::*;
pub use service_request::*;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// El backend a veces serializa fechas sin zona (`2024-05-02T10:15:30`);
/// se interpretan como UTC. Un valor ilegible se descarta.
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| parse_timestamp(&value)))
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2024-05-02T10:15:30Z").is_some());
        assert!(parse_timestamp("2024-05-02T10:15:30.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
