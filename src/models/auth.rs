use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_phone;

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Customer,
    Mechanic,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "CUSTOMER",
            UserRole::Mechanic => "MECHANIC",
            UserRole::Admin => "ADMIN",
        }
    }

    /// Acepta `ADMIN`, `admin` y `ROLE_ADMIN`
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        match normalized.trim_start_matches("ROLE_") {
            "CUSTOMER" | "USER" => Some(UserRole::Customer),
            "MECHANIC" => Some(UserRole::Mechanic),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Request de login (`POST /auth/login`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response de login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Registro de cliente (`POST /auth/register`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(custom = "validate_phone")]
    pub phone: String,

    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_variants() {
        assert_eq!(UserRole::parse("ROLE_ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("mechanic"), Some(UserRole::Mechanic));
        assert_eq!(UserRole::parse("USER"), Some(UserRole::Customer));
        assert_eq!(UserRole::parse("driver"), None);
    }

    #[test]
    fn test_register_request_validation() {
        let bad = RegisterRequest {
            name: "A".into(),
            email: "not-an-email".into(),
            phone: "123".into(),
            password: "short".into(),
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 4);
    }
}
