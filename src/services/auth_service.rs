//! Servicio de autenticación
//!
//! Login contra el backend y registro de clientes y mecánicos. El token no se
//! verifica localmente (no tenemos el secreto); sólo se leen sus claims para
//! el rol y la expiración.

use std::sync::Arc;

use validator::Validate;

use crate::clients::RoadsideApi;
use crate::models::{LoginRequest, MechanicRegisterRequest, RegisterRequest, SkillType};
use crate::state::{Session, SessionContext};
use crate::utils::errors::{validation_error, ApiResult};

pub struct AuthService {
    api: Arc<dyn RoadsideApi>,
    session: SessionContext,
}

impl AuthService {
    pub fn new(api: Arc<dyn RoadsideApi>, session: SessionContext) -> Self {
        Self { api, session }
    }

    /// Login: valida credenciales, llama al backend y puebla la sesión
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;

        log::info!("🔐 Login de '{}'", credentials.email);
        let response = self.api.login(&credentials).await.map_err(|e| {
            log::warn!("❌ Login de '{}' rechazado: {}", credentials.email, e);
            e
        })?;

        let session = Session::from_login(&response)?;
        self.session.establish(session.clone()).await?;
        log::info!("✅ Login correcto: '{}' como {}", session.subject, session.role.as_str());
        Ok(session)
    }

    pub async fn logout(&self) {
        self.session.logout().await;
    }

    pub async fn register_customer(&self, registration: RegisterRequest) -> ApiResult<()> {
        registration.validate()?;
        log::info!("📝 Registrando cliente '{}'", registration.email);
        self.api.register_customer(&registration).await
    }

    pub async fn register_mechanic(&self, registration: MechanicRegisterRequest) -> ApiResult<()> {
        registration.validate()?;
        if !Self::known_skills().contains(&registration.skill_type) {
            return Err(validation_error("skill_type", "Unsupported skill"));
        }
        log::info!("📝 Registrando mecánico '{}' ({})", registration.email, registration.skill_type);
        self.api.register_mechanic(&registration).await
    }

    pub fn known_skills() -> [SkillType; 5] {
        [
            SkillType::Towing,
            SkillType::TireSpecialist,
            SkillType::BatteryExpert,
            SkillType::Locksmith,
            SkillType::GeneralMechanic,
        ]
    }
}
