use std::sync::Arc;

use validator::Validate;

use crate::clients::RoadsideApi;
use crate::models::{CreateCenterRequest, ServiceCenter};
use crate::utils::errors::{precondition_error, ApiError, ApiResult};
use crate::utils::validation::validate_not_empty;

/// Centros de servicio y adscripción de mecánicos (admin)
#[derive(Clone)]
pub struct CenterService {
    api: Arc<dyn RoadsideApi>,
}

impl CenterService {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self { api }
    }

    /// Centros ordenados por nombre
    pub async fn list(&self) -> ApiResult<Vec<ServiceCenter>> {
        let mut centers = self.api.centers().await?;
        centers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then(a.id.cmp(&b.id)));
        Ok(centers)
    }

    pub async fn create(&self, form: CreateCenterRequest) -> ApiResult<ServiceCenter> {
        form.validate()?;
        log::info!("🏢 Creando centro '{}' en {}", form.name, form.city);
        let center = self.api.create_center(&form).await?;
        log::info!("✅ Centro {} creado", center.id);
        Ok(center)
    }

    /// Adscribir un mecánico a un centro. El backend responde 409 si el centro
    /// ya cubrió su cupo para la especialidad del mecánico.
    pub async fn assign_mechanic(&self, mechanic_email: &str, center_id: i64) -> ApiResult<()> {
        validate_not_empty(mechanic_email).map_err(|_| precondition_error("assign center", "missing mechanic email"))?;

        match self.api.assign_center(mechanic_email.trim(), center_id).await {
            Ok(()) => {
                log::info!("✅ Mecánico {} adscrito al centro {}", mechanic_email, center_id);
                Ok(())
            }
            Err(e) if e.is_conflict() => {
                log::warn!("⚠️ Centro {} sin cupo para {}: {}", center_id, mechanic_email, e);
                Err(ApiError::Precondition(format!(
                    "Center {} has no capacity left: {}",
                    center_id,
                    e.user_message()
                )))
            }
            Err(e) => Err(e),
        }
    }
}
