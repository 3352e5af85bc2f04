use std::sync::Arc;

use validator::Validate;

use super::request_book::sort_newest_first;
use crate::clients::RoadsideApi;
use crate::models::{CreateServiceRequest, NewServiceRequestBody, ServiceRequest};
use crate::utils::errors::{validation_error, ApiResult};

/// Acceso de sólo lectura (sin cache) a las solicitudes del usuario autenticado
pub struct RequestRepository {
    api: Arc<dyn RoadsideApi>,
}

impl RequestRepository {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self { api }
    }

    /// Solicitudes del cliente autenticado, más recientes primero
    pub async fn my_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        let mut requests = self.api.my_requests().await?;
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    /// Todas las solicitudes (admin), más recientes primero
    pub async fn all_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        let mut requests = self.api.admin_requests().await?;
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    /// Solicitudes asignadas al mecánico autenticado, más recientes primero
    pub async fn assigned_to_me(&self) -> ApiResult<Vec<ServiceRequest>> {
        let mut requests = self.api.mechanic_requests().await?;
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    /// Crear una solicitud. El importe sale de la tabla fija por tipo de problema.
    pub async fn create(&self, form: CreateServiceRequest) -> ApiResult<ServiceRequest> {
        form.validate()?;
        let amount = form
            .problem_type
            .fixed_price()
            .ok_or_else(|| validation_error("problem_type", "Unsupported problem type"))?;

        let body = NewServiceRequestBody {
            problem_type: form.problem_type,
            location: form.location.trim().to_string(),
            latitude: form.latitude,
            longitude: form.longitude,
            amount,
        };

        log::info!("📝 Creando solicitud {} en '{}' ({})", body.problem_type, body.location, body.amount);
        let created = self.api.create_request(&body).await?;
        log::info!("✅ Solicitud {} creada", created.id);
        Ok(created)
    }
}
