//! Servicio de autoservicio del mecánico
//!
//! Perfil, trabajos asignados, disponibilidad, ubicación, enlace de
//! navegación y "terminar trabajo".

use std::sync::Arc;

use crate::clients::RoadsideApi;
use crate::models::{Availability, LocationUpdate, Mechanic, RequestStatus, ServiceRequest};
use crate::services::lifecycle::{self, LifecycleEvent};
use crate::utils::errors::{precondition_error, validation_error, ApiResult};
use crate::utils::validation::validate_coordinates;

const DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1&destination=";

/// Enlace de navegación hacia la solicitud: coordenadas si existen, si no la dirección escrita
pub fn navigation_url(request: &ServiceRequest) -> Option<String> {
    if let Some((lat, lng)) = request.coordinates() {
        return Some(format!("{}{},{}", DIRECTIONS_URL, lat, lng));
    }
    let location = request.location.trim();
    if location.is_empty() {
        return None;
    }
    Some(format!("{}{}", DIRECTIONS_URL, urlencoding::encode(location)))
}

#[derive(Clone)]
pub struct MechanicService {
    api: Arc<dyn RoadsideApi>,
}

impl MechanicService {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self { api }
    }

    pub async fn profile(&self) -> ApiResult<Mechanic> {
        self.api.mechanic_profile().await
    }

    pub async fn set_availability(&self, availability: Availability) -> ApiResult<()> {
        if availability == Availability::Unknown {
            return Err(validation_error("availability", "Unsupported availability"));
        }
        log::info!("🟢 Disponibilidad -> {}", availability.as_str());
        self.api.update_availability(availability).await
    }

    pub async fn share_location(&self, latitude: f64, longitude: f64) -> ApiResult<()> {
        validate_coordinates(latitude, longitude)
            .map_err(|_| validation_error("location", "Invalid coordinates"))?;
        log::debug!("📍 Ubicación ({}, {})", latitude, longitude);
        self.api.update_location(LocationUpdate { latitude, longitude }).await
    }

    /// Terminar un trabajo: pasa a PAYMENT_PENDING y el mecánico vuelve a estar disponible.
    /// Un fallo al restablecer la disponibilidad no deshace el cambio de estado.
    pub async fn mark_done(&self, request: &ServiceRequest) -> ApiResult<RequestStatus> {
        if !lifecycle::can_work_on(&request.status) {
            return Err(precondition_error(
                "mark done",
                &format!("request {} is {}", request.id, request.status.as_str()),
            ));
        }
        let next = lifecycle::transition(&request.status, LifecycleEvent::MarkDone)?;

        log::info!("🏁 Terminando solicitud {}", request.id);
        self.api.update_request_status(request.id, &next).await?;

        if let Err(e) = self.api.update_availability(Availability::Available).await {
            log::warn!("⚠️ Solicitud {} terminada pero la disponibilidad no se actualizó: {}", request.id, e);
        }
        Ok(next)
    }
}
