//! Coordinador de asignación
//!
//! Confirma en el backend el par (solicitud, mecánico) elegido por el admin y
//! reconcilia el estado local. Como mucho hay un intento de asignación en
//! vuelo por solicitud: el marcador se adquiere antes de la llamada de red y
//! se libera siempre al salir (éxito, fallo o future abandonado).

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::clients::RoadsideApi;
use crate::models::{Mechanic, RequestStatus, ServiceRequest};
use crate::repositories::RequestBook;
use crate::services::in_flight::{InFlight, InFlightGuard};
use crate::services::lifecycle::{self, LifecycleEvent};
use crate::utils::errors::{precondition_error, ApiResult};

/// Resultado de pedir una asignación
#[derive(Debug, Clone, PartialEq)]
pub enum AssignOutcome {
    /// El backend aceptó; versión local ya actualizada
    Assigned(ServiceRequest),
    /// Ya hay una asignación en vuelo para esta solicitud; no se envió nada
    AlreadyInFlight,
}

#[derive(Clone)]
pub struct AssignmentCoordinator {
    api: Arc<dyn RoadsideApi>,
    in_flight: InFlight,
}

impl AssignmentCoordinator {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self {
            api,
            in_flight: InFlight::new(),
        }
    }

    /// Intentar adquirir el marcador de la solicitud
    pub fn try_acquire(&self, request_id: i64) -> Option<InFlightGuard> {
        self.in_flight.try_acquire(request_id)
    }

    pub fn is_in_flight(&self, request_id: i64) -> bool {
        self.in_flight.contains(request_id)
    }

    /// Verificar las precondiciones de asignación sobre la versión local
    pub fn check_preconditions(request: &ServiceRequest, selected: Option<i64>) -> ApiResult<i64> {
        if request.has_mechanic() {
            return Err(precondition_error("assign", "a mechanic is already assigned"));
        }
        if lifecycle::is_active_job(&request.status) {
            return Err(precondition_error("assign", "the request is already in progress"));
        }
        if request.status != RequestStatus::Created {
            return Err(precondition_error(
                "assign",
                &format!("the request is {}", request.status.as_str()),
            ));
        }
        selected.ok_or_else(|| precondition_error("assign", "no mechanic selected"))
    }

    /// Asignar `selected` a la solicitud. `known_mechanics` son los mecánicos ya
    /// cargados (pool + candidatos) de donde se toma la referencia local.
    pub async fn assign(
        &self,
        book: &RwLock<RequestBook>,
        request_id: i64,
        selected: Option<i64>,
        known_mechanics: &[Mechanic],
    ) -> ApiResult<AssignOutcome> {
        // El marcador va primero: las precondiciones se leen con él tomado
        let Some(_guard) = self.try_acquire(request_id) else {
            log::debug!("⏳ Asignación de la solicitud {} ya en vuelo, se ignora", request_id);
            return Ok(AssignOutcome::AlreadyInFlight);
        };

        let request = book
            .read()
            .await
            .get(request_id)
            .cloned()
            .ok_or_else(|| precondition_error("assign", "unknown request"))?;
        let mechanic_id = Self::check_preconditions(&request, selected)?;
        let next_status = lifecycle::transition(&request.status, LifecycleEvent::AssignMechanic)?;

        log::info!("🔧 Asignando mecánico {} a la solicitud {}", mechanic_id, request_id);
        if let Err(e) = self.api.assign_mechanic(request_id, mechanic_id).await {
            log::error!("❌ Asignación {} -> {} falló: {}", request_id, mechanic_id, e);
            return Err(e);
        }

        let mechanic = known_mechanics.iter().find(|m| m.id == mechanic_id).cloned();
        if mechanic.is_none() {
            log::warn!("⚠️ Mecánico {} no está en el pool local, sólo se guarda el id", mechanic_id);
        }

        let updated = book.write().await.update(request_id, |r| {
            r.mechanic_id = Some(mechanic_id);
            r.mechanic = mechanic;
            r.status = next_status;
        });

        log::info!("✅ Solicitud {} asignada a {}", request_id, mechanic_id);
        updated
            .map(AssignOutcome::Assigned)
            .ok_or_else(|| precondition_error("assign", "request disappeared during assignment"))
    }

    /// Cancelar una solicitud (acción admin). Terminal; no hay más transiciones.
    pub async fn cancel(&self, book: &RwLock<RequestBook>, request_id: i64) -> ApiResult<ServiceRequest> {
        let request = book
            .read()
            .await
            .get(request_id)
            .cloned()
            .ok_or_else(|| precondition_error("cancel", "unknown request"))?;

        if request.status == RequestStatus::Cancelled {
            log::debug!("🛑 Solicitud {} ya cancelada", request_id);
            return Ok(request);
        }

        log::info!("🛑 Cancelando solicitud {} (estado {})", request_id, request.status);
        self.api
            .update_request_status(request_id, &RequestStatus::Cancelled)
            .await
            .map_err(|e| {
                log::error!("❌ Cancelación de {} falló: {}", request_id, e);
                e
            })?;

        book.write()
            .await
            .update(request_id, |r| r.status = RequestStatus::Cancelled)
            .ok_or_else(|| precondition_error("cancel", "request disappeared during cancellation"))
    }
}
