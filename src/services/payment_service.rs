//! Servicio de pagos
//!
//! El pago es simulado: se registra con `POST /payments` y luego se mueve la
//! solicitud a PAID. La decisión de mostrar "Pay" usa la consulta de estado de
//! pago cuando responde y el estado de la solicitud cuando falla.

use std::sync::Arc;

use futures::future::join_all;
use validator::Validate;

use crate::clients::RoadsideApi;
use crate::models::{PaymentMethod, PaymentRequest, PaymentStatus, RequestStatus, ServiceRequest};
use crate::services::lifecycle::{self, LifecycleEvent};
use crate::utils::errors::{precondition_error, ApiResult};

#[derive(Clone)]
pub struct PaymentService {
    api: Arc<dyn RoadsideApi>,
}

impl PaymentService {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self { api }
    }

    /// Estado de pago de una solicitud; `None` si la consulta falla
    pub async fn lookup(&self, request_id: i64) -> Option<PaymentStatus> {
        match self.api.payment_status(request_id).await {
            Ok(status) => Some(status),
            Err(e) => {
                log::warn!("⚠️ Estado de pago de {} no disponible: {}", request_id, e);
                None
            }
        }
    }

    /// Consultas de estado de pago para las solicitudes en PAYMENT_PENDING, en paralelo
    pub async fn lookup_pending(&self, requests: &[ServiceRequest]) -> Vec<(i64, Option<PaymentStatus>)> {
        let pending: Vec<i64> = requests
            .iter()
            .filter(|r| r.status == RequestStatus::PaymentPending)
            .map(|r| r.id)
            .collect();

        let lookups = join_all(pending.iter().map(|id| self.lookup(*id))).await;
        pending.into_iter().zip(lookups).collect()
    }

    /// Pagar una solicitud. Devuelve el estado resultante (PAID).
    ///
    /// Si el pago queda registrado pero el cambio de estado falla, el error se
    /// registra y la solicitud se considera pagada igualmente.
    pub async fn pay(
        &self,
        request: &ServiceRequest,
        method: PaymentMethod,
        lookup: Option<&PaymentStatus>,
    ) -> ApiResult<RequestStatus> {
        if !lifecycle::can_pay(&request.status, lookup) {
            return Err(precondition_error(
                "pay",
                &format!("request {} is not awaiting payment", request.id),
            ));
        }
        let next = lifecycle::transition(&request.status, LifecycleEvent::Pay)?;

        let payment = PaymentRequest {
            request_id: request.id,
            amount: request.amount,
            payment_method: method,
        };
        payment.validate()?;

        log::info!("💳 Pagando solicitud {} ({} via {})", request.id, request.amount, method.as_str());
        let record = self.api.create_payment(&payment).await?;
        log::debug!("💳 Pago registrado: {:?}", record.id);

        if let Err(e) = self.api.update_request_status(request.id, &next).await {
            log::error!("❌ Pago de {} registrado pero el estado no se actualizó: {}", request.id, e);
        }

        log::info!("✅ Solicitud {} pagada", request.id);
        Ok(next)
    }
}
