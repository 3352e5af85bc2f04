//! Servicio de feedback
//!
//! Una solicitud se califica una sola vez. Las calificaciones conocidas (por
//! envío propio o por consulta al backend) se guardan en un registro local
//! para que "Rate" no vuelva a aparecer aunque la consulta posterior falle.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use validator::Validate;

use crate::clients::RoadsideApi;
use crate::models::{FeedbackRequest, MechanicRatingSummary, ServiceRequest};
use crate::services::lifecycle::{self, FeedbackGate};
use crate::utils::errors::{precondition_error, ApiResult};

pub struct FeedbackService {
    api: Arc<dyn RoadsideApi>,
    ratings: RwLock<HashMap<i64, u8>>,
}

impl FeedbackService {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self {
            api,
            ratings: RwLock::new(HashMap::new()),
        }
    }

    /// Calificación ya conocida para la solicitud, si la hay
    pub async fn rating_for(&self, request_id: i64) -> Option<u8> {
        if let Some(rating) = self.ratings.read().await.get(&request_id) {
            return Some(*rating);
        }

        match self.api.feedback_for_request(request_id).await {
            Ok(Some(feedback)) => {
                self.ratings.write().await.insert(request_id, feedback.rating);
                Some(feedback.rating)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("⚠️ Feedback de {} no disponible: {}", request_id, e);
                None
            }
        }
    }

    /// Calificaciones de las solicitudes ya pagadas, en paralelo
    pub async fn ratings_for(&self, requests: &[ServiceRequest]) -> HashMap<i64, u8> {
        let settled: Vec<i64> = requests
            .iter()
            .filter(|r| lifecycle::is_payment_settled(&r.status))
            .map(|r| r.id)
            .collect();

        let ratings = join_all(settled.iter().map(|id| self.rating_for(*id))).await;
        settled
            .into_iter()
            .zip(ratings)
            .filter_map(|(id, rating)| rating.map(|r| (id, r)))
            .collect()
    }

    /// Calificación registrada localmente, sin tocar la red
    pub async fn known_rating(&self, request_id: i64) -> Option<u8> {
        self.ratings.read().await.get(&request_id).copied()
    }

    pub async fn gate(&self, request: &ServiceRequest) -> FeedbackGate {
        let known = self.known_rating(request.id).await;
        lifecycle::feedback_gate(&request.status, known)
    }

    /// Enviar la calificación de una solicitud pagada
    pub async fn submit(&self, request: &ServiceRequest, rating: u8, comment: Option<String>) -> ApiResult<FeedbackGate> {
        let form = FeedbackRequest {
            request_id: request.id,
            mechanic_id: request.assigned_mechanic_id(),
            rating,
            comment: comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        };
        form.validate()?;

        match self.gate(request).await {
            FeedbackGate::Rate => {}
            FeedbackGate::Rated(existing) => {
                return Err(precondition_error(
                    "rate",
                    &format!("request {} was already rated {} / 5", request.id, existing),
                ));
            }
            FeedbackGate::Hidden => {
                return Err(precondition_error(
                    "rate",
                    &format!("request {} is {}", request.id, request.status.as_str()),
                ));
            }
        }

        log::info!("⭐ Calificando solicitud {} con {}", request.id, rating);
        self.api.submit_feedback(&form).await?;
        self.ratings.write().await.insert(request.id, rating);
        Ok(FeedbackGate::Rated(rating))
    }

    /// Promedio de calificaciones de un mecánico (vista admin)
    pub async fn mechanic_summary(&self, mechanic_id: i64) -> ApiResult<MechanicRatingSummary> {
        let feedback = self.api.mechanic_feedback(mechanic_id).await?;
        Ok(MechanicRatingSummary::from_feedback(mechanic_id, &feedback))
    }
}
