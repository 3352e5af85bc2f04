use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LoadStatus, NoticeBoard};
use crate::clients::RoadsideApi;
use crate::dto::{LoadState, MechanicRequestRow, Notice};
use crate::models::{Availability, Mechanic};
use crate::repositories::{RequestBook, RequestRepository};
use crate::services::mechanic_service::{navigation_url, MechanicService};
use crate::services::InFlight;

/// Dashboard del mecánico: trabajos asignados, disponibilidad y ubicación
pub struct MechanicDashboardController {
    service: MechanicService,
    requests: RequestRepository,
    book: RwLock<RequestBook>,
    profile: RwLock<Option<Mechanic>>,
    finishing: InFlight,
    notices: NoticeBoard,
    status: LoadStatus,
}

impl MechanicDashboardController {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self {
            service: MechanicService::new(Arc::clone(&api)),
            requests: RequestRepository::new(api),
            book: RwLock::new(RequestBook::new()),
            profile: RwLock::new(None),
            finishing: InFlight::new(),
            notices: NoticeBoard::default(),
            status: LoadStatus::default(),
        }
    }

    pub async fn load(&self) -> LoadState {
        self.status.set(LoadState::Loading).await;
        log::info!("📊 Cargando dashboard de mecánico");

        let (profile, requests) = tokio::join!(self.service.profile(), self.requests.assigned_to_me());

        match profile {
            Ok(profile) => *self.profile.write().await = Some(profile),
            Err(e) => log::warn!("⚠️ Perfil de mecánico no disponible: {}", e),
        }

        match requests {
            Ok(requests) => {
                self.book.write().await.replace_all(requests);
                self.status.set(LoadState::Ready).await
            }
            Err(e) => {
                log::error!("❌ Error cargando trabajos: {}", e);
                self.status.set(LoadState::failed(&e)).await
            }
        }
    }

    pub async fn load_state(&self) -> LoadState {
        self.status.get().await
    }

    pub async fn profile(&self) -> Option<Mechanic> {
        self.profile.read().await.clone()
    }

    pub async fn rows(&self) -> Vec<MechanicRequestRow> {
        self.book
            .read()
            .await
            .ordered()
            .into_iter()
            .map(|request| MechanicRequestRow::build(request).in_flight(self.finishing.contains(request.id)))
            .collect()
    }

    pub async fn set_availability(&self, availability: Availability) -> Notice {
        let notice = match self.service.set_availability(availability).await {
            Ok(()) => {
                if let Some(profile) = self.profile.write().await.as_mut() {
                    profile.availability = availability;
                }
                Notice::info(None, format!("Availability set to {}", availability.as_str()))
            }
            Err(e) => Notice::error(None, &e),
        };
        self.notices.push(notice).await
    }

    pub async fn share_location(&self, latitude: f64, longitude: f64) -> Notice {
        let notice = match self.service.share_location(latitude, longitude).await {
            Ok(()) => {
                if let Some(profile) = self.profile.write().await.as_mut() {
                    profile.latitude = Some(latitude);
                    profile.longitude = Some(longitude);
                }
                Notice::info(None, "Location shared")
            }
            Err(e) => Notice::error(None, &e),
        };
        self.notices.push(notice).await
    }

    pub async fn mark_done(&self, request_id: i64) -> Notice {
        let Some(_guard) = self.finishing.try_acquire(request_id) else {
            log::debug!("⏳ Cierre de la solicitud {} ya en vuelo, se ignora", request_id);
            return self.notices.push(Notice::info(Some(request_id), "Job is already being closed")).await;
        };

        let request = self.book.read().await.get(request_id).cloned();
        let Some(request) = request else {
            let error = crate::utils::errors::precondition_error("mark done", "unknown request");
            return self.notices.push(Notice::error(Some(request_id), &error)).await;
        };

        let notice = match self.service.mark_done(&request).await {
            Ok(next) => {
                self.book.write().await.update(request_id, |r| r.status = next);
                if let Some(profile) = self.profile.write().await.as_mut() {
                    profile.availability = Availability::Available;
                }
                Notice::success(request_id, "Job completed, awaiting payment")
            }
            Err(e) => Notice::error(Some(request_id), &e),
        };
        self.notices.push(notice).await
    }

    /// Enlace de navegación de una fila activa
    pub async fn navigate(&self, request_id: i64) -> Option<String> {
        let request = self.book.read().await.get(request_id).cloned()?;
        if !crate::services::lifecycle::can_work_on(&request.status) {
            return None;
        }
        navigation_url(&request)
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.notices.list().await
    }

    pub async fn dismiss(&self, notice_id: Uuid) -> bool {
        self.notices.dismiss(notice_id).await
    }
}
