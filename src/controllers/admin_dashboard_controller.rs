//! Dashboard de administración
//!
//! Lista todas las solicitudes con su selector de candidatos, y permite
//! asignar, cancelar, verificar mecánicos y gestionar centros.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LoadStatus, NoticeBoard};
use crate::clients::RoadsideApi;
use crate::dto::{AdminRequestRow, LoadState, Notice};
use crate::models::{CreateCenterRequest, Mechanic, MechanicRatingSummary, ProblemType, ServiceCenter};
use crate::repositories::{RequestBook, RequestRepository};
use crate::services::lifecycle;
use crate::services::{
    AssignOutcome, AssignmentCoordinator, CenterService, FeedbackService, MechanicResolutionService, Resolution,
};
use crate::utils::errors::ApiResult;

pub struct AdminDashboardController {
    api: Arc<dyn RoadsideApi>,
    requests: RequestRepository,
    resolver: MechanicResolutionService,
    coordinator: AssignmentCoordinator,
    centers: CenterService,
    feedback: FeedbackService,
    book: RwLock<RequestBook>,
    pool: RwLock<Vec<Mechanic>>,
    selections: RwLock<HashMap<i64, i64>>,
    notices: NoticeBoard,
    status: LoadStatus,
}

impl AdminDashboardController {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self::with_resolver(Arc::clone(&api), MechanicResolutionService::new(api))
    }

    pub fn with_resolver(api: Arc<dyn RoadsideApi>, resolver: MechanicResolutionService) -> Self {
        Self {
            requests: RequestRepository::new(Arc::clone(&api)),
            coordinator: AssignmentCoordinator::new(Arc::clone(&api)),
            centers: CenterService::new(Arc::clone(&api)),
            feedback: FeedbackService::new(Arc::clone(&api)),
            resolver,
            api,
            book: RwLock::new(RequestBook::new()),
            pool: RwLock::new(Vec::new()),
            selections: RwLock::new(HashMap::new()),
            notices: NoticeBoard::default(),
            status: LoadStatus::default(),
        }
    }

    /// Carga inicial: solicitudes y pool de disponibles en paralelo. Sólo el
    /// fallo de las solicitudes es un error de página; sin pool se sigue.
    pub async fn load(&self) -> LoadState {
        self.status.set(LoadState::Loading).await;
        log::info!("📊 Cargando dashboard admin");
        // Los candidatos previos se resolvieron contra el pool anterior
        self.resolver.clear_cache().await;

        let (requests, mechanics) = tokio::join!(self.requests.all_requests(), self.api.available_mechanics());

        let pool = mechanics.unwrap_or_else(|e| {
            log::warn!("⚠️ Pool de mecánicos no disponible, se continúa sin él: {}", e);
            Vec::new()
        });
        *self.pool.write().await = pool.clone();

        let requests = match requests {
            Ok(requests) => requests,
            Err(e) => {
                log::error!("❌ Error cargando solicitudes: {}", e);
                return self.status.set(LoadState::failed(&e)).await;
            }
        };

        let assignable: Vec<_> = requests.iter().filter(|r| lifecycle::can_assign(r)).cloned().collect();
        self.book.write().await.replace_all(requests);

        join_all(assignable.iter().map(|r| self.resolver.resolve_for_request(r, &pool))).await;

        log::info!("✅ Dashboard admin listo ({} solicitudes, {} asignables)", self.book.read().await.len(), assignable.len());
        self.status.set(LoadState::Ready).await
    }

    pub async fn load_state(&self) -> LoadState {
        self.status.get().await
    }

    /// Filas, más recientes primero
    pub async fn rows(&self) -> Vec<AdminRequestRow> {
        let requests: Vec<_> = self.book.read().await.ordered().into_iter().cloned().collect();
        let selections = self.selections.read().await.clone();

        let mut rows = Vec::with_capacity(requests.len());
        for request in &requests {
            let candidates = self.resolver.cached_candidates(request).await.map(|(resolution, _)| resolution);
            rows.push(AdminRequestRow::build(
                request,
                candidates.as_ref(),
                selections.get(&request.id).copied(),
                self.coordinator.is_in_flight(request.id),
            ));
        }
        rows
    }

    /// Candidatos de una fila (cache por solicitud, o resolución nueva)
    pub async fn candidates_for(&self, request_id: i64) -> Option<Resolution> {
        let request = self.book.read().await.get(request_id).cloned()?;
        let pool = self.pool.read().await.clone();
        Some(self.resolver.resolve_for_request(&request, &pool).await)
    }

    /// Candidatos generales por tipo de problema, sin coordenadas
    pub async fn candidates_for_problem(&self, problem_type: &ProblemType) -> Resolution {
        let pool = self.pool.read().await.clone();
        self.resolver.resolve_for_problem(problem_type, &pool).await
    }

    pub async fn select_mechanic(&self, request_id: i64, mechanic_id: i64) {
        self.selections.write().await.insert(request_id, mechanic_id);
    }

    pub async fn assign(&self, request_id: i64) -> Notice {
        let selected = self.selections.read().await.get(&request_id).copied();

        let mut known = self.pool.read().await.clone();
        let request = self.book.read().await.get(request_id).cloned();
        if let Some(request) = request {
            if let Some((resolution, _)) = self.resolver.cached_candidates(&request).await {
                known.extend(resolution.mechanics);
            }
        }

        let notice = match self.coordinator.assign(&self.book, request_id, selected, &known).await {
            Ok(AssignOutcome::Assigned(request)) => {
                self.selections.write().await.remove(&request_id);
                self.resolver.forget_request(request_id).await;
                let name = request
                    .mechanic
                    .as_ref()
                    .map(|m| m.name.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("mechanic #{}", selected.unwrap_or_default()));
                Notice::success(request_id, format!("Assigned to {}", name))
            }
            Ok(AssignOutcome::AlreadyInFlight) => Notice::info(Some(request_id), "Assignment already in progress"),
            Err(e) => Notice::error(Some(request_id), &e),
        };
        self.notices.push(notice).await
    }

    pub async fn cancel(&self, request_id: i64) -> Notice {
        let notice = match self.coordinator.cancel(&self.book, request_id).await {
            Ok(_) => {
                self.selections.write().await.remove(&request_id);
                self.resolver.forget_request(request_id).await;
                Notice::success(request_id, "Request cancelled")
            }
            Err(e) => Notice::error(Some(request_id), &e),
        };
        self.notices.push(notice).await
    }

    /// Todos los mecánicos (incluidos no verificados) para la vista de verificación
    pub async fn all_mechanics(&self) -> ApiResult<Vec<Mechanic>> {
        let mut mechanics = self.api.all_mechanics().await?;
        mechanics.sort_by_key(|m| (m.verified, m.id));
        Ok(mechanics)
    }

    pub async fn verify_mechanic(&self, mechanic_id: i64) -> Notice {
        log::info!("🛡️ Verificando mecánico {}", mechanic_id);
        let notice = match self.api.verify_mechanic(mechanic_id).await {
            Ok(()) => {
                if let Some(m) = self.pool.write().await.iter_mut().find(|m| m.id == mechanic_id) {
                    m.verified = true;
                }
                self.resolver.clear_cache().await;
                Notice::info(None, format!("Mechanic #{} verified", mechanic_id))
            }
            Err(e) => Notice::error(None, &e),
        };
        self.notices.push(notice).await
    }

    pub async fn mechanic_rating(&self, mechanic_id: i64) -> ApiResult<MechanicRatingSummary> {
        self.feedback.mechanic_summary(mechanic_id).await
    }

    pub async fn centers(&self) -> ApiResult<Vec<ServiceCenter>> {
        self.centers.list().await
    }

    pub async fn create_center(&self, form: CreateCenterRequest) -> Notice {
        let notice = match self.centers.create(form).await {
            Ok(center) => Notice::info(None, format!("Center '{}' created", center.name)),
            Err(e) => Notice::error(None, &e),
        };
        self.notices.push(notice).await
    }

    pub async fn assign_center(&self, mechanic_email: &str, center_id: i64) -> Notice {
        let notice = match self.centers.assign_mechanic(mechanic_email, center_id).await {
            Ok(()) => Notice::info(None, format!("{} attached to center #{}", mechanic_email, center_id)),
            Err(e) => Notice::error(None, &e),
        };
        self.notices.push(notice).await
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.notices.list().await
    }

    pub async fn dismiss(&self, notice_id: Uuid) -> bool {
        self.notices.dismiss(notice_id).await
    }

    pub async fn pool_size(&self) -> usize {
        self.pool.read().await.len()
    }
}
