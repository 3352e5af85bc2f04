//! Controllers
//!
//! Un controller por dashboard (admin, cliente, mecánico). Cada uno es dueño
//! de su lista de solicitudes y traduce los resultados de los servicios a
//! filas y avisos; ningún error de red sale de una acción sin capturar.

pub mod admin_dashboard_controller;
pub mod customer_dashboard_controller;
pub mod mechanic_dashboard_controller;

pub use admin_dashboard_controller::AdminDashboardController;
pub use customer_dashboard_controller::CustomerDashboardController;
pub use mechanic_dashboard_controller::MechanicDashboardController;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dto::{LoadState, Notice};

/// Avisos descartables de un dashboard
#[derive(Default)]
pub(crate) struct NoticeBoard {
    notices: RwLock<Vec<Notice>>,
}

impl NoticeBoard {
    pub(crate) async fn push(&self, notice: Notice) -> Notice {
        if notice.is_error() {
            log::warn!("📣 Aviso {:?}: {}", notice.request_id, notice.message);
        }
        self.notices.write().await.push(notice.clone());
        notice
    }

    pub(crate) async fn list(&self) -> Vec<Notice> {
        self.notices.read().await.clone()
    }

    pub(crate) async fn dismiss(&self, notice_id: Uuid) -> bool {
        let mut notices = self.notices.write().await;
        let before = notices.len();
        notices.retain(|n| n.id != notice_id);
        notices.len() != before
    }
}

/// Estado de carga compartido por los tres dashboards
pub(crate) struct LoadStatus {
    state: RwLock<LoadState>,
}

impl Default for LoadStatus {
    fn default() -> Self {
        Self {
            state: RwLock::new(LoadState::Loading),
        }
    }
}

impl LoadStatus {
    pub(crate) async fn set(&self, state: LoadState) -> LoadState {
        *self.state.write().await = state.clone();
        state
    }

    pub(crate) async fn get(&self) -> LoadState {
        self.state.read().await.clone()
    }
}
