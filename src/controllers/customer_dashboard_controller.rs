//! Dashboard de cliente
//!
//! Solicitudes propias con las acciones "Pay" y "Rate", y alta de nuevas
//! solicitudes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LoadStatus, NoticeBoard};
use crate::clients::RoadsideApi;
use crate::dto::{CustomerRequestRow, LoadState, Notice};
use crate::models::{CreateServiceRequest, PaymentMethod, PaymentStatus};
use crate::repositories::{RequestBook, RequestRepository};
use crate::services::lifecycle;
use crate::services::{FeedbackService, GeocodingService, InFlight, PaymentService};
use crate::utils::errors::{precondition_error, ApiError};

pub struct CustomerDashboardController {
    requests: RequestRepository,
    payments: PaymentService,
    feedback: FeedbackService,
    geocoding: Option<GeocodingService>,
    book: RwLock<RequestBook>,
    payment_lookups: RwLock<HashMap<i64, PaymentStatus>>,
    paying: InFlight,
    rating: InFlight,
    notices: NoticeBoard,
    status: LoadStatus,
}

impl CustomerDashboardController {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self {
            requests: RequestRepository::new(Arc::clone(&api)),
            payments: PaymentService::new(Arc::clone(&api)),
            feedback: FeedbackService::new(api),
            geocoding: None,
            book: RwLock::new(RequestBook::new()),
            payment_lookups: RwLock::new(HashMap::new()),
            paying: InFlight::new(),
            rating: InFlight::new(),
            notices: NoticeBoard::default(),
            status: LoadStatus::default(),
        }
    }

    /// Geocoding opcional de la dirección escrita al crear una solicitud
    pub fn with_geocoding(mut self, geocoding: GeocodingService) -> Self {
        self.geocoding = Some(geocoding);
        self
    }

    pub async fn load(&self) -> LoadState {
        self.status.set(LoadState::Loading).await;
        log::info!("📊 Cargando dashboard de cliente");

        let requests = match self.requests.my_requests().await {
            Ok(requests) => requests,
            Err(e) => {
                log::error!("❌ Error cargando solicitudes: {}", e);
                return self.status.set(LoadState::failed(&e)).await;
            }
        };

        let (lookups, _ratings) = tokio::join!(
            self.payments.lookup_pending(&requests),
            self.feedback.ratings_for(&requests)
        );

        {
            let mut known = self.payment_lookups.write().await;
            known.clear();
            known.extend(lookups.into_iter().filter_map(|(id, status)| status.map(|s| (id, s))));
        }
        self.book.write().await.replace_all(requests);

        self.status.set(LoadState::Ready).await
    }

    pub async fn load_state(&self) -> LoadState {
        self.status.get().await
    }

    pub async fn rows(&self) -> Vec<CustomerRequestRow> {
        let requests: Vec<_> = self.book.read().await.ordered().into_iter().cloned().collect();
        let lookups = self.payment_lookups.read().await.clone();

        let mut rows = Vec::with_capacity(requests.len());
        for request in &requests {
            let rating = self.feedback.known_rating(request.id).await;
            let actions = lifecycle::customer_actions(request, lookups.get(&request.id), rating);
            rows.push(
                CustomerRequestRow::build(request, actions)
                    .in_flight(self.paying.contains(request.id), self.rating.contains(request.id)),
            );
        }
        rows
    }

    /// Alta de solicitud. Sin coordenadas, se intenta geocodificar la dirección.
    pub async fn create_request(&self, mut form: CreateServiceRequest) -> Notice {
        if form.latitude.is_none() && form.longitude.is_none() {
            if let Some(geocoding) = &self.geocoding {
                let result = geocoding.geocode_address(&form.location).await;
                if result.success {
                    form.latitude = result.latitude;
                    form.longitude = result.longitude;
                }
            }
        }

        let notice = match self.requests.create(form).await {
            Ok(created) => {
                let id = created.id;
                self.book.write().await.upsert(created);
                Notice::success(id, "Request created")
            }
            Err(e) => Notice::error(None, &e),
        };
        self.notices.push(notice).await
    }

    pub async fn pay(&self, request_id: i64, method: PaymentMethod) -> Notice {
        let Some(_guard) = self.paying.try_acquire(request_id) else {
            log::debug!("⏳ Pago de la solicitud {} ya en vuelo, se ignora", request_id);
            return self.notices.push(Notice::info(Some(request_id), "Payment already in progress")).await;
        };

        let Some(request) = self.book.read().await.get(request_id).cloned() else {
            return self.notices.push(Notice::error(Some(request_id), &unknown(request_id))).await;
        };
        let lookup = self.payment_lookups.read().await.get(&request_id).copied();

        let notice = match self.payments.pay(&request, method, lookup.as_ref()).await {
            Ok(next) => {
                self.book.write().await.update(request_id, |r| r.status = next);
                self.payment_lookups.write().await.insert(
                    request_id,
                    PaymentStatus {
                        is_paid: true,
                        can_pay: false,
                    },
                );
                Notice::success(request_id, "Payment successful")
            }
            Err(e) => Notice::error(Some(request_id), &e),
        };
        self.notices.push(notice).await
    }

    pub async fn rate(&self, request_id: i64, rating: u8, comment: Option<String>) -> Notice {
        let Some(_guard) = self.rating.try_acquire(request_id) else {
            log::debug!("⏳ Calificación de la solicitud {} ya en vuelo, se ignora", request_id);
            return self.notices.push(Notice::info(Some(request_id), "Feedback already being submitted")).await;
        };

        let Some(request) = self.book.read().await.get(request_id).cloned() else {
            return self.notices.push(Notice::error(Some(request_id), &unknown(request_id))).await;
        };

        let notice = match self.feedback.submit(&request, rating, comment).await {
            Ok(_) => Notice::success(request_id, "Thanks for your feedback"),
            Err(e) => Notice::error(Some(request_id), &e),
        };
        self.notices.push(notice).await
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.notices.list().await
    }

    pub async fn dismiss(&self, notice_id: Uuid) -> bool {
        self.notices.dismiss(notice_id).await
    }
}

fn unknown(request_id: i64) -> ApiError {
    precondition_error("act", &format!("request {} is not on this dashboard", request_id))
}
