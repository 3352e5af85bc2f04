//! Backend en memoria para los tests de dashboards

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use roadside_assist_client::models::{
    Availability, CreateCenterRequest, Feedback, FeedbackRequest, LocationUpdate, LoginRequest, LoginResponse,
    Mechanic, MechanicRegisterRequest, NewServiceRequestBody, PaymentRecord, PaymentRequest, PaymentStatus,
    RegisterRequest, RequestStatus, ServiceCenter, ServiceRequest, SkillType,
};
use roadside_assist_client::utils::errors::{http_error, ApiError, ApiResult};
use roadside_assist_client::RoadsideApi;

/// Respuesta programada: valor o código de error
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail(u16),
}

impl<T: Clone> Reply<T> {
    fn get(&self) -> ApiResult<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Fail(401) => Err(ApiError::Unauthorized("fake".to_string())),
            Reply::Fail(status) => Err(http_error(*status, format!("fake failure {}", status))),
        }
    }
}

pub struct FakeApi {
    pub requests: Mutex<Reply<Vec<ServiceRequest>>>,
    pub available: Mutex<Reply<Vec<Mechanic>>>,
    pub by_skill: Mutex<Reply<Vec<Mechanic>>>,
    pub nearest_by_center: Mutex<Reply<Vec<Mechanic>>>,
    /// Respuestas de "nearest by center" según la latitud consultada
    pub nearest_by_center_at: Mutex<Vec<(f64, Vec<Mechanic>)>>,
    pub nearest: Mutex<Reply<Vec<Mechanic>>>,
    pub assign: Mutex<Reply<()>>,
    pub status_update: Mutex<Reply<()>>,
    pub availability_update: Mutex<Reply<()>>,
    pub payment_status: Mutex<Reply<PaymentStatus>>,
    pub feedback_lookup: Mutex<Reply<()>>,
    pub feedback: Mutex<HashMap<i64, Feedback>>,
    pub profile: Mutex<Reply<Mechanic>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Reply::Ok(Vec::new())),
            available: Mutex::new(Reply::Ok(Vec::new())),
            by_skill: Mutex::new(Reply::Ok(Vec::new())),
            nearest_by_center: Mutex::new(Reply::Ok(Vec::new())),
            nearest_by_center_at: Mutex::new(Vec::new()),
            nearest: Mutex::new(Reply::Ok(Vec::new())),
            assign: Mutex::new(Reply::Ok(())),
            status_update: Mutex::new(Reply::Ok(())),
            availability_update: Mutex::new(Reply::Ok(())),
            payment_status: Mutex::new(Reply::Ok(PaymentStatus::default())),
            feedback_lookup: Mutex::new(Reply::Ok(())),
            feedback: Mutex::new(HashMap::new()),
            profile: Mutex::new(Reply::Fail(404)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set<T>(slot: &Mutex<T>, value: T) {
        *slot.lock().unwrap() = value;
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

pub fn request(id: i64, problem: &str, status: &str, coordinates: Option<(f64, f64)>) -> ServiceRequest {
    let (latitude, longitude) = match coordinates {
        Some((lat, lng)) => (Some(lat), Some(lng)),
        None => (None, None),
    };
    serde_json::from_value(json!({
        "id": id,
        "problemType": problem,
        "status": status,
        "location": format!("Location {}", id),
        "latitude": latitude,
        "longitude": longitude,
        "amount": 1500.0,
        "createdAt": format!("2024-06-{:02}T10:00:00", id.clamp(1, 28))
    }))
    .unwrap()
}

pub fn mechanic(id: i64, skill: &str, distance: Option<f64>) -> Mechanic {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Mechanic {}", id),
        "skillType": skill,
        "verified": true,
        "availability": "AVAILABLE",
        "distance": distance
    }))
    .unwrap()
}

#[async_trait]
impl RoadsideApi for FakeApi {
    async fn my_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        self.record("my_requests");
        self.requests.lock().unwrap().get()
    }

    async fn create_request(&self, body: &NewServiceRequestBody) -> ApiResult<ServiceRequest> {
        self.record(format!("create_request:{}:{}", body.problem_type, body.amount));
        Ok(serde_json::from_value(json!({
            "id": 100,
            "problemType": body.problem_type.as_str(),
            "status": "CREATED",
            "location": body.location,
            "latitude": body.latitude,
            "longitude": body.longitude,
            "amount": body.amount.to_string().parse::<f64>().unwrap()
        }))
        .unwrap())
    }

    async fn admin_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        self.record("admin_requests");
        self.requests.lock().unwrap().get()
    }

    async fn update_request_status(&self, request_id: i64, status: &RequestStatus) -> ApiResult<()> {
        self.record(format!("status:{}:{}", request_id, status));
        tokio::task::yield_now().await;
        self.status_update.lock().unwrap().get()
    }

    async fn all_mechanics(&self) -> ApiResult<Vec<Mechanic>> {
        self.record("all_mechanics");
        self.available.lock().unwrap().get()
    }

    async fn available_mechanics(&self) -> ApiResult<Vec<Mechanic>> {
        self.record("available");
        self.available.lock().unwrap().get()
    }

    async fn available_mechanics_by_skill(&self, skill: &SkillType) -> ApiResult<Vec<Mechanic>> {
        self.record(format!("by_skill:{}", skill));
        self.by_skill.lock().unwrap().get()
    }

    async fn nearest_mechanics_by_center(
        &self,
        skill: &SkillType,
        latitude: f64,
        _longitude: f64,
    ) -> ApiResult<Vec<Mechanic>> {
        self.record(format!("nearest_by_center:{}", skill));
        let by_lat = self
            .nearest_by_center_at
            .lock()
            .unwrap()
            .iter()
            .find(|(lat, _)| *lat == latitude)
            .map(|(_, list)| list.clone());
        match by_lat {
            Some(list) => Ok(list),
            None => self.nearest_by_center.lock().unwrap().get(),
        }
    }

    async fn nearest_mechanics(&self, skill: &SkillType, _latitude: f64, _longitude: f64) -> ApiResult<Vec<Mechanic>> {
        self.record(format!("nearest:{}", skill));
        self.nearest.lock().unwrap().get()
    }

    async fn assign_mechanic(&self, request_id: i64, mechanic_id: i64) -> ApiResult<()> {
        self.record(format!("assign:{}:{}", request_id, mechanic_id));
        // Deja correr a otras tareas mientras la asignación está en vuelo
        tokio::task::yield_now().await;
        self.assign.lock().unwrap().get()
    }

    async fn verify_mechanic(&self, mechanic_id: i64) -> ApiResult<()> {
        self.record(format!("verify:{}", mechanic_id));
        Ok(())
    }

    async fn payment_status(&self, request_id: i64) -> ApiResult<PaymentStatus> {
        self.record(format!("payment_status:{}", request_id));
        self.payment_status.lock().unwrap().get()
    }

    async fn create_payment(&self, payment: &PaymentRequest) -> ApiResult<PaymentRecord> {
        self.record(format!("payment:{}:{}", payment.request_id, payment.payment_method.as_str()));
        tokio::task::yield_now().await;
        Ok(PaymentRecord {
            id: Some(1),
            request_id: Some(payment.request_id),
            ..PaymentRecord::default()
        })
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> ApiResult<()> {
        self.record(format!("feedback:{}:{}", feedback.request_id, feedback.rating));
        tokio::task::yield_now().await;
        self.feedback.lock().unwrap().insert(
            feedback.request_id,
            Feedback {
                id: Some(1),
                request_id: feedback.request_id,
                mechanic_id: feedback.mechanic_id,
                rating: feedback.rating,
                comment: feedback.comment.clone(),
                created_at: None,
            },
        );
        Ok(())
    }

    async fn feedback_for_request(&self, request_id: i64) -> ApiResult<Option<Feedback>> {
        self.record(format!("feedback_lookup:{}", request_id));
        self.feedback_lookup.lock().unwrap().get()?;
        Ok(self.feedback.lock().unwrap().get(&request_id).cloned())
    }

    async fn mechanic_feedback(&self, mechanic_id: i64) -> ApiResult<Vec<Feedback>> {
        self.record(format!("mechanic_feedback:{}", mechanic_id));
        Ok(self
            .feedback
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.mechanic_id == Some(mechanic_id))
            .cloned()
            .collect())
    }

    async fn update_availability(&self, availability: Availability) -> ApiResult<()> {
        self.record(format!("availability:{}", availability.as_str()));
        self.availability_update.lock().unwrap().get()
    }

    async fn update_location(&self, location: LocationUpdate) -> ApiResult<()> {
        self.record(format!("location:{}:{}", location.latitude, location.longitude));
        Ok(())
    }

    async fn mechanic_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        self.record("mechanic_requests");
        self.requests.lock().unwrap().get()
    }

    async fn mechanic_profile(&self) -> ApiResult<Mechanic> {
        self.record("profile");
        self.profile.lock().unwrap().get()
    }

    async fn centers(&self) -> ApiResult<Vec<ServiceCenter>> {
        self.record("centers");
        Ok(Vec::new())
    }

    async fn create_center(&self, center: &CreateCenterRequest) -> ApiResult<ServiceCenter> {
        self.record(format!("create_center:{}", center.name));
        Ok(serde_json::from_value(json!({ "id": 1, "name": center.name })).unwrap())
    }

    async fn assign_center(&self, mechanic_email: &str, center_id: i64) -> ApiResult<()> {
        self.record(format!("assign_center:{}:{}", mechanic_email, center_id));
        Err(http_error(409, "Center capacity reached for this skill"))
    }

    async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        self.record(format!("login:{}", credentials.email));
        Err(http_error(401, "bad credentials"))
    }

    async fn register_customer(&self, registration: &RegisterRequest) -> ApiResult<()> {
        self.record(format!("register_customer:{}", registration.email));
        Ok(())
    }

    async fn register_mechanic(&self, registration: &MechanicRegisterRequest) -> ApiResult<()> {
        self.record(format!("register_mechanic:{}", registration.email));
        Ok(())
    }
}
