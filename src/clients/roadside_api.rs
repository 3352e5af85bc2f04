//! Contrato del backend REST
//!
//! Todas las operaciones lógicas que el cliente consume. El resto del crate
//! depende de este trait y no de reqwest, de modo que el motor de resolución,
//! el coordinador de asignación y los dashboards se prueban contra un fake.

use async_trait::async_trait;

use crate::models::{
    Availability, CreateCenterRequest, Feedback, FeedbackRequest, LocationUpdate, LoginRequest,
    LoginResponse, Mechanic, MechanicRegisterRequest, NewServiceRequestBody, PaymentRecord,
    PaymentRequest, PaymentStatus, RegisterRequest, RequestStatus, ServiceCenter, ServiceRequest,
    SkillType,
};
use crate::utils::errors::ApiResult;

#[async_trait]
pub trait RoadsideApi: Send + Sync {
    // --- Solicitudes ---

    /// `GET /requests/me`
    async fn my_requests(&self) -> ApiResult<Vec<ServiceRequest>>;

    /// `POST /requests`
    async fn create_request(&self, body: &NewServiceRequestBody) -> ApiResult<ServiceRequest>;

    /// `GET /admin/requests`
    async fn admin_requests(&self) -> ApiResult<Vec<ServiceRequest>>;

    /// `PATCH /requests/{id}/status?status={STATUS}`
    async fn update_request_status(&self, request_id: i64, status: &RequestStatus) -> ApiResult<()>;

    // --- Mecánicos (admin) ---

    /// `GET /admin/mechanics`
    async fn all_mechanics(&self) -> ApiResult<Vec<Mechanic>>;

    /// `GET /admin/mechanics/available`
    async fn available_mechanics(&self) -> ApiResult<Vec<Mechanic>>;

    /// `GET /admin/mechanics/available/skill/{skill}`
    async fn available_mechanics_by_skill(&self, skill: &SkillType) -> ApiResult<Vec<Mechanic>>;

    /// `GET /admin/mechanics/available/skill/{skill}/nearest/by-center?latitude&longitude`
    async fn nearest_mechanics_by_center(
        &self,
        skill: &SkillType,
        latitude: f64,
        longitude: f64,
    ) -> ApiResult<Vec<Mechanic>>;

    /// `GET /admin/mechanics/available/skill/{skill}/nearest?latitude&longitude`
    async fn nearest_mechanics(
        &self,
        skill: &SkillType,
        latitude: f64,
        longitude: f64,
    ) -> ApiResult<Vec<Mechanic>>;

    /// `PATCH /admin/assign?requestId&mechanicId`
    async fn assign_mechanic(&self, request_id: i64, mechanic_id: i64) -> ApiResult<()>;

    /// `PATCH /admin/mechanics/{id}/verify`
    async fn verify_mechanic(&self, mechanic_id: i64) -> ApiResult<()>;

    // --- Pagos y feedback ---

    /// `GET /requests/{id}/payment-status`
    async fn payment_status(&self, request_id: i64) -> ApiResult<PaymentStatus>;

    /// `POST /payments`
    async fn create_payment(&self, payment: &PaymentRequest) -> ApiResult<PaymentRecord>;

    /// `POST /feedback`
    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> ApiResult<()>;

    /// `GET /feedback/request/{id}`; `None` si la solicitud no tiene feedback
    async fn feedback_for_request(&self, request_id: i64) -> ApiResult<Option<Feedback>>;

    /// `GET /admin/feedback/mechanic/{id}`
    async fn mechanic_feedback(&self, mechanic_id: i64) -> ApiResult<Vec<Feedback>>;

    // --- Autoservicio del mecánico ---

    /// `PATCH /mechanics/availability?status`
    async fn update_availability(&self, availability: Availability) -> ApiResult<()>;

    /// `PATCH /mechanics/location`
    async fn update_location(&self, location: LocationUpdate) -> ApiResult<()>;

    /// `GET /mechanics/my-requests`
    async fn mechanic_requests(&self) -> ApiResult<Vec<ServiceRequest>>;

    /// `GET /mechanics/me`
    async fn mechanic_profile(&self) -> ApiResult<Mechanic>;

    // --- Centros ---

    /// `GET /centers`
    async fn centers(&self) -> ApiResult<Vec<ServiceCenter>>;

    /// `POST /centers`
    async fn create_center(&self, center: &CreateCenterRequest) -> ApiResult<ServiceCenter>;

    /// `PATCH /mechanics/assign-center?email&centerId`
    async fn assign_center(&self, mechanic_email: &str, center_id: i64) -> ApiResult<()>;

    // --- Autenticación ---

    /// `POST /auth/login`
    async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse>;

    /// `POST /auth/register`
    async fn register_customer(&self, registration: &RegisterRequest) -> ApiResult<()>;

    /// `POST /mechanics/register`
    async fn register_mechanic(&self, registration: &MechanicRegisterRequest) -> ApiResult<()>;
}
