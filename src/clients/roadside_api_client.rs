//! Cliente HTTP para el backend de asistencia en carretera
//!
//! Única interfaz de salida: adjunta el bearer token de la sesión a cada
//! petición, intercepta los 401 para cerrar la sesión, trata los listados
//! que no son arrays como vacíos y reintenta los GET ante fallos transitorios.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::roadside_api::RoadsideApi;
use crate::config::environment::EnvironmentConfig;
use crate::models::{
    Availability, CreateCenterRequest, Feedback, FeedbackRequest, LocationUpdate, LoginRequest,
    LoginResponse, Mechanic, MechanicRegisterRequest, NewServiceRequestBody, PaymentRecord,
    PaymentRequest, PaymentStatus, RegisterRequest, RequestStatus, ServiceCenter, ServiceRequest,
    SkillType,
};
use crate::state::SessionContext;
use crate::utils::errors::{http_error, ApiError, ApiResult};

/// Política de reintentos para GET idempotentes
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Backoff exponencial con jitter: base * 2^intento + [0, base)
    fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        if base_ms == 0 {
            return Duration::ZERO;
        }
        let exp = base_ms.saturating_mul(1u64 << attempt.min(6));
        let jitter = rand::thread_rng().gen_range(0..base_ms);
        Duration::from_millis(exp + jitter)
    }
}

impl From<&EnvironmentConfig> for RetryPolicy {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            max_retries: config.get_retry_attempts,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }
}

/// Cliente HTTP del backend REST (`/api`)
#[derive(Clone)]
pub struct RoadsideApiClient {
    client: Client,
    base_url: String,
    session: SessionContext,
    retry: RetryPolicy,
}

impl RoadsideApiClient {
    /// Crear nuevo cliente con la configuración de entorno
    pub fn new(config: &EnvironmentConfig, session: SessionContext) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(concat!("roadside-assist-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(
            client,
            config.api_base_url.clone(),
            session,
            RetryPolicy::from(config),
        ))
    }

    pub fn with_client(client: Client, base_url: String, session: SessionContext, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            retry,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Enviar una petición y devolver el cuerpo como texto.
    /// Un 401 cierra la sesión globalmente antes de devolver el error.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<String> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut builder = self
            .client
            .request(method.clone(), self.url(path))
            .header("Accept", "application/json")
            .header("X-Request-Id", &request_id);

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = self.session.token().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        log::debug!("🌐 {} {} ({})", method, path, request_id);
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("🔒 401 en {} {}, cerrando sesión", method, path);
            self.session.invalidate(&format!("401 from {} {}", method, path)).await;
            return Err(ApiError::Unauthorized(format!("{} {}", method, path)));
        }

        let text = response.text().await?;
        if !status.is_success() {
            log::debug!("📡 {} {} -> {}: {}", method, path, status, text);
            return Err(http_error(status.as_u16(), extract_message(&text)));
        }
        Ok(text)
    }

    /// GET con reintentos acotados para fallos transitorios
    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> ApiResult<String> {
        let mut attempt = 0;
        loop {
            match self.execute(Method::GET, path, query, None).await {
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    log::warn!(
                        "🔁 GET {} falló ({}), reintento {}/{} en {:?}",
                        path, e, attempt, self.retry.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Vec<T>> {
        let text = self.get_text(path, query).await?;
        parse_list(path, &text)
    }

    async fn get_one<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let text = self.get_text(path, &[]).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn patch(&self, path: &str, query: &[(&str, String)], body: Option<Value>) -> ApiResult<()> {
        self.execute(Method::PATCH, path, query, body.as_ref()).await.map(|_| ())
    }

    async fn post<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<String> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, &[], Some(&body)).await
    }
}

/// Un listado que no es array (null, objeto, cuerpo vacío) se trata como vacío
fn parse_list<T: DeserializeOwned>(path: &str, text: &str) -> ApiResult<Vec<T>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
        other => {
            log::debug!("📄 {} devolvió un no-array ({}), se trata como vacío", path, json_kind(&other));
            Ok(Vec::new())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Mensaje legible del cuerpo de error (`{"message": ...}` o texto plano)
fn extract_message(text: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        for key in ["message", "error", "detail"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    text.chars().take(200).collect()
}

fn skill_segment(skill: &SkillType) -> String {
    urlencoding::encode(skill.as_str()).into_owned()
}

fn coordinates_query(latitude: f64, longitude: f64) -> [(&'static str, String); 2] {
    [("latitude", latitude.to_string()), ("longitude", longitude.to_string())]
}

#[async_trait]
impl RoadsideApi for RoadsideApiClient {
    async fn my_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        self.get_list("/requests/me", &[]).await
    }

    async fn create_request(&self, body: &NewServiceRequestBody) -> ApiResult<ServiceRequest> {
        let text = self.post("/requests", body).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn admin_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        self.get_list("/admin/requests", &[]).await
    }

    async fn update_request_status(&self, request_id: i64, status: &RequestStatus) -> ApiResult<()> {
        let path = format!("/requests/{}/status", request_id);
        self.patch(&path, &[("status", status.as_str().to_string())], None).await
    }

    async fn all_mechanics(&self) -> ApiResult<Vec<Mechanic>> {
        self.get_list("/admin/mechanics", &[]).await
    }

    async fn available_mechanics(&self) -> ApiResult<Vec<Mechanic>> {
        self.get_list("/admin/mechanics/available", &[]).await
    }

    async fn available_mechanics_by_skill(&self, skill: &SkillType) -> ApiResult<Vec<Mechanic>> {
        let path = format!("/admin/mechanics/available/skill/{}", skill_segment(skill));
        self.get_list(&path, &[]).await
    }

    async fn nearest_mechanics_by_center(
        &self,
        skill: &SkillType,
        latitude: f64,
        longitude: f64,
    ) -> ApiResult<Vec<Mechanic>> {
        let path = format!("/admin/mechanics/available/skill/{}/nearest/by-center", skill_segment(skill));
        self.get_list(&path, &coordinates_query(latitude, longitude)).await
    }

    async fn nearest_mechanics(&self, skill: &SkillType, latitude: f64, longitude: f64) -> ApiResult<Vec<Mechanic>> {
        let path = format!("/admin/mechanics/available/skill/{}/nearest", skill_segment(skill));
        self.get_list(&path, &coordinates_query(latitude, longitude)).await
    }

    async fn assign_mechanic(&self, request_id: i64, mechanic_id: i64) -> ApiResult<()> {
        let query = [
            ("requestId", request_id.to_string()),
            ("mechanicId", mechanic_id.to_string()),
        ];
        self.patch("/admin/assign", &query, None).await
    }

    async fn verify_mechanic(&self, mechanic_id: i64) -> ApiResult<()> {
        self.patch(&format!("/admin/mechanics/{}/verify", mechanic_id), &[], None).await
    }

    async fn payment_status(&self, request_id: i64) -> ApiResult<PaymentStatus> {
        self.get_one(&format!("/requests/{}/payment-status", request_id)).await
    }

    async fn create_payment(&self, payment: &PaymentRequest) -> ApiResult<PaymentRecord> {
        let text = self.post("/payments", payment).await?;
        if text.trim().is_empty() {
            return Ok(PaymentRecord::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> ApiResult<()> {
        self.post("/feedback", feedback).await.map(|_| ())
    }

    async fn feedback_for_request(&self, request_id: i64) -> ApiResult<Option<Feedback>> {
        let path = format!("/feedback/request/{}", request_id);
        let text = match self.get_text(&path, &[]).await {
            Ok(text) => text,
            Err(ApiError::Http { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        // El backend puede devolver el objeto, un array o null
        match serde_json::from_str::<Value>(&text)? {
            Value::Null => Ok(None),
            Value::Array(items) => match items.into_iter().next() {
                Some(first) => Ok(Some(serde_json::from_value(first)?)),
                None => Ok(None),
            },
            other => Ok(Some(serde_json::from_value(other)?)),
        }
    }

    async fn mechanic_feedback(&self, mechanic_id: i64) -> ApiResult<Vec<Feedback>> {
        self.get_list(&format!("/admin/feedback/mechanic/{}", mechanic_id), &[]).await
    }

    async fn update_availability(&self, availability: Availability) -> ApiResult<()> {
        self.patch(
            "/mechanics/availability",
            &[("status", availability.as_str().to_string())],
            None,
        )
        .await
    }

    async fn update_location(&self, location: LocationUpdate) -> ApiResult<()> {
        self.patch("/mechanics/location", &[], Some(serde_json::to_value(location)?)).await
    }

    async fn mechanic_requests(&self) -> ApiResult<Vec<ServiceRequest>> {
        self.get_list("/mechanics/my-requests", &[]).await
    }

    async fn mechanic_profile(&self) -> ApiResult<Mechanic> {
        self.get_one("/mechanics/me").await
    }

    async fn centers(&self) -> ApiResult<Vec<ServiceCenter>> {
        self.get_list("/centers", &[]).await
    }

    async fn create_center(&self, center: &CreateCenterRequest) -> ApiResult<ServiceCenter> {
        let text = self.post("/centers", center).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn assign_center(&self, mechanic_email: &str, center_id: i64) -> ApiResult<()> {
        let query = [
            ("email", mechanic_email.to_string()),
            ("centerId", center_id.to_string()),
        ];
        self.patch("/mechanics/assign-center", &query, None).await
    }

    async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        let text = self.post("/auth/login", credentials).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn register_customer(&self, registration: &RegisterRequest) -> ApiResult<()> {
        self.post("/auth/register", registration).await.map(|_| ())
    }

    async fn register_mechanic(&self, registration: &MechanicRegisterRequest) -> ApiResult<()> {
        self.post("/mechanics/register", registration).await.map(|_| ())
    }
}
