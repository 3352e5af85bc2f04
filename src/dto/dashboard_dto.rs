use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Mechanic, ServiceRequest};
use crate::services::lifecycle::{
    self, AdminActions, CustomerActions, FeedbackGate, LabelContext, MechanicActions,
};
use crate::services::mechanic_resolution_service::{Resolution, ResolutionStep};
use crate::utils::errors::ApiError;

// Estado de carga de un dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    Loading,
    Ready,
    Failed { message: String },
}

impl LoadState {
    pub fn failed(error: &ApiError) -> Self {
        LoadState::Failed {
            message: error.user_message(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

// Aviso descartable asociado (o no) a una fila
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub request_id: Option<i64>,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, request_id: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            request_id,
            message: message.into(),
        }
    }

    pub fn success(request_id: i64, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, Some(request_id), message)
    }

    pub fn info(request_id: Option<i64>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, request_id, message)
    }

    pub fn error(request_id: Option<i64>, error: &ApiError) -> Self {
        Self::new(NoticeLevel::Error, request_id, error.user_message())
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

// Opción del selector de mecánico
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateOption {
    pub mechanic_id: i64,
    pub name: String,
    pub skill: String,
    pub distance: Option<String>,
    pub rating: Option<f64>,
}

impl From<&Mechanic> for CandidateOption {
    fn from(mechanic: &Mechanic) -> Self {
        Self {
            mechanic_id: mechanic.id,
            name: mechanic.name.clone(),
            skill: mechanic.skill_type.to_string(),
            distance: mechanic.distance_label(),
            rating: mechanic.rating,
        }
    }
}

fn candidate_source_label(step: ResolutionStep) -> &'static str {
    match step {
        ResolutionStep::NearestByCenter => "Nearest (service center)",
        ResolutionStep::Nearest => "Nearest",
        ResolutionStep::AvailableBySkill => "Available",
        ResolutionStep::LocalPool => "Available (local)",
    }
}

fn mechanic_name(request: &ServiceRequest) -> Option<String> {
    match (&request.mechanic, request.mechanic_id) {
        (Some(mechanic), _) if !mechanic.name.is_empty() => Some(mechanic.name.clone()),
        (_, Some(id)) => Some(format!("Mechanic #{}", id)),
        (Some(mechanic), None) => Some(format!("Mechanic #{}", mechanic.id)),
        (None, None) => None,
    }
}

// Fila del dashboard admin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminRequestRow {
    pub request_id: i64,
    pub problem_type: String,
    pub location: String,
    pub customer_name: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub status: String,
    pub status_label: String,
    pub mechanic_name: Option<String>,
    pub actions: AdminActions,
    pub candidates: Vec<CandidateOption>,
    pub candidate_source: Option<String>,
    pub selected_mechanic: Option<i64>,
    pub assigning: bool,
}

impl AdminRequestRow {
    pub fn build(
        request: &ServiceRequest,
        candidates: Option<&Resolution>,
        selected_mechanic: Option<i64>,
        assigning: bool,
    ) -> Self {
        let actions = lifecycle::admin_actions(request);
        let (options, source) = match candidates {
            Some(resolution) if actions.assign => (
                resolution.mechanics.iter().map(CandidateOption::from).collect(),
                resolution.source.map(|s| candidate_source_label(s).to_string()),
            ),
            _ => (Vec::new(), None),
        };

        Self {
            request_id: request.id,
            problem_type: request.problem_type.to_string(),
            location: request.location.clone(),
            customer_name: request.customer_name.clone(),
            amount: request.amount,
            status: request.status.to_string(),
            status_label: lifecycle::status_label(&request.status, LabelContext::Admin),
            mechanic_name: mechanic_name(request),
            actions,
            candidates: options,
            candidate_source: source,
            selected_mechanic,
            assigning,
        }
    }

    /// Texto del selector cuando no hay candidatos
    pub fn empty_candidates_label(&self) -> Option<&'static str> {
        (self.actions.assign && self.candidates.is_empty()).then_some("No skilled mechanics available")
    }
}

// Fila del dashboard de cliente
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRequestRow {
    pub request_id: i64,
    pub problem_type: String,
    pub location: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub status: String,
    pub status_label: String,
    pub mechanic_name: Option<String>,
    pub actions: CustomerActions,
    pub feedback_label: Option<String>,
    /// Pago en vuelo: "Pay" deshabilitado hasta que responda el backend
    pub paying: bool,
    pub submitting_feedback: bool,
}

impl CustomerRequestRow {
    pub fn build(request: &ServiceRequest, actions: CustomerActions) -> Self {
        Self {
            request_id: request.id,
            problem_type: request.problem_type.to_string(),
            location: request.location.clone(),
            amount: request.amount,
            status: request.status.to_string(),
            status_label: lifecycle::status_label(&request.status, LabelContext::Customer),
            mechanic_name: mechanic_name(request),
            feedback_label: actions.feedback.label(),
            actions,
            paying: false,
            submitting_feedback: false,
        }
    }

    /// Marcar las acciones en vuelo; mientras duran, sus controles quedan deshabilitados
    pub fn in_flight(mut self, paying: bool, submitting_feedback: bool) -> Self {
        self.paying = paying;
        self.submitting_feedback = submitting_feedback;
        if paying {
            self.actions.pay = false;
        }
        self
    }

    pub fn shows_rate(&self) -> bool {
        self.actions.feedback == FeedbackGate::Rate && !self.submitting_feedback
    }
}

// Fila del dashboard de mecánico
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanicRequestRow {
    pub request_id: i64,
    pub problem_type: String,
    pub location: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub status: String,
    pub status_label: String,
    pub actions: MechanicActions,
    pub navigate_url: Option<String>,
    pub finishing: bool,
}

impl MechanicRequestRow {
    pub fn build(request: &ServiceRequest) -> Self {
        let actions = lifecycle::mechanic_actions(request);
        let navigate_url = if actions.navigate {
            crate::services::mechanic_service::navigation_url(request)
        } else {
            None
        };

        Self {
            request_id: request.id,
            problem_type: request.problem_type.to_string(),
            location: request.location.clone(),
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            amount: request.amount,
            status: request.status.to_string(),
            status_label: lifecycle::status_label(&request.status, LabelContext::Mechanic),
            actions,
            navigate_url,
            finishing: false,
        }
    }

    /// "Done" deshabilitado mientras el cierre del trabajo está en vuelo
    pub fn in_flight(mut self, finishing: bool) -> Self {
        self.finishing = finishing;
        if finishing {
            self.actions.done = false;
        }
        self
    }
}
