//! Máquina de estados del ciclo de vida de una solicitud
//!
//! ```text
//! CREATED --asignar--> IN_PROGRESS --terminar--> PAYMENT_PENDING --pagar--> PAID --(backend)--> COMPLETED
//!    \__________________ cancelar (admin, desde cualquier estado no terminal) ____________/--> CANCELLED
//! ```
//!
//! También reúne las reglas de habilitación de acciones (pagar, calificar,
//! navegar, terminar, asignar, cancelar) y las etiquetas de estado por contexto.
//! Todo es puro: ninguna función toca la red.

use serde::Serialize;

use crate::models::{PaymentStatus, RequestStatus, ServiceRequest};
use crate::utils::errors::{ApiError, ApiResult};

/// Evento que dispara una transición
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    AssignMechanic,
    MarkDone,
    Pay,
    SubmitFeedback,
    Cancel,
    /// Cierre hecho por el backend tras el pago
    Complete,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::AssignMechanic => "assign",
            LifecycleEvent::MarkDone => "mark done",
            LifecycleEvent::Pay => "pay",
            LifecycleEvent::SubmitFeedback => "rate",
            LifecycleEvent::Cancel => "cancel",
            LifecycleEvent::Complete => "complete",
        }
    }
}

pub fn is_terminal(status: &RequestStatus) -> bool {
    matches!(status, RequestStatus::Cancelled | RequestStatus::Completed)
}

pub fn is_active_job(status: &RequestStatus) -> bool {
    matches!(status, RequestStatus::InProgress | RequestStatus::Assigned)
}

pub fn is_payment_settled(status: &RequestStatus) -> bool {
    matches!(status, RequestStatus::Paid | RequestStatus::Completed)
}

/// Estado siguiente para `event`, o error si la transición no existe
pub fn transition(from: &RequestStatus, event: LifecycleEvent) -> ApiResult<RequestStatus> {
    use RequestStatus as S;

    let next = match (from, event) {
        (S::Created, LifecycleEvent::AssignMechanic) => Some(S::InProgress),
        (S::InProgress | S::Assigned, LifecycleEvent::MarkDone) => Some(S::PaymentPending),
        (S::PaymentPending, LifecycleEvent::Pay) => Some(S::Paid),
        (S::Paid | S::Completed, LifecycleEvent::SubmitFeedback) => Some(from.clone()),
        (S::Paid, LifecycleEvent::Complete) => Some(S::Completed),
        (status, LifecycleEvent::Cancel) if !is_terminal(status) => Some(S::Cancelled),
        _ => None,
    };

    next.ok_or_else(|| ApiError::InvalidTransition {
        from: from.as_str().to_string(),
        event: event.as_str().to_string(),
    })
}

/// Contexto de la etiqueta de estado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelContext {
    Admin,
    Customer,
    Mechanic,
}

/// Etiqueta legible del estado; pura y determinista por contexto
pub fn status_label(status: &RequestStatus, context: LabelContext) -> String {
    use RequestStatus as S;

    let label = match (context, status) {
        (LabelContext::Admin, S::Created) => "Unassigned",
        (LabelContext::Customer, S::Created) => "Request Received",
        (LabelContext::Mechanic, S::Created) => "New",
        (LabelContext::Customer, S::Assigned | S::InProgress) => "Mechanic On The Way",
        (LabelContext::Mechanic, S::Assigned | S::InProgress) => "In Progress",
        (LabelContext::Mechanic, S::PaymentPending) => "Awaiting Payment",
        (_, S::Assigned) => "Assigned",
        (_, S::InProgress) => "In Progress",
        (_, S::PaymentPending) => "Payment Pending",
        (_, S::Paid) => "Paid",
        (_, S::Completed) => "Completed",
        (_, S::Cancelled) => "Cancelled",
        (_, S::Other(raw)) => return title_case(raw),
    };
    label.to_string()
}

fn title_case(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Estado de la acción "calificar" de una fila
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedbackGate {
    Hidden,
    Rate,
    Rated(u8),
}

impl FeedbackGate {
    pub fn label(&self) -> Option<String> {
        match self {
            FeedbackGate::Hidden => None,
            FeedbackGate::Rate => Some("Rate".to_string()),
            FeedbackGate::Rated(rating) => Some(format!("{} / 5", rating)),
        }
    }
}

/// Una calificación ya registrada se muestra siempre; si no, "Rate" sólo tras el pago
pub fn feedback_gate(status: &RequestStatus, existing_rating: Option<u8>) -> FeedbackGate {
    match existing_rating {
        Some(rating) => FeedbackGate::Rated(rating),
        None if is_payment_settled(status) => FeedbackGate::Rate,
        None => FeedbackGate::Hidden,
    }
}

/// "Pay": estado exactamente PAYMENT_PENDING y sin pago previo. La consulta de
/// estado de pago manda cuando existe; si falló, se infiere del estado.
pub fn can_pay(status: &RequestStatus, payment_lookup: Option<&PaymentStatus>) -> bool {
    if *status != RequestStatus::PaymentPending {
        return false;
    }
    match payment_lookup {
        Some(lookup) => lookup.can_pay && !lookup.is_paid,
        None => true,
    }
}

/// "Navigate" / "Done" del mecánico
pub fn can_work_on(status: &RequestStatus) -> bool {
    is_active_job(status)
}

/// Controles de asignación habilitados sólo mientras no hay mecánico y el estado es CREATED
pub fn can_assign(request: &ServiceRequest) -> bool {
    !request.has_mechanic() && request.status == RequestStatus::Created
}

pub fn can_cancel(status: &RequestStatus) -> bool {
    !is_terminal(status)
}

/// Acciones visibles para el cliente
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerActions {
    pub pay: bool,
    pub feedback: FeedbackGate,
}

pub fn customer_actions(
    request: &ServiceRequest,
    payment_lookup: Option<&PaymentStatus>,
    existing_rating: Option<u8>,
) -> CustomerActions {
    CustomerActions {
        pay: can_pay(&request.status, payment_lookup),
        feedback: feedback_gate(&request.status, existing_rating),
    }
}

/// Acciones visibles para el admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminActions {
    pub assign: bool,
    pub cancel: bool,
}

pub fn admin_actions(request: &ServiceRequest) -> AdminActions {
    AdminActions {
        assign: can_assign(request),
        cancel: can_cancel(&request.status),
    }
}

/// Acciones visibles para el mecánico
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MechanicActions {
    pub navigate: bool,
    pub done: bool,
}

pub fn mechanic_actions(request: &ServiceRequest) -> MechanicActions {
    let active = can_work_on(&request.status);
    MechanicActions {
        navigate: active,
        done: active,
    }
}
