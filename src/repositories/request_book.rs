//! Lista en memoria de solicitudes indexada por `requestId`
//!
//! Es el único recurso mutable compartido de un dashboard. Sólo se modifica
//! por reemplazo completo o por merge de un elemento por identidad, nunca
//! por posición, de modo que respuestas que llegan en cualquier orden no
//! corrompen el estado.

use std::collections::HashMap;

use crate::models::ServiceRequest;

#[derive(Debug, Default, Clone)]
pub struct RequestBook {
    by_id: HashMap<i64, ServiceRequest>,
}

impl RequestBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_requests(requests: Vec<ServiceRequest>) -> Self {
        let mut book = Self::new();
        book.replace_all(requests);
        book
    }

    /// Reemplazo completo (recarga)
    pub fn replace_all(&mut self, requests: Vec<ServiceRequest>) {
        self.by_id = requests.into_iter().map(|r| (r.id, r)).collect();
    }

    /// Merge de un elemento por identidad
    pub fn upsert(&mut self, request: ServiceRequest) {
        self.by_id.insert(request.id, request);
    }

    /// Modificar una solicitud existente; devuelve la versión resultante
    pub fn update<F>(&mut self, request_id: i64, apply: F) -> Option<ServiceRequest>
    where
        F: FnOnce(&mut ServiceRequest),
    {
        let request = self.by_id.get_mut(&request_id)?;
        apply(request);
        Some(request.clone())
    }

    pub fn get(&self, request_id: i64) -> Option<&ServiceRequest> {
        self.by_id.get(&request_id)
    }

    pub fn contains(&self, request_id: i64) -> bool {
        self.by_id.contains_key(&request_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Más recientes primero (createdAt descendente, luego id descendente)
    pub fn ordered(&self) -> Vec<&ServiceRequest> {
        let mut requests: Vec<&ServiceRequest> = self.by_id.values().collect();
        sort_newest_first(&mut requests);
        requests
    }
}

pub(crate) fn sort_newest_first<R: std::borrow::Borrow<ServiceRequest>>(requests: &mut [R]) {
    requests.sort_by(|a, b| {
        let (a, b): (&ServiceRequest, &ServiceRequest) = (a.borrow(), b.borrow());
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
