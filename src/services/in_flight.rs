//! Marcador de acciones en vuelo por solicitud
//!
//! Un `InFlight` es el conjunto de solicitudes con una mutación en curso
//! (asignar, pagar, calificar, terminar). Se adquiere antes de leer el estado
//! local y de llamar a la red; el guard lo libera al soltarse, también si el
//! future se abandona.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<i64>>>,
}

/// Marcador de una solicitud; se libera al soltarse
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<i64>>>,
    request_id: i64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.ids).remove(&self.request_id);
    }
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` si ya hay una acción en vuelo para la solicitud
    pub fn try_acquire(&self, request_id: i64) -> Option<InFlightGuard> {
        if !lock(&self.ids).insert(request_id) {
            return None;
        }
        Some(InFlightGuard {
            ids: Arc::clone(&self.ids),
            request_id,
        })
    }

    pub fn contains(&self, request_id: i64) -> bool {
        lock(&self.ids).contains(&request_id)
    }
}

// Un panic con el lock tomado no deja el conjunto en estado inconsistente
fn lock(ids: &Mutex<HashSet<i64>>) -> MutexGuard<'_, HashSet<i64>> {
    ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let in_flight = InFlight::new();
        let guard = in_flight.try_acquire(10).unwrap();
        assert!(in_flight.contains(10));
        assert!(in_flight.try_acquire(10).is_none());
        assert!(in_flight.try_acquire(11).is_some());
        drop(guard);
        assert!(!in_flight.contains(10));
        assert!(in_flight.try_acquire(10).is_some());
    }

    #[test]
    fn test_clones_share_the_same_set() {
        let in_flight = InFlight::new();
        let shared = in_flight.clone();
        let _guard = in_flight.try_acquire(3).unwrap();
        assert!(shared.contains(3));
        assert!(shared.try_acquire(3).is_none());
    }
}
