//! Cache de candidatos por solicitud
//!
//! Guarda el resultado de la resolución de mecánicos por `(problemType, requestId)`
//! para que los resultados por distancia de una solicitud no se filtren a otra
//! con el mismo tipo de problema. La entrada sin `requestId` (sólo por tipo de
//! problema) es una fuente de menor prioridad para filas aún no resueltas.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::ProblemType;
use crate::services::mechanic_resolution_service::Resolution;

/// Clave del cache de candidatos
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateKey {
    pub problem_type: ProblemType,
    pub request_id: Option<i64>,
}

impl CandidateKey {
    pub fn for_request(problem_type: ProblemType, request_id: i64) -> Self {
        Self {
            problem_type,
            request_id: Some(request_id),
        }
    }

    pub fn for_problem(problem_type: ProblemType) -> Self {
        Self {
            problem_type,
            request_id: None,
        }
    }
}

/// Alcance de una entrada encontrada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateScope {
    PerRequest,
    ProblemWide,
}

/// Configuración del cache
#[derive(Debug, Clone)]
pub struct CandidateCacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CandidateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300), // 5 minutos
            max_entries: 500,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedResolution {
    resolution: Resolution,
    stored_at: Instant,
}

/// Estadísticas del cache
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CandidateCacheStats {
    pub hits: u64,
    pub fallback_hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub evicted: u64,
}

#[derive(Debug)]
pub struct CandidateCache {
    entries: HashMap<CandidateKey, CachedResolution>,
    config: CandidateCacheConfig,
    stats: CandidateCacheStats,
}

impl CandidateCache {
    pub fn new(config: CandidateCacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            stats: CandidateCacheStats::default(),
        }
    }

    /// Buscar candidatos para una fila: primero la entrada de la solicitud,
    /// luego la entrada general del tipo de problema.
    pub fn lookup(&mut self, problem_type: &ProblemType, request_id: i64) -> Option<(Resolution, CandidateScope)> {
        let per_request = CandidateKey::for_request(problem_type.clone(), request_id);
        if let Some(resolution) = self.get_fresh(&per_request) {
            self.stats.hits += 1;
            return Some((resolution, CandidateScope::PerRequest));
        }

        let bare = CandidateKey::for_problem(problem_type.clone());
        if let Some(resolution) = self.get_fresh(&bare) {
            self.stats.fallback_hits += 1;
            return Some((resolution, CandidateScope::ProblemWide));
        }

        self.stats.misses += 1;
        None
    }

    /// Entrada exacta, sin fallback
    pub fn get(&mut self, key: &CandidateKey) -> Option<Resolution> {
        self.get_fresh(key)
    }

    fn get_fresh(&mut self, key: &CandidateKey) -> Option<Resolution> {
        let expired = match self.entries.get(key) {
            Some(cached) if cached.stored_at.elapsed() <= self.config.ttl => {
                return Some(cached.resolution.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
            self.stats.expired += 1;
            log::debug!("⏰ Candidatos expirados para {:?}", key);
        }
        None
    }

    pub fn store(&mut self, key: CandidateKey, resolution: Resolution) {
        if self.entries.len() >= self.config.max_entries && !self.entries.contains_key(&key) {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CachedResolution {
                resolution,
                stored_at: Instant::now(),
            },
        );
    }

    /// Olvidar la entrada de una solicitud (p. ej. tras asignarla)
    pub fn invalidate_request(&mut self, request_id: i64) {
        self.entries.retain(|key, _| key.request_id != Some(request_id));
    }

    /// Olvidar todo (p. ej. tras recargar el pool de mecánicos)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CandidateCacheStats {
        &self.stats
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, cached)| cached.stored_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.evicted += 1;
        }
    }
}

impl Default for CandidateCache {
    fn default() -> Self {
        Self::new(CandidateCacheConfig::default())
    }
}
