//! Motor de resolución de mecánicos
//!
//! Dada una solicitud (tipo de problema + coordenadas opcionales), obtiene una
//! lista ordenada de mecánicos candidatos recorriendo una cadena explícita de
//! estrategias, de la más específica a la más degradada:
//!
//! 1. más cercanos por centro de servicio (requiere coordenadas)
//! 2. más cercanos sin tener en cuenta el centro (requiere coordenadas)
//! 3. disponibles por especialidad, sin ranking por distancia
//! 4. filtrado local del pool de mecánicos disponibles ya cargado
//!
//! La primera estrategia con resultado no vacío termina la cadena. Un error
//! en cualquier paso no es fatal: sólo dispara el siguiente.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{CandidateCache, CandidateCacheConfig, CandidateKey, CandidateScope};
use crate::clients::RoadsideApi;
use crate::models::{Mechanic, ProblemType, ServiceRequest, SkillType};
use crate::utils::errors::ApiError;

/// Especialidad requerida para un tipo de problema.
/// FUEL lo atienden mecánicos generales; un tipo desconocido se pasa tal cual.
pub fn required_skill_for(problem: &ProblemType) -> SkillType {
    match problem {
        ProblemType::Towing => SkillType::Towing,
        ProblemType::TireChange => SkillType::TireSpecialist,
        ProblemType::Battery => SkillType::BatteryExpert,
        ProblemType::Lockout => SkillType::Locksmith,
        ProblemType::Mechanic | ProblemType::Fuel => SkillType::GeneralMechanic,
        ProblemType::Other(raw) => {
            log::warn!("⚠️ Tipo de problema desconocido '{}', se usa como especialidad", raw);
            SkillType::from(raw.as_str())
        }
    }
}

/// Paso de la cadena de resolución
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStep {
    NearestByCenter,
    Nearest,
    AvailableBySkill,
    LocalPool,
}

impl ResolutionStep {
    pub const CHAIN: [ResolutionStep; 4] = [
        ResolutionStep::NearestByCenter,
        ResolutionStep::Nearest,
        ResolutionStep::AvailableBySkill,
        ResolutionStep::LocalPool,
    ];

    pub fn is_distance_aware(&self) -> bool {
        matches!(self, ResolutionStep::NearestByCenter | ResolutionStep::Nearest)
    }
}

/// Resultado de un paso
#[derive(Debug)]
pub enum StepOutcome {
    Found(Vec<Mechanic>),
    Empty,
    Unavailable(ApiError),
    Skipped,
}

impl From<Result<Vec<Mechanic>, ApiError>> for StepOutcome {
    fn from(result: Result<Vec<Mechanic>, ApiError>) -> Self {
        match result {
            Ok(list) if list.is_empty() => StepOutcome::Empty,
            Ok(list) => StepOutcome::Found(list),
            Err(e) => StepOutcome::Unavailable(e),
        }
    }
}

/// Lista de candidatos ya ordenada, con el paso que la produjo.
/// Vacía = "No skilled mechanics available" (no es un error).
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub mechanics: Vec<Mechanic>,
    pub source: Option<ResolutionStep>,
}

impl Resolution {
    pub fn empty() -> Self {
        Self {
            mechanics: Vec::new(),
            source: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mechanics.is_empty()
    }

    pub fn contains(&self, mechanic_id: i64) -> bool {
        self.mechanics.iter().any(|m| m.id == mechanic_id)
    }
}

/// Entrada de una resolución
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionQuery {
    pub problem_type: ProblemType,
    pub skill: SkillType,
    pub coordinates: Option<(f64, f64)>,
}

impl ResolutionQuery {
    pub fn for_request(request: &ServiceRequest) -> Self {
        Self::new(request.problem_type.clone(), request.coordinates())
    }

    pub fn new(problem_type: ProblemType, coordinates: Option<(f64, f64)>) -> Self {
        let skill = required_skill_for(&problem_type);
        Self {
            problem_type,
            skill,
            coordinates,
        }
    }
}

/// Orden total de candidatos: distancia ascendente, sin distancia al final,
/// empates por id ascendente.
pub fn compare_candidates(a: &Mechanic, b: &Mechanic) -> Ordering {
    let by_distance = match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_distance.then_with(|| a.id.cmp(&b.id))
}

/// Ordenar candidatos y descartar ids repetidos (se queda la primera aparición)
pub fn rank_candidates(mut mechanics: Vec<Mechanic>) -> Vec<Mechanic> {
    let mut seen = HashSet::new();
    mechanics.retain(|m| seen.insert(m.id));
    mechanics.sort_by(compare_candidates);
    mechanics
}

pub struct MechanicResolutionService {
    api: Arc<dyn RoadsideApi>,
    cache: RwLock<CandidateCache>,
}

impl MechanicResolutionService {
    pub fn new(api: Arc<dyn RoadsideApi>) -> Self {
        Self::with_cache_config(api, CandidateCacheConfig::default())
    }

    pub fn with_cache_config(api: Arc<dyn RoadsideApi>, config: CandidateCacheConfig) -> Self {
        Self {
            api,
            cache: RwLock::new(CandidateCache::new(config)),
        }
    }

    /// Resolver candidatos para una solicitud concreta, usando el cache por
    /// solicitud. `local_pool` es el pool de disponibles ya cargado (último recurso).
    pub async fn resolve_for_request(&self, request: &ServiceRequest, local_pool: &[Mechanic]) -> Resolution {
        let key = CandidateKey::for_request(request.problem_type.clone(), request.id);
        if let Some(cached) = self.cache.write().await.get(&key) {
            log::debug!("🗂️ Candidatos en cache para solicitud {}", request.id);
            return cached;
        }

        let resolution = self.resolve(&ResolutionQuery::for_request(request), local_pool).await;
        if !resolution.is_empty() {
            self.cache.write().await.store(key, resolution.clone());
        }
        resolution
    }

    /// Resolución general por tipo de problema (sin coordenadas). Alimenta la
    /// entrada de menor prioridad del cache para filas aún no resueltas.
    pub async fn resolve_for_problem(&self, problem_type: &ProblemType, local_pool: &[Mechanic]) -> Resolution {
        let key = CandidateKey::for_problem(problem_type.clone());
        if let Some(cached) = self.cache.write().await.get(&key) {
            return cached;
        }

        let resolution = self
            .resolve(&ResolutionQuery::new(problem_type.clone(), None), local_pool)
            .await;
        if !resolution.is_empty() {
            self.cache.write().await.store(key, resolution.clone());
        }
        resolution
    }

    /// Candidatos ya conocidos para una fila, sin tocar la red
    pub async fn cached_candidates(&self, request: &ServiceRequest) -> Option<(Resolution, CandidateScope)> {
        self.cache.write().await.lookup(&request.problem_type, request.id)
    }

    pub async fn forget_request(&self, request_id: i64) {
        self.cache.write().await.invalidate_request(request_id);
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Recorrer la cadena de estrategias hasta el primer resultado no vacío
    pub async fn resolve(&self, query: &ResolutionQuery, local_pool: &[Mechanic]) -> Resolution {
        log::info!(
            "🔍 Resolviendo mecánicos para {} (skill {}, coords {:?})",
            query.problem_type, query.skill, query.coordinates
        );

        for step in ResolutionStep::CHAIN {
            match self.run_step(step, query, local_pool).await {
                StepOutcome::Found(mechanics) => {
                    let ranked = rank_candidates(mechanics);
                    log::info!("✅ {} candidatos vía {:?}", ranked.len(), step);
                    return Resolution {
                        mechanics: ranked,
                        source: Some(step),
                    };
                }
                StepOutcome::Empty => {
                    log::debug!("📭 {:?} sin candidatos, siguiente paso", step);
                }
                StepOutcome::Skipped => {
                    log::debug!("⏭️ {:?} omitido", step);
                }
                StepOutcome::Unavailable(e) if e.is_unauthorized() => {
                    log::warn!("🔒 Sesión inválida durante la resolución, se aborta la cadena");
                    return Resolution::empty();
                }
                StepOutcome::Unavailable(e) => {
                    log::warn!("⚠️ {:?} no disponible ({}), siguiente paso", step, e);
                }
            }
        }

        log::info!("📭 No skilled mechanics available para {}", query.skill);
        Resolution::empty()
    }

    async fn run_step(&self, step: ResolutionStep, query: &ResolutionQuery, local_pool: &[Mechanic]) -> StepOutcome {
        match (step, query.coordinates) {
            (ResolutionStep::NearestByCenter, Some((lat, lng))) => self
                .api
                .nearest_mechanics_by_center(&query.skill, lat, lng)
                .await
                .into(),
            (ResolutionStep::Nearest, Some((lat, lng))) => {
                self.api.nearest_mechanics(&query.skill, lat, lng).await.into()
            }
            (ResolutionStep::NearestByCenter | ResolutionStep::Nearest, None) => StepOutcome::Skipped,
            (ResolutionStep::AvailableBySkill, _) => {
                self.api.available_mechanics_by_skill(&query.skill).await.into()
            }
            (ResolutionStep::LocalPool, _) => {
                let filtered: Vec<Mechanic> = local_pool
                    .iter()
                    .filter(|m| m.is_eligible_for(&query.skill))
                    .cloned()
                    .collect();
                if filtered.is_empty() {
                    StepOutcome::Empty
                } else {
                    StepOutcome::Found(filtered)
                }
            }
        }
    }
}
