//! Cache
//!
//! Este módulo contiene el cache en memoria de candidatos de asignación.

pub mod candidate_cache;

pub use candidate_cache::{CandidateCache, CandidateCacheConfig, CandidateKey, CandidateScope};
