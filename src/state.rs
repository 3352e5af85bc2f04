//! Contexto de sesión compartido
//!
//! Identidad autenticada (usuario, rol, bearer token) con ciclo de vida
//! explícito: se puebla en login, se persiste en disco para sobrevivir a
//! reinicios y se limpia en logout o ante un 401 del backend. Se inyecta
//! como handle clonable en el cliente HTTP y en los dashboards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use crate::models::auth::{LoginResponse, UserRole};
use crate::utils::errors::{ApiError, ApiResult};
use crate::utils::jwt::read_claims;

/// Sesión autenticada
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: UserRole,
    pub user_id: Option<i64>,
    /// `sub` del token (normalmente el email)
    pub subject: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Construir la sesión a partir de la respuesta de login; el rol explícito
    /// de la respuesta tiene prioridad sobre el claim del token.
    pub fn from_login(response: &LoginResponse) -> ApiResult<Self> {
        let claims = read_claims(&response.token)?;
        let role = response
            .role
            .as_deref()
            .and_then(UserRole::parse)
            .or_else(|| claims.role.as_deref().and_then(UserRole::parse))
            .ok_or_else(|| ApiError::Session("Login response carries no known role".to_string()))?;

        Ok(Self {
            token: response.token.clone(),
            role,
            user_id: response.user_id,
            subject: claims.sub.clone(),
            expires_at: claims.expires_at(),
        })
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |exp| Utc::now() > exp)
    }
}

#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store_path: Option<PathBuf>,
    auth_state: Arc<watch::Sender<bool>>,
}

impl SessionContext {
    /// Contexto vacío, sin persistencia
    pub fn in_memory() -> Self {
        Self::build(None, None)
    }

    /// Contexto persistido en `path`; restaura la sesión guardada si sigue vigente
    pub fn restore(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let restored = match load_session(&path) {
            Ok(Some(session)) if !session.is_expired() => {
                log::info!("🔑 Sesión restaurada para '{}' ({})", session.subject, session.role.as_str());
                Some(session)
            }
            Ok(Some(session)) => {
                log::info!("⏰ Sesión guardada expirada para '{}', se descarta", session.subject);
                remove_session_file(&path);
                None
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("⚠️ Archivo de sesión ilegible ({}), se ignora: {}", path.display(), e);
                None
            }
        };
        Self::build(Some(path), restored)
    }

    fn build(store_path: Option<PathBuf>, session: Option<Session>) -> Self {
        let (tx, _rx) = watch::channel(session.is_some());
        Self {
            current: Arc::new(RwLock::new(session)),
            store_path,
            auth_state: Arc::new(tx),
        }
    }

    /// Poblar la sesión (login)
    pub async fn establish(&self, session: Session) -> ApiResult<()> {
        if let Some(path) = &self.store_path {
            save_session(path, &session)?;
        }
        log::info!("💾 Sesión establecida para '{}' ({})", session.subject, session.role.as_str());
        *self.current.write().await = Some(session);
        self.auth_state.send_replace(true);
        Ok(())
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn role(&self) -> Option<UserRole> {
        self.current.read().await.as_ref().map(|s| s.role)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .await
            .as_ref()
            .map_or(false, |s| !s.is_expired())
    }

    /// Logout explícito
    pub async fn logout(&self) {
        self.teardown("logout").await;
    }

    /// Teardown global ante un 401 del backend
    pub async fn invalidate(&self, reason: &str) {
        self.teardown(reason).await;
    }

    async fn teardown(&self, reason: &str) {
        let previous = self.current.write().await.take();
        if let Some(path) = &self.store_path {
            remove_session_file(path);
        }
        if let Some(session) = previous {
            log::warn!("🚪 Sesión de '{}' cerrada: {}", session.subject, reason);
        }
        self.auth_state.send_replace(false);
    }

    /// Observar el estado autenticado (false = volver al login)
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.auth_state.subscribe()
    }
}

fn load_session(path: &Path) -> ApiResult<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ApiError::Session(format!("Cannot read {}: {}", path.display(), e)))?;
    Ok(Some(serde_json::from_str(&raw)?))
}

fn save_session(path: &Path, session: &Session) -> ApiResult<()> {
    let raw = serde_json::to_string_pretty(session)?;
    std::fs::write(path, raw)
        .map_err(|e| ApiError::Session(format!("Cannot write {}: {}", path.display(), e)))
}

fn remove_session_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("⚠️ No se pudo borrar {}: {}", path.display(), e);
        }
    }
}
