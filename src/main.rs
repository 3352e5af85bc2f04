use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use roadside_assist_client::controllers::{
    AdminDashboardController, CustomerDashboardController, MechanicDashboardController,
};
use roadside_assist_client::dto::LoadState;
use roadside_assist_client::models::UserRole;
use roadside_assist_client::services::{AuthService, GeocodingService};
use roadside_assist_client::{EnvironmentConfig, RoadsideApi, RoadsideApiClient, SessionContext};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env().context("configuración inválida")?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚨 Roadside Assist - cliente de operador");
    info!("================================================");
    info!("🌐 Backend: {} ({})", config.api_base_url, config.environment);

    let session = SessionContext::restore(&config.session_file);
    let client = RoadsideApiClient::new(&config, session.clone())?;
    let api: Arc<dyn RoadsideApi> = Arc::new(client);

    if !session.is_authenticated().await {
        let email = std::env::var("ROADSIDE_EMAIL").ok();
        let password = std::env::var("ROADSIDE_PASSWORD").ok();
        match (email, password) {
            (Some(email), Some(password)) => {
                let auth = AuthService::new(Arc::clone(&api), session.clone());
                auth.login(&email, &password).await.context("login fallido")?;
            }
            _ => {
                warn!("🔑 Sin sesión: definir ROADSIDE_EMAIL y ROADSIDE_PASSWORD");
                return Ok(());
            }
        }
    }

    let role = session.role().await.context("sesión sin rol")?;
    info!("👤 Dashboard para rol {}", role.as_str());

    match role {
        UserRole::Admin => show_admin(api).await,
        UserRole::Customer => show_customer(api, &config).await,
        UserRole::Mechanic => show_mechanic(api).await,
    }
}

fn ensure_ready(state: LoadState) -> Result<()> {
    match state {
        LoadState::Failed { message } => {
            error!("❌ No se pudo cargar el dashboard: {}", message);
            Err(anyhow::anyhow!(message))
        }
        _ => Ok(()),
    }
}

async fn show_admin(api: Arc<dyn RoadsideApi>) -> Result<()> {
    let dashboard = AdminDashboardController::new(api);
    ensure_ready(dashboard.load().await)?;

    info!("🧰 Pool de disponibles: {}", dashboard.pool_size().await);
    for row in dashboard.rows().await {
        info!(
            "#{} {} | {} | {} | mecánico: {}",
            row.request_id,
            row.problem_type,
            row.location,
            row.status_label,
            row.mechanic_name.as_deref().unwrap_or("-")
        );
        if let Some(empty) = row.empty_candidates_label() {
            info!("    {}", empty);
        }
        for candidate in &row.candidates {
            info!(
                "    -> {} ({}) {}",
                candidate.name,
                candidate.mechanic_id,
                candidate.distance.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}

async fn show_customer(api: Arc<dyn RoadsideApi>, config: &EnvironmentConfig) -> Result<()> {
    let mut dashboard = CustomerDashboardController::new(api);
    match GeocodingService::new(config) {
        Ok(geocoding) => dashboard = dashboard.with_geocoding(geocoding),
        Err(e) => warn!("⚠️ Geocoding deshabilitado: {}", e),
    }
    ensure_ready(dashboard.load().await)?;

    for row in dashboard.rows().await {
        info!(
            "#{} {} | {} | {} | pagar: {} | feedback: {}",
            row.request_id,
            row.problem_type,
            row.amount,
            row.status_label,
            row.actions.pay,
            row.feedback_label.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn show_mechanic(api: Arc<dyn RoadsideApi>) -> Result<()> {
    let dashboard = MechanicDashboardController::new(api);
    ensure_ready(dashboard.load().await)?;

    if let Some(profile) = dashboard.profile().await {
        info!("🔧 {} ({}) - {}", profile.name, profile.skill_type, profile.availability.as_str());
    }
    for row in dashboard.rows().await {
        info!(
            "#{} {} | {} | {} | {}",
            row.request_id,
            row.problem_type,
            row.location,
            row.status_label,
            row.navigate_url.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
