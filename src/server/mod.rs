//! HTTP API for the automation front end.

mod handlers;

use crate::components::automation::PortalDriver;
use crate::components::credentials::SecretStore;
use crate::config::Config;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use handlers::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Where the portal login is kept
    pub secrets: Arc<dyn SecretStore>,
    /// Browser session; held for the whole of an automation run
    pub driver: Arc<Mutex<Box<dyn PortalDriver>>>,
    /// Random source for every generated schedule
    pub rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    /// Build the shared state, seeding the random source from the config when asked to
    pub fn new(
        config: Config,
        secrets: Arc<dyn SecretStore>,
        driver: Box<dyn PortalDriver>,
    ) -> Self {
        let rng = match config.schedule_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        Self {
            config: Arc::new(config),
            secrets,
            driver: Arc::new(Mutex::new(driver)),
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/api/health", get(handlers::health_handler))
        .route("/api/schedule/generate", post(handlers::generate_handler))
        .route("/api/schedule/validate", post(handlers::validate_handler))
        .route("/api/credentials/save", post(handlers::save_credentials_handler))
        .route("/api/credentials/load", get(handlers::load_credentials_handler))
        .route("/api/credentials", delete(handlers::delete_credentials_handler))
        .route("/api/tasks/load", post(handlers::load_tasks_handler))
        .route("/api/automation/execute", post(handlers::execute_handler))
        .route("/api/automation/status", get(handlers::status_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
