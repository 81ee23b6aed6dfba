use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod error;
mod observability;
mod requirements;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::services::RequirementService;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn requirement_service(&self) -> &Arc<dyn RequirementService> {
        &self.shared.requirement_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = cors_layer(&state.config().server.cors_allowed_origins);

    Router::new()
        .route("/", get(system::root))
        .route("/api/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .nest("/api/require", requirement_router())
        .with_state(state)
        .layer(cors_layer)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn requirement_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(requirements::list_requirements).post(requirements::create_requirement),
        )
        .route(
            "/requirement/get-excel",
            get(requirements::export_requirements),
        )
        .route(
            "/requirement/updateAll",
            axum::routing::put(requirements::update_all_requirements),
        )
        .route(
            "/{id}",
            get(requirements::get_requirement)
                .put(requirements::update_requirement)
                .delete(requirements::delete_requirement),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::HEAD,
        Method::PUT,
        Method::POST,
        Method::DELETE,
    ];

    // Credentials cannot be combined with a wildcard origin.
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}
