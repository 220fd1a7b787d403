use axum::{
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    credentials::{resolve_auth_with, Secrets},
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::providers::CatalogProvider,
};

pub mod catalog;
pub mod profile;
pub mod recommendations;

/// Request header carrying a TMDB v4 access token
pub const ACCESS_TOKEN_HEADER: &str = "x-tmdb-access-token";
/// Request header carrying a TMDB v3 API key
pub const API_KEY_HEADER: &str = "x-tmdb-api-key";

/// Looks up a credential variable, normally in the process environment
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Shared application state
pub struct AppState {
    pub config: Config,
    /// Unauthenticated catalog; handlers derive a per-request copy with credentials
    pub catalog: Arc<dyn CatalogProvider>,
    pub secrets: Secrets,
    env: EnvLookup,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<dyn CatalogProvider>, secrets: Secrets) -> Self {
        Self {
            config,
            catalog,
            secrets,
            env: Arc::new(|var: &str| std::env::var(var).ok()),
        }
    }

    /// Replaces the environment lookup used as the last credential fallback
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Catalog authenticated with the credentials resolved for this request
    pub fn catalog_for(&self, headers: &HeaderMap) -> AppResult<Arc<dyn CatalogProvider>> {
        let auth = resolve_auth_with(
            header_value(headers, ACCESS_TOKEN_HEADER),
            header_value(headers, API_KEY_HEADER),
            &self.secrets,
            |var| (self.env)(var),
        )
        .ok_or_else(|| {
            AppError::MissingCredentials(
                "Provide a TMDB access token or API key".to_string(),
            )
        })?;

        tracing::debug!(auth = ?auth, "Resolved TMDB credentials");
        Ok(self.catalog.with_auth(auth))
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/moods", get(catalog::list_moods))
        .route("/regions", get(catalog::list_regions))
        .route("/survey", get(profile::survey))
        .route("/profile", post(profile::assess))
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
