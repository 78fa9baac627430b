//! HTTP API for model-config
//!
//! `/api/login` and `/api/health` are public. Every other route sits behind
//! the bearer middleware, which verifies the token and hands the caller's
//! name to the handler.

pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use middleware::{require_bearer, AuthUser};

use crate::config::Settings;
use crate::error::{ModelConfigError, ModelConfigResult};
use crate::storage::SheetStore;

/// Shared by every request
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn SheetStore>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn SheetStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
        }
    }
}

/// Build the full router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/initial-data", get(handlers::initial_data))
        .route("/api/row-values", get(handlers::row_values))
        .route("/api/update", post(handlers::update))
        .layer(axum_mw::from_fn_with_state(state.clone(), require_bearer));

    let public = Router::new()
        .route("/api/login", post(handlers::login))
        .route("/api/health", get(handlers::health));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, bind_addr: &str) -> ModelConfigResult<()> {
    let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
        ModelConfigError::Config(format!("Failed to bind {}: {}", bind_addr, e))
    })?;
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
