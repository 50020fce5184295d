//! API server: application state, router, and startup.

use crate::api::handlers::{creators, pages, subscriptions};
use crate::ledger::CreatorLedger;
use crate::publication::PublicationEngine;
use anyhow::Result;
use axum::{
    http::Method,
    response::Json,
    routing::{get, post, put},
    Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared by every handler. The ledger and the
/// publication engine are constructed at startup and injected here; no
/// handler reaches for globals.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn CreatorLedger>,
    pub publications: Arc<PublicationEngine>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn CreatorLedger>) -> Self {
        Self {
            publications: Arc::new(PublicationEngine::new(ledger.clone())),
            ledger,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// API Router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Creator endpoints
        .route("/api/claim-handle", post(creators::claim_handle))
        .route("/api/dashboard/:address", get(creators::dashboard))
        .route("/api/preferences", put(creators::update_preferences))
        .route("/api/preferences/:handle", get(pages::preferences_by_handle))
        .route("/api/preview", post(pages::preview))
        // Publication endpoint
        .route(
            "/api/create-subscription",
            post(subscriptions::create_subscription),
        )
        // Public landing page
        .route("/:handle", get(pages::handle_page))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers(Any),
        )
        .with_state(state)
}

// Server startup
pub async fn start_api_server(port: u16, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Conecto API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
