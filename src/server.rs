//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CACHE_CONTROL, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api;
use crate::assets::AssetLoader;
use crate::models::AppConfig;
use crate::services::{AnalysisClient, InMemorySessionStore, SessionStore, TemplateService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionStore>,
    pub analyst: Arc<dyn AnalysisClient>,
    pub templates: Arc<TemplateService>,
    /// Whether an API key was resolved at startup. The server only starts
    /// once one has been, so this is recorded in each new session as true.
    pub credentials_present: bool,
}

/// Create application state from an asset loader and an analysis client.
///
/// The client carries the credential; it is built by the caller so tests
/// can substitute their own.
pub fn create_app_state(
    asset_loader: &AssetLoader,
    config: AppConfig,
    analyst: Arc<dyn AnalysisClient>,
) -> anyhow::Result<AppState> {
    let templates = TemplateService::new(asset_loader.clone())
        .map_err(|e| anyhow::anyhow!("Failed to load page templates: {e}"))?;

    let sessions = InMemorySessionStore::with_idle_timeout(config.session_idle_timeout());

    Ok(AppState {
        config: Arc::new(config),
        sessions: Arc::new(sessions),
        analyst,
        templates: Arc::new(templates),
        credentials_present: true,
    })
}

/// Build the router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
/// Every response carries `Cache-Control: no-store` since pages hold
/// patient data.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.upload.max_bytes;

    Router::new()
        // Page and form posts
        .route("/", get(api::show_page))
        .route("/patient", post(api::save_patient))
        .route("/xray", post(api::upload_xray))
        .route("/enhance", post(api::enhance))
        .route("/analysis", post(api::analyze))
        .route("/reset", post(api::reset))
        // JSON API
        .route("/api/enhance", post(api::enhance_image))
        .route("/api/prompt", post(api::build_prompt))
        .route("/api/analysis", post(api::analyze_image))
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state and tracing
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
