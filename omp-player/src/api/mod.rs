//! REST + SSE control surface
//!
//! Exposes the playback engine and catalog over HTTP for the cabin UI.

pub mod handlers;
pub mod sse;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::catalog::CatalogProvider;
use crate::playback::Player;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the playback engine task
    pub player: Player,
    /// Media catalog backing playlist construction
    pub catalog: Arc<dyn CatalogProvider>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no prefix for health endpoint)
        .route("/health", get(health_check))
        // API v1 routes
        .nest(
            "/api/v1",
            Router::new()
                // Catalog browsing
                .route("/catalog", get(handlers::query_catalog))
                .route("/catalog/categories", get(handlers::get_categories))
                // Playlist management
                .route("/playlist", get(handlers::get_playlist))
                .route("/playlist", post(handlers::build_playlist))
                .route("/playlist/shuffle", post(handlers::shuffle_playlist))
                // Playback control
                .route("/playback/select", post(handlers::select))
                .route("/playback/toggle", post(handlers::toggle))
                .route("/playback/next", post(handlers::next))
                .route("/playback/previous", post(handlers::previous))
                .route("/playback/seek", post(handlers::seek))
                .route("/playback/skip", post(handlers::skip))
                .route("/playback/state", get(handlers::get_state))
                .route("/playback/activity", post(handlers::pointer_activity))
                // Volume and mute
                .route("/audio/volume", get(handlers::get_volume))
                .route("/audio/volume", post(handlers::set_volume))
                .route("/audio/muted", post(handlers::set_muted))
                // Favorites
                .route("/favorites/:item_id", post(handlers::set_favorite))
                // SSE events
                .route("/events", get(sse::event_stream)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "omp-player",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port,
    }))
}
