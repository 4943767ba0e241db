//! HTTP request handlers
//!
//! Implements the REST endpoints for catalog browsing, playlist management
//! and playback control.

use crate::api::AppState;
use crate::catalog::CatalogQuery;
use crate::error::Error;
use crate::playback::{PlaylistItemInfo, TransportSnapshot};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use omp_common::MediaItem;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    items: Vec<MediaItem>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    items: Vec<PlaylistItemInfo>,
    current_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    item_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct SkipRequest {
    delta_seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: u8, // 0-100 user-facing scale
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    volume: u8,
}

#[derive(Debug, Deserialize)]
pub struct MutedRequest {
    muted: bool,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    favorited: bool,
}

fn ok() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

fn error_response(e: Error) -> (StatusCode, Json<StatusResponse>) {
    let code = match &e {
        Error::NotInPlaylist(_) => StatusCode::NOT_FOUND,
        Error::OutOfRange { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        code,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

// ============================================================================
// Catalog Endpoints
// ============================================================================

/// GET /catalog - Query catalog items
pub async fn query_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogResponse> {
    let items = state.catalog.query(&query);
    info!("Catalog query matched {} items", items.len());
    Json(CatalogResponse {
        items: items.iter().map(|item| MediaItem::clone(item)).collect(),
    })
}

/// GET /catalog/categories - Distinct category labels
pub async fn get_categories(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.catalog.categories(query.kind),
    })
}

// ============================================================================
// Playlist Endpoints
// ============================================================================

/// GET /playlist - Current playlist contents and selection
pub async fn get_playlist(
    State(state): State<AppState>,
) -> Result<Json<PlaylistResponse>, (StatusCode, Json<StatusResponse>)> {
    let snapshot = state.player.snapshot().await.map_err(error_response)?;
    Ok(Json(playlist_view(snapshot)))
}

/// POST /playlist - Replace the playlist from a catalog query
pub async fn build_playlist(
    State(state): State<AppState>,
    Json(query): Json<CatalogQuery>,
) -> Result<Json<PlaylistResponse>, (StatusCode, Json<StatusResponse>)> {
    let items = state.catalog.query(&query);
    info!("Playlist rebuild request matched {} items", items.len());
    state.player.replace_playlist(items);

    // Queued behind the replacement, so this reflects the new playlist
    let snapshot = state.player.snapshot().await.map_err(error_response)?;
    Ok(Json(playlist_view(snapshot)))
}

/// POST /playlist/shuffle - Randomly reorder the playlist
pub async fn shuffle_playlist(
    State(state): State<AppState>,
) -> Result<Json<PlaylistResponse>, (StatusCode, Json<StatusResponse>)> {
    state.player.shuffle_playlist();
    let snapshot = state.player.snapshot().await.map_err(error_response)?;
    Ok(Json(playlist_view(snapshot)))
}

fn playlist_view(snapshot: TransportSnapshot) -> PlaylistResponse {
    PlaylistResponse {
        items: snapshot.playlist,
        current_index: snapshot.current_index,
    }
}

// ============================================================================
// Playback Control Endpoints
// ============================================================================

/// POST /playback/select - Select a playlist item and play it
pub async fn select(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<StatusResponse>)> {
    info!("Select request for {}", req.item_id);
    match state.player.select_and_play(req.item_id).await {
        Ok(()) => Ok(ok()),
        Err(e) => {
            error!("Select failed: {}", e);
            Err(error_response(e))
        }
    }
}

/// POST /playback/toggle - Toggle play/pause
pub async fn toggle(State(state): State<AppState>) -> Json<StatusResponse> {
    state.player.toggle_play_pause();
    ok()
}

/// POST /playback/next - Skip to the next item
pub async fn next(State(state): State<AppState>) -> Json<StatusResponse> {
    state.player.next();
    ok()
}

/// POST /playback/previous - Skip to the previous item
pub async fn previous(State(state): State<AppState>) -> Json<StatusResponse> {
    state.player.previous();
    ok()
}

/// POST /playback/seek - Seek to an absolute position
pub async fn seek(
    State(state): State<AppState>,
    Json(req): Json<SeekRequest>,
) -> Json<StatusResponse> {
    state.player.seek_to(req.seconds);
    ok()
}

/// POST /playback/skip - Seek relative to the current position
pub async fn skip(
    State(state): State<AppState>,
    Json(req): Json<SkipRequest>,
) -> Json<StatusResponse> {
    state.player.skip_by(req.delta_seconds);
    ok()
}

/// GET /playback/state - Full transport snapshot
pub async fn get_state(
    State(state): State<AppState>,
) -> Result<Json<TransportSnapshot>, (StatusCode, Json<StatusResponse>)> {
    match state.player.snapshot().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Snapshot failed: {}", e);
            Err(error_response(e))
        }
    }
}

/// POST /playback/activity - Pointer activity keeps controls visible
pub async fn pointer_activity(State(state): State<AppState>) -> Json<StatusResponse> {
    state.player.pointer_activity();
    ok()
}

// ============================================================================
// Volume Endpoints
// ============================================================================

/// GET /audio/volume - Current volume on the 0-100 scale
pub async fn get_volume(
    State(state): State<AppState>,
) -> Result<Json<VolumeResponse>, StatusCode> {
    match state.player.snapshot().await {
        Ok(snapshot) => Ok(Json(VolumeResponse {
            volume: snapshot.volume,
        })),
        Err(e) => {
            error!("Snapshot failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /audio/volume - Set volume level
pub async fn set_volume(
    State(state): State<AppState>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<VolumeResponse>, StatusCode> {
    // Validate range
    if req.volume > 100 {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Convert user scale (0-100) to internal scale (0.0-1.0)
    state.player.set_volume(req.volume as f32 / 100.0);
    info!("Volume set to {}%", req.volume);

    Ok(Json(VolumeResponse { volume: req.volume }))
}

/// POST /audio/muted - Set mute state
pub async fn set_muted(
    State(state): State<AppState>,
    Json(req): Json<MutedRequest>,
) -> Json<StatusResponse> {
    state.player.set_muted(req.muted);
    ok()
}

// ============================================================================
// Favorites Endpoint
// ============================================================================

/// POST /favorites/:item_id - Record a favorite toggle
pub async fn set_favorite(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<FavoriteRequest>,
) -> Json<StatusResponse> {
    info!("Favorite request: {} = {}", item_id, req.favorited);
    state.player.set_favorite(item_id, req.favorited);
    ok()
}
