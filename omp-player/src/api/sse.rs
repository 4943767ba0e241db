//! Server-Sent Events (SSE) broadcaster
//!
//! Streams real-time player events to connected clients. Each connection
//! opens with one `state` event carrying the full transport snapshot so a
//! late-joining UI can render immediately, then follows the live stream.

use crate::api::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// GET /events - SSE event stream
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    // Subscribe before taking the snapshot so nothing falls in the gap
    let rx = state.player.subscribe();

    let initial = match state.player.snapshot().await {
        Ok(snapshot) => match serde_json::to_string(&snapshot) {
            Ok(json) => Some(Ok(Event::default().event("state").data(json))),
            Err(e) => {
                warn!("Failed to serialize snapshot: {}", e);
                None
            }
        },
        Err(e) => {
            warn!("Snapshot for SSE client failed: {}", e);
            None
        }
    };

    // Convert broadcast receiver to stream
    let live = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => {
                    debug!("Broadcasting SSE event: {}", event.name());
                    Some(Ok(Event::default().event(event.name()).data(json)))
                }
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                // BroadcastStream error (lagged or closed)
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    let stream = stream::iter(initial).chain(live);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
