//! Playback history and favorites reporting
//!
//! Natural completions and favorite toggles are reported to an external
//! history service so "recently played" and favorites outlive the player
//! process. Reporting is fire-and-forget: a failed POST is logged and
//! dropped, never surfaced to the transport machine.

use chrono::{DateTime, Utc};
use omp_common::MediaKind;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// One finished-item record
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRecord {
    pub item_id: Uuid,
    pub title: String,
    pub kind: MediaKind,
    pub duration_played_secs: f64,
    pub completed_at: DateTime<Utc>,
}

/// One favorite/unfavorite toggle
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteRecord {
    pub item_id: Uuid,
    pub favorited: bool,
    pub marked_at: DateTime<Utc>,
}

/// Wire shape sent to the history endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum HistoryRecord {
    Completion(CompletionRecord),
    Favorite(FavoriteRecord),
}

/// Destination for history records
///
/// Both calls must return without blocking; the engine never retries.
pub trait HistorySink: Send + Sync {
    /// Record a natural completion
    fn record_completion(&self, record: CompletionRecord);

    /// Record a favorite toggle
    fn record_favorite(&self, record: FavoriteRecord);
}

/// Sink that POSTs each record to a configured HTTP endpoint
pub struct HttpHistorySink {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpHistorySink {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    fn post(&self, record: HistoryRecord) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            debug!("Posting history record to {}", endpoint);
            match client.post(&endpoint).json(&record).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    warn!("History endpoint {} returned {}", endpoint, resp.status());
                }
                Err(e) => {
                    warn!("Failed to post history record: {}", e);
                }
            }
        });
    }
}

impl HistorySink for HttpHistorySink {
    fn record_completion(&self, record: CompletionRecord) {
        self.post(HistoryRecord::Completion(record));
    }

    fn record_favorite(&self, record: FavoriteRecord) {
        self.post(HistoryRecord::Favorite(record));
    }
}

/// Sink that drops every record, used when no endpoint is configured
pub struct NullHistorySink;

impl HistorySink for NullHistorySink {
    fn record_completion(&self, record: CompletionRecord) {
        debug!("History disabled, dropping completion of {}", record.item_id);
    }

    fn record_favorite(&self, record: FavoriteRecord) {
        debug!("History disabled, dropping favorite of {}", record.item_id);
    }
}

/// Pick a sink matching the configured endpoint
pub fn sink_from_config(history_endpoint: Option<&str>) -> Arc<dyn HistorySink> {
    match history_endpoint {
        Some(endpoint) => Arc::new(HttpHistorySink::new(endpoint.to_string())),
        None => Arc::new(NullHistorySink),
    }
}
