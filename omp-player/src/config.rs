//! Player service configuration
//!
//! Loaded from a TOML file resolved through `omp_common::config` (explicit
//! path > `OMP_CONFIG` env var > platform config dir) with compiled defaults
//! for anything absent. A missing config file is not an error.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "OMP_CONFIG";

/// Player configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Inactivity timeout before transport controls hide while playing
    pub controls_hide_ms: u64,

    /// Minimum interval between PlaybackProgress events
    pub progress_interval_ms: u64,

    /// Tick interval of the built-in clock element
    pub element_tick_ms: u64,

    /// Startup volume on the user-facing 0-100 scale
    pub default_volume: u8,

    /// JSON catalog file; the built-in demo catalog is used when absent
    pub catalog_path: Option<PathBuf>,

    /// Base URL of the history/favorites service; history recording is
    /// disabled when absent (no signed-in session)
    pub history_endpoint: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5720,
            controls_hide_ms: 3000,
            progress_interval_ms: 1000,
            element_tick_ms: 250,
            default_volume: 70,
            catalog_path: None,
            history_endpoint: None,
        }
    }
}

impl PlayerConfig {
    /// Load configuration, falling back to defaults when no file exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match omp_common::config::resolve_config_path(explicit, CONFIG_ENV_VAR) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)?;
                let config: PlayerConfig = toml::from_str(&text)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => {
                warn!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Controls-hide timeout as a Duration
    pub fn controls_hide(&self) -> Duration {
        Duration::from_millis(self.controls_hide_ms)
    }

    /// Progress event throttle as a Duration
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Clock element tick as a Duration
    pub fn element_tick(&self) -> Duration {
        Duration::from_millis(self.element_tick_ms)
    }

    /// Startup volume on the internal 0.0-1.0 scale
    pub fn default_volume_f32(&self) -> f32 {
        (self.default_volume.min(100) as f32) / 100.0
    }
}
