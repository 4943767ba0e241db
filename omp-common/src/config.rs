//! Configuration file resolution
//!
//! Locates the player's TOML configuration file following a fixed priority
//! order:
//! 1. Explicit path (command-line argument, highest priority)
//! 2. Environment variable
//! 3. Platform configuration directory (`~/.config/omp/config.toml`,
//!    then `/etc/omp/config.toml` on Linux)
//! 4. None, in which case the caller falls back to compiled defaults

use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the configuration file path, if any exists
///
/// Returns `None` when no configuration file is present anywhere in the
/// priority chain; callers then use their compiled defaults.
pub fn resolve_config_path(explicit: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: explicit path from the command line
    if let Some(path) = explicit {
        debug!("Using explicit config path: {}", path.display());
        return Some(path.to_path_buf());
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            debug!("Using config path from {}: {}", env_var_name, path);
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: platform config directory
    if let Some(dir) = dirs::config_dir() {
        let candidate = dir.join("omp").join("config.toml");
        if candidate.exists() {
            debug!("Using user config file: {}", candidate.display());
            return Some(candidate);
        }
    }

    if cfg!(target_os = "linux") {
        let system = PathBuf::from("/etc/omp/config.toml");
        if system.exists() {
            debug!("Using system config file: {}", system.display());
            return Some(system);
        }
    }

    // Priority 4: nothing found, caller uses defaults
    None
}
