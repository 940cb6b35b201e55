//! App configuration with environment overrides.
//!
//! Defaults live under the XDG config directory
//! (`$XDG_CONFIG_HOME/respite` or `~/.config/respite`); every knob can be
//! overridden with a `RESPITE_*` environment variable.

use std::env;
use std::path::PathBuf;

use crate::types::{DEFAULT_BATCH_SIZE, DEFAULT_PICK_WINDOW_DAYS};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Storage documents live here.
    pub data_dir: PathBuf,
    /// Content documents (one JSON file per kind) are fetched from here.
    pub content_dir: PathBuf,
    /// Log file; logging is disabled when unset.
    pub log_path: Option<PathBuf>,
    pub batch_size: usize,
    pub window_days: u64,
    pub seed: u32,
}

/// Base config directory: XDG config or ~/.config, falling back to cwd.
fn base_dir() -> PathBuf {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("respite")
}

impl AppConfig {
    pub fn from_env() -> Self {
        let base = base_dir();

        let data_dir = env::var("RESPITE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base.join("data"));
        let content_dir = env::var("RESPITE_CONTENT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base.join("content"));
        let log_path = env::var("RESPITE_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let batch_size = env::var("RESPITE_BATCH_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let window_days = env::var("RESPITE_PICK_WINDOW_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PICK_WINDOW_DAYS);
        let seed = env::var("RESPITE_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| crate::content::unix_time_ms() as u32);

        Self {
            data_dir,
            content_dir,
            log_path,
            batch_size,
            window_days,
            seed,
        }
    }
}
