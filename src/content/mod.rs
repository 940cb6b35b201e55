//! Content module - batch rotation, dedup sampling, and persistence
//!
//! Keeps a locally available, periodically refreshed, de-duplicated sample
//! of content per kind, usable fully offline after the first success. All
//! state lives in explicit manager instances created at app start; nothing
//! is module-global.

pub mod batch;
pub mod picker;
pub mod service;
pub mod source;
pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use batch::{BatchConfig, BatchManager, RefreshOutcome, SkipReason};
pub use picker::RotationPicker;
pub use service::{ContentService, RefreshEvent};
pub use source::{ContentSource, DirSource, FetchError};
pub use store::{JsonFileStore, MemoryStore, Record, Storage};

/// One piece of content: a stable id plus an opaque JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub payload: Value,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    /// Best-effort human-readable text for list views.
    pub fn display_text(&self) -> String {
        for key in ["text", "quote", "title", "name", "prompt", "body"] {
            if let Some(s) = self.payload.get(key).and_then(Value::as_str) {
                return s.to_string();
            }
        }
        self.payload.to_string()
    }
}

/// Current wall-clock time in milliseconds since the UNIX epoch.
pub fn unix_time_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
