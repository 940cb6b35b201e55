//! Content service - bridges the sync render loop with the async managers
//!
//! The game loop is synchronous and must never block; refreshes run on a
//! dedicated tokio runtime and report back over a channel the loop drains
//! with `try_recv`. Dropping the service stops scheduling new work;
//! in-flight refreshes complete on their own (stop is advisory).

use std::sync::Arc;

use anyhow::Result;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::info;

use crate::content::batch::{BatchManager, RefreshOutcome};
use crate::content::picker::RotationPicker;
use crate::content::ContentItem;
use crate::types::ContentKind;

/// One finished refresh, delivered to the sync loop.
#[derive(Debug, Clone)]
pub struct RefreshEvent {
    pub kind: ContentKind,
    pub outcome: RefreshOutcome,
}

pub struct ContentService {
    rt: Runtime,
    manager: Arc<BatchManager>,
    picker: Arc<RotationPicker>,
    event_tx: mpsc::UnboundedSender<RefreshEvent>,
    event_rx: mpsc::UnboundedReceiver<RefreshEvent>,
}

impl ContentService {
    pub fn start(manager: Arc<BatchManager>, picker: Arc<RotationPicker>) -> Result<Self> {
        let rt = Runtime::new()?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            rt,
            manager,
            picker,
            event_tx,
            event_rx,
        })
    }

    /// Fire refreshes for every registered kind. Fire-and-forget: each
    /// kind reports its outcome as an event when it finishes.
    pub fn spawn_refresh_all(&self, now_ms: u64) {
        for kind in self.manager.kinds().to_vec() {
            let manager = Arc::clone(&self.manager);
            let tx = self.event_tx.clone();
            self.rt.spawn(async move {
                let outcome = manager.refresh(kind, now_ms).await;
                let _ = tx.send(RefreshEvent { kind, outcome });
            });
        }
        info!("content refresh scheduled");
    }

    /// Drain one refresh result, if any. Never blocks.
    pub fn try_recv(&mut self) -> Option<RefreshEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Cached batch for a kind (fallback when empty). Blocks briefly on the
    /// storage read; called at screen switches, not per frame.
    pub fn batch(&self, kind: ContentKind, fallback: &[ContentItem]) -> Vec<ContentItem> {
        self.rt.block_on(self.manager.get(kind, fallback))
    }

    /// Pick rotation items from a pool and stamp them shown.
    pub fn pick(
        &self,
        pool: &[ContentItem],
        count: usize,
        now_ms: u64,
    ) -> Result<Vec<ContentItem>> {
        self.rt.block_on(async {
            let picked = self.picker.pick_unseen(pool, count, now_ms).await?;
            let ids: Vec<String> = picked.iter().map(|i| i.id.clone()).collect();
            self.picker.mark_shown(&ids, now_ms).await?;
            Ok(picked)
        })
    }
}
