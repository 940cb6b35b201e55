//! Rotation picker - "pick N items unseen in the last K days"
//!
//! The item-granular cousin of the batch sampler: the same
//! prefer-unseen/backfill-oldest shape, with a time window over persisted
//! last-shown stamps instead of a count-capped id set. Both funnel through
//! `sample_prefer_unseen`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use crate::content::store::{stores, Record, Storage};
use crate::content::ContentItem;
use crate::core::rng::SeededRng;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Shared sampling core: unseen items (shuffled) first, then the caller's
/// pre-ordered backfill, truncated to the limit.
pub fn sample_prefer_unseen<T>(
    mut unseen: Vec<T>,
    backfill: Vec<T>,
    limit: usize,
    rng: &mut SeededRng,
) -> Vec<T> {
    rng.shuffle(&mut unseen);
    unseen.extend(backfill);
    unseen.truncate(limit);
    unseen
}

pub struct RotationPicker {
    storage: Arc<dyn Storage>,
    rng: StdMutex<SeededRng>,
    window_ms: u64,
}

impl RotationPicker {
    pub fn new(storage: Arc<dyn Storage>, window_days: u64, seed: u32) -> Self {
        Self {
            storage,
            rng: StdMutex::new(SeededRng::new(seed)),
            window_ms: window_days * DAY_MS,
        }
    }

    /// Pick up to `count` items from the pool, preferring items not shown
    /// within the trailing window; backfill with least-recently-shown.
    pub async fn pick_unseen(
        &self,
        pool: &[ContentItem],
        count: usize,
        now_ms: u64,
    ) -> Result<Vec<ContentItem>> {
        let stamps: HashMap<String, u64> = self
            .storage
            .get_all(stores::SHOWN)
            .await?
            .into_iter()
            .filter_map(|r| r.value.as_u64().map(|t| (r.key, t)))
            .collect();

        let mut unseen = Vec::new();
        let mut shown: Vec<(u64, ContentItem)> = Vec::new();
        for item in pool {
            match stamps.get(&item.id) {
                Some(&t) if now_ms.saturating_sub(t) < self.window_ms => {
                    shown.push((t, item.clone()));
                }
                _ => unseen.push(item.clone()),
            }
        }
        // Backfill order: least recently shown first.
        shown.sort_by_key(|(t, _)| *t);
        let backfill: Vec<ContentItem> = shown.into_iter().map(|(_, item)| item).collect();

        debug!(
            unseen = unseen.len(),
            backfill = backfill.len(),
            count,
            "picking rotation items"
        );
        let mut rng = self.rng.lock().expect("rng lock");
        Ok(sample_prefer_unseen(unseen, backfill, count, &mut rng))
    }

    /// Stamp items as shown now. Stamps far outside the window are pruned
    /// through the store's age-based delete.
    pub async fn mark_shown(&self, ids: &[String], now_ms: u64) -> Result<()> {
        let records = ids
            .iter()
            .map(|id| Record::new(id.clone(), json!(now_ms), now_ms))
            .collect();
        self.storage.put_many(stores::SHOWN, records).await?;

        let cutoff = now_ms.saturating_sub(self.window_ms.saturating_mul(4));
        self.storage.delete_older_than(stores::SHOWN, cutoff).await
    }
}
