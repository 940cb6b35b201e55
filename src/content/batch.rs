//! Batch manager - fetch, dedup, sample, persist
//!
//! Each registered content kind keeps a locally cached batch, replaced (not
//! merged) on every successful refresh, plus a bounded insertion-ordered
//! seen-set that biases sampling toward items not served recently. Refresh
//! is gated by a per-kind cooldown and a per-kind in-flight guard; nothing
//! past the manager ever sees a fetch or storage error.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use serde_json::{json, Value};
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::content::picker::sample_prefer_unseen;
use crate::content::source::{ContentSource, FetchError};
use crate::content::store::{stores, Record, Storage};
use crate::content::ContentItem;
use crate::core::rng::SeededRng;
use crate::types::{
    ContentKind, DEFAULT_BATCH_SIZE, FETCH_TIMEOUT_MS, REFRESH_COOLDOWN_MS, SEEN_SET_CAP,
};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub seen_cap: usize,
    pub cooldown_ms: u64,
    pub fetch_timeout_ms: u64,
    pub seed: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            seen_cap: SEEN_SET_CAP,
            cooldown_ms: REFRESH_COOLDOWN_MS,
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
            seed: 1,
        }
    }
}

/// Result of one refresh attempt. `Skipped` covers the gates (cooldown,
/// in-flight, unregistered kind); `Failed` covers fetch and storage faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { items: usize },
    Skipped(SkipReason),
    Failed(String),
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Cooldown,
    InFlight,
    Unregistered,
}

/// Removes the kind from the in-flight set when the refresh ends.
struct InFlightGuard<'a> {
    set: &'a StdMutex<HashSet<ContentKind>>,
    kind: ContentKind,
}

impl<'a> InFlightGuard<'a> {
    fn try_acquire(set: &'a StdMutex<HashSet<ContentKind>>, kind: ContentKind) -> Option<Self> {
        let mut in_flight = set.lock().expect("in-flight lock");
        if in_flight.insert(kind) {
            Some(Self { set, kind })
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("in-flight lock")
            .remove(&self.kind);
    }
}

pub struct BatchManager {
    storage: Arc<dyn Storage>,
    source: Arc<dyn ContentSource>,
    config: BatchConfig,
    kinds: Vec<ContentKind>,
    rng: StdMutex<SeededRng>,
    in_flight: StdMutex<HashSet<ContentKind>>,
}

impl BatchManager {
    pub fn new(
        storage: Arc<dyn Storage>,
        source: Arc<dyn ContentSource>,
        config: BatchConfig,
    ) -> Self {
        let rng = SeededRng::new(config.seed);
        Self {
            storage,
            source,
            config,
            kinds: ContentKind::ALL.to_vec(),
            rng: StdMutex::new(rng),
            in_flight: StdMutex::new(HashSet::new()),
        }
    }

    pub fn kinds(&self) -> &[ContentKind] {
        &self.kinds
    }

    /// Refresh the cached batch for one kind.
    ///
    /// Sequence: cooldown gate, fetch (with timeout), partition by the
    /// seen-set, shuffle each partition, sample unseen-first, persist batch
    /// and seen ids, stamp the fetch time. The stamp only moves on success,
    /// so a failed fetch retries on the next eligible cycle instead of
    /// burning the cooldown.
    pub async fn refresh(&self, kind: ContentKind, now_ms: u64) -> RefreshOutcome {
        if !self.kinds.contains(&kind) {
            return RefreshOutcome::Skipped(SkipReason::Unregistered);
        }
        let Some(_guard) = InFlightGuard::try_acquire(&self.in_flight, kind) else {
            debug!(kind = kind.as_str(), "refresh already in flight");
            return RefreshOutcome::Skipped(SkipReason::InFlight);
        };

        match self.last_fetched_at(kind).await {
            Some(stamp) if now_ms.saturating_sub(stamp) < self.config.cooldown_ms => {
                debug!(kind = kind.as_str(), "refresh inside cooldown window");
                return RefreshOutcome::Skipped(SkipReason::Cooldown);
            }
            _ => {}
        }

        let fetch = timeout(
            Duration::from_millis(self.config.fetch_timeout_ms),
            self.source.fetch(kind),
        )
        .await;
        let pool = match fetch {
            Err(_) => {
                warn!(kind = kind.as_str(), "fetch timed out");
                return RefreshOutcome::Failed(FetchError::TimedOut.to_string());
            }
            Ok(Err(e)) => {
                warn!(kind = kind.as_str(), error = %e, "fetch failed");
                return RefreshOutcome::Failed(e.to_string());
            }
            Ok(Ok(pool)) => pool,
        };
        if pool.is_empty() {
            warn!(kind = kind.as_str(), "fetch returned no items");
            return RefreshOutcome::Failed("empty item list".to_string());
        }

        let mut seen_ids = self.seen_ids(kind).await;
        let seen_lookup: HashSet<&str> = seen_ids.iter().map(String::as_str).collect();

        // Partition, shuffle each side independently, then sample with
        // unseen items first. Never blocks on exhaustion: once everything
        // has been seen, seen-set eviction recirculates old items.
        let (unseen, mut seen): (Vec<ContentItem>, Vec<ContentItem>) = pool
            .into_iter()
            .partition(|item| !seen_lookup.contains(item.id.as_str()));
        drop(seen_lookup);
        let batch = {
            // Guard scope kept tight: the lock must not live across an await.
            let mut rng = self.rng.lock().expect("rng lock");
            rng.shuffle(&mut seen);
            // sample_prefer_unseen shuffles the unseen side.
            sample_prefer_unseen(unseen, seen, self.config.batch_size, &mut rng)
        };
        self.commit(kind, batch, &mut seen_ids, now_ms).await
    }

    /// Persist the sampled batch, mark its ids seen, stamp the fetch time.
    async fn commit(
        &self,
        kind: ContentKind,
        batch: Vec<ContentItem>,
        seen_ids: &mut Vec<String>,
        now_ms: u64,
    ) -> RefreshOutcome {
        for item in &batch {
            if !seen_ids.contains(&item.id) {
                seen_ids.push(item.id.clone());
            }
        }
        // Bounded history: oldest ids drop off the front.
        if seen_ids.len() > self.config.seen_cap {
            let excess = seen_ids.len() - self.config.seen_cap;
            seen_ids.drain(..excess);
        }

        let batch_value = match serde_json::to_value(&batch) {
            Ok(v) => v,
            Err(e) => return RefreshOutcome::Failed(e.to_string()),
        };
        let writes = [
            (stores::BATCHES, Record::new(kind.as_str(), batch_value, now_ms)),
            (
                stores::SEEN,
                Record::new(kind.as_str(), json!(seen_ids), now_ms),
            ),
            (
                stores::FETCHED_AT,
                Record::new(kind.as_str(), json!(now_ms), now_ms),
            ),
        ];
        for (store, record) in writes {
            if let Err(e) = self.storage.put(store, record).await {
                warn!(kind = kind.as_str(), store, error = %e, "storage write failed");
                return RefreshOutcome::Failed(e.to_string());
            }
        }

        info!(kind = kind.as_str(), items = batch.len(), "batch refreshed");
        RefreshOutcome::Refreshed { items: batch.len() }
    }

    /// Refresh every registered kind concurrently. Individual failures are
    /// isolated; returns the number of successful refreshes. Safe to call
    /// on every app start thanks to the per-kind cooldown.
    pub async fn refresh_all(self: &Arc<Self>, now_ms: u64) -> usize {
        let mut tasks = JoinSet::new();
        for kind in self.kinds.clone() {
            let manager = Arc::clone(self);
            tasks.spawn(async move { (kind, manager.refresh(kind, now_ms).await) });
        }

        let mut successes = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((kind, outcome)) => {
                    debug!(kind = kind.as_str(), ?outcome, "refresh finished");
                    if outcome.is_success() {
                        successes += 1;
                    }
                }
                Err(e) => warn!(error = %e, "refresh task panicked"),
            }
        }
        successes
    }

    /// The locally cached batch for a kind, or the supplied fallback when
    /// the cache is empty or unreadable. Always yields content, even fully
    /// offline on first run.
    pub async fn get(&self, kind: ContentKind, fallback: &[ContentItem]) -> Vec<ContentItem> {
        let cached = match self.storage.get(stores::BATCHES, kind.as_str()).await {
            Ok(record) => record,
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "batch read failed");
                None
            }
        };

        if let Some(record) = cached {
            match serde_json::from_value::<Vec<ContentItem>>(record.value) {
                Ok(items) if !items.is_empty() => return items,
                Ok(_) => {}
                Err(e) => warn!(kind = kind.as_str(), error = %e, "cached batch unreadable"),
            }
        }
        fallback.to_vec()
    }

    async fn last_fetched_at(&self, kind: ContentKind) -> Option<u64> {
        match self.storage.get(stores::FETCHED_AT, kind.as_str()).await {
            Ok(record) => record.and_then(|r| r.value.as_u64()),
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "fetch stamp read failed");
                None
            }
        }
    }

    async fn seen_ids(&self, kind: ContentKind) -> Vec<String> {
        let record = match self.storage.get(stores::SEEN, kind.as_str()).await {
            Ok(record) => record,
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "seen-set read failed");
                None
            }
        };
        record
            .map(|r| match r.value {
                Value::Array(ids) => ids
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source serving a fixed pool, counting fetches.
    struct FixedSource {
        pool: Vec<ContentItem>,
        fetches: AtomicUsize,
    }

    impl FixedSource {
        fn new(count: usize) -> Self {
            let pool = (0..count)
                .map(|i| ContentItem::new(format!("item-{i}"), json!({"text": format!("t{i}")})))
                .collect();
            Self {
                pool,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentSource for FixedSource {
        async fn fetch(&self, _kind: ContentKind) -> Result<Vec<ContentItem>, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.pool.clone())
        }
    }

    fn manager_with(source: Arc<FixedSource>) -> Arc<BatchManager> {
        Arc::new(BatchManager::new(
            Arc::new(MemoryStore::new()),
            source,
            BatchConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_refresh_cooldown_gates_second_fetch() {
        let source = Arc::new(FixedSource::new(30));
        let manager = manager_with(Arc::clone(&source));

        let first = manager.refresh(ContentKind::Quotes, 1_000).await;
        assert!(first.is_success());

        // Inside the 6h window: skipped without touching the source.
        let second = manager.refresh(ContentKind::Quotes, 1_000 + 60_000).await;
        assert_eq!(second, RefreshOutcome::Skipped(SkipReason::Cooldown));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        // Past the window: fetches again.
        let third = manager
            .refresh(ContentKind::Quotes, 1_000 + REFRESH_COOLDOWN_MS)
            .await;
        assert!(third.is_success());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_batch_has_no_duplicates_and_prefers_unseen() {
        let source = Arc::new(FixedSource::new(60));
        let manager = manager_with(Arc::clone(&source));

        manager.refresh(ContentKind::Stories, 0).await;
        let first = manager.get(ContentKind::Stories, &[]).await;
        assert_eq!(first.len(), DEFAULT_BATCH_SIZE);

        let mut ids: Vec<&str> = first.iter().map(|i| i.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), first.len(), "no duplicate ids in a batch");

        // Second refresh past cooldown: pool still has 40 unseen items, so
        // the whole next batch avoids the 20 already served.
        manager
            .refresh(ContentKind::Stories, REFRESH_COOLDOWN_MS + 1)
            .await;
        let second = manager.get(ContentKind::Stories, &[]).await;
        let first_ids: HashSet<&str> = first.iter().map(|i| i.id.as_str()).collect();
        assert!(second.iter().all(|i| !first_ids.contains(i.id.as_str())));
    }

    #[tokio::test]
    async fn test_seen_set_capped_oldest_first() {
        let source = Arc::new(FixedSource::new(700));
        let mut config = BatchConfig::default();
        config.batch_size = 200;
        let manager = Arc::new(BatchManager::new(
            Arc::new(MemoryStore::new()),
            source,
            config,
        ));

        let mut now = 0;
        for _ in 0..4 {
            let outcome = manager.refresh(ContentKind::Quotes, now).await;
            assert!(outcome.is_success());
            now += REFRESH_COOLDOWN_MS + 1;
        }

        let seen = manager.seen_ids(ContentKind::Quotes).await;
        assert_eq!(seen.len(), SEEN_SET_CAP, "seen-set capped at 500");
    }

    #[tokio::test]
    async fn test_refresh_empty_pool_fails_without_stamp() {
        let source = Arc::new(FixedSource::new(0));
        let manager = manager_with(Arc::clone(&source));

        let outcome = manager.refresh(ContentKind::Quotes, 0).await;
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));

        // Cooldown untouched by the failure: the next call fetches again.
        manager.refresh(ContentKind::Quotes, 1).await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_unregistered_kind_rejected() {
        let source = Arc::new(FixedSource::new(10));
        let mut manager = BatchManager::new(
            Arc::new(MemoryStore::new()),
            source,
            BatchConfig::default(),
        );
        manager.kinds = vec![ContentKind::Quotes];

        let outcome = manager.refresh(ContentKind::Stories, 0).await;
        assert_eq!(outcome, RefreshOutcome::Skipped(SkipReason::Unregistered));
    }

    #[tokio::test]
    async fn test_refresh_replaces_batch() {
        let source = Arc::new(FixedSource::new(25));
        let manager = manager_with(source);

        manager.refresh(ContentKind::Exercises, 0).await;
        manager
            .refresh(ContentKind::Exercises, REFRESH_COOLDOWN_MS + 1)
            .await;

        // Replaced, not appended: still one batch of at most batch_size.
        let batch = manager.get(ContentKind::Exercises, &[]).await;
        assert!(batch.len() <= DEFAULT_BATCH_SIZE);
    }

    #[tokio::test]
    async fn test_get_falls_back_when_cache_empty() {
        let source = Arc::new(FixedSource::new(10));
        let manager = manager_with(source);

        let fallback = vec![ContentItem::new("fb-1", json!({"text": "bundled"}))];
        let got = manager.get(ContentKind::Mysteries, &fallback).await;
        assert_eq!(got, fallback);

        manager.refresh(ContentKind::Mysteries, 0).await;
        let got = manager.get(ContentKind::Mysteries, &fallback).await;
        assert_ne!(got, fallback);
    }

    #[tokio::test]
    async fn test_refresh_all_counts_successes() {
        let source = Arc::new(FixedSource::new(15));
        let manager = manager_with(Arc::clone(&source));

        let successes = manager.refresh_all(0).await;
        assert_eq!(successes, ContentKind::ALL.len());

        // Every kind now sits inside its cooldown window.
        let successes = manager.refresh_all(1).await;
        assert_eq!(successes, 0);
    }
}
