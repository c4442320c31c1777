//! 反序列化模型缓存
//!
//! 大模型的 JSON 反序列化在请求路径上开销明显，这里按 acct 缓存
//! 反序列化结果。只收序列化形式超过阈值的模型，小模型直接现场解析。
//! 条目带 TTL，容量满时淘汰最早写入的条目。指纹不匹配说明数据已被
//! 重新导入，条目作废。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fedimark_application::ModelCache;
use fedimark_markov::TextModel;
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry {
    fingerprint: u64,
    model: Arc<TextModel>,
    inserted_at: Instant,
}

pub struct InMemoryModelCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    capacity: usize,
    ttl: Duration,
    min_payload_bytes: usize,
}

impl InMemoryModelCache {
    pub fn new(capacity: usize, ttl: Duration, min_payload_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
            ttl,
            min_payload_bytes,
        }
    }

    fn sweep_expired(&self, entries: &mut HashMap<String, CacheEntry>, now: Instant) {
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);
    }
}

#[async_trait]
impl ModelCache for InMemoryModelCache {
    async fn get(&self, acct: &str, fingerprint: u64) -> Option<Arc<TextModel>> {
        let mut entries = self.entries.lock().await;
        self.sweep_expired(&mut entries, Instant::now());
        match entries.get(acct) {
            Some(entry) if entry.fingerprint == fingerprint => {
                debug!(acct, "模型缓存命中");
                Some(Arc::clone(&entry.model))
            }
            Some(_) => {
                // 数据已被重新导入，条目作废
                debug!(acct, "模型缓存指纹不匹配，作废");
                entries.remove(acct);
                None
            }
            None => None,
        }
    }

    async fn insert(
        &self,
        acct: &str,
        fingerprint: u64,
        payload_bytes: usize,
        model: Arc<TextModel>,
    ) {
        if payload_bytes < self.min_payload_bytes {
            return;
        }
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        self.sweep_expired(&mut entries, now);

        if !entries.contains_key(acct) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(acct, _)| acct.clone());
            if let Some(oldest) = oldest {
                debug!(acct = %oldest, "缓存已满，淘汰最早条目");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            acct.to_string(),
            CacheEntry {
                fingerprint,
                model,
                inserted_at: now,
            },
        );
    }

    async fn remove(&self, acct: &str) {
        self.entries.lock().await.remove(acct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(corpus: &[&str]) -> Arc<TextModel> {
        let lines: Vec<String> = corpus.iter().map(|s| s.to_string()).collect();
        Arc::new(TextModel::train(&lines).expect("train test model"))
    }

    fn cache(capacity: usize, ttl_ms: u64) -> InMemoryModelCache {
        InMemoryModelCache::new(capacity, Duration::from_millis(ttl_ms), 0)
    }

    #[tokio::test]
    async fn test_hit_requires_matching_fingerprint() {
        let cache = cache(5, 60_000);
        cache.insert("alice", 1, 100, model(&["a b"])).await;

        assert!(cache.get("alice", 1).await.is_some());
        // 指纹变化视为数据已更新
        assert!(cache.get("alice", 2).await.is_none());
        // 不匹配的条目已被作废
        assert!(cache.get("alice", 1).await.is_none());
    }

    #[tokio::test]
    async fn test_small_payloads_are_not_cached() {
        let cache = InMemoryModelCache::new(5, Duration::from_secs(60), 1024);
        cache.insert("alice", 1, 100, model(&["a b"])).await;
        assert!(cache.get("alice", 1).await.is_none());

        cache.insert("alice", 1, 2048, model(&["a b"])).await;
        assert!(cache.get("alice", 1).await.is_some());
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = cache(5, 50);
        cache.insert("alice", 1, 100, model(&["a b"])).await;
        assert!(cache.get("alice", 1).await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.get("alice", 1).await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_entry() {
        let cache = cache(2, 60_000);
        cache.insert("first", 1, 100, model(&["a b"])).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("second", 2, 100, model(&["c d"])).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("third", 3, 100, model(&["e f"])).await;

        assert!(cache.get("first", 1).await.is_none());
        assert!(cache.get("second", 2).await.is_some());
        assert!(cache.get("third", 3).await.is_some());
    }

    #[tokio::test]
    async fn test_reinsert_existing_key_does_not_evict() {
        let cache = cache(2, 60_000);
        cache.insert("first", 1, 100, model(&["a b"])).await;
        cache.insert("second", 2, 100, model(&["c d"])).await;
        // 覆盖已有键不触发淘汰
        cache.insert("second", 3, 100, model(&["c e"])).await;

        assert!(cache.get("first", 1).await.is_some());
        assert!(cache.get("second", 3).await.is_some());
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = cache(5, 60_000);
        cache.insert("alice", 1, 100, model(&["a b"])).await;
        cache.remove("alice").await;
        assert!(cache.get("alice", 1).await.is_none());
    }
}
