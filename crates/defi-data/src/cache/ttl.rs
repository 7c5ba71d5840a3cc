//! TTL 기반 인메모리 캐시.
//!
//! 만료는 읽기 시점에만 판정합니다. 별도 정리 태스크가 없으므로 만료된
//! 항목은 같은 키로 다시 쓰일 때까지 저장소에 남아 있지만, 읽기는 항상
//! 저장 시각을 다시 확인하므로 만료 값이 반환되지 않습니다.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// 캐시 항목. 저장 후에는 변경하지 않고 통째로 교체합니다.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// 캐시 통계.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    /// 저장소에 남아 있는 항목 수 (만료 항목 포함)
    pub entries: usize,
}

/// 문자열 키 → JSON 값 TTL 캐시.
///
/// 프로세스당 하나를 생성해 `Arc`로 공유합니다.
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TtlCache {
    /// 기본 TTL (5분).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    /// 주어진 TTL로 빈 캐시를 생성합니다.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 캐시 TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 유효한 값이 있으면 복사본을 반환합니다.
    ///
    /// 항목이 없거나 `now - stored_at >= ttl`이면 `None`입니다.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache miss");
                None
            }
        }
    }

    /// 기존 항목을 무조건 덮어쓰고 저장 시각을 현재로 설정합니다.
    pub async fn set(&self, key: &str, value: Value) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        debug!(key = %key, "cache stored");
    }

    /// 저장소에 남아 있는 항목 수 (만료 항목 포함).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 저장소가 비어 있는지 확인합니다.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// 현재 캐시 통계.
    pub async fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.len().await,
        }
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_get_within_ttl_returns_value() {
        let cache = TtlCache::new(Duration::from_secs(300));
        cache.set("yields", json!([1, 2, 3])).await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("yields").await, Some(json!([1, 2, 3])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_at_ttl_boundary_is_miss() {
        let cache = TtlCache::new(Duration::from_secs(300));
        cache.set("yields", json!({"a": 1})).await;

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(cache.get("yields").await, None);
        // 만료 항목은 읽기로 삭제되지 않음
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_resets_age() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.set("k", json!(1)).await;
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", json!(2)).await;
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get("k").await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = TtlCache::default();
        assert!(cache.get("nothing").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_stats_counts_hits_and_misses() {
        let cache = TtlCache::default();
        cache.set("k", json!("v")).await;
        cache.get("k").await;
        cache.get("k").await;
        cache.get("other").await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_concurrent_writes_same_key_leave_whole_value() {
        let cache = Arc::new(TtlCache::default());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.set("shared", json!({"writer": i, "payload": [i, i, i]})).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let value = cache.get("shared").await.unwrap();
        let writer = value["writer"].as_i64().unwrap();
        assert_eq!(value["payload"], json!([writer, writer, writer]));
        assert_eq!(cache.len().await, 1);
    }
}
