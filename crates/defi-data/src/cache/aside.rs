//! Cache-aside 조회기.
//!
//! ```text
//! resolve(key, fetch, transform)
//!         │
//!   ┌─────▼─────┐  HIT
//!   │ 캐시 확인  ├──────────► 변환된 값 그대로 반환
//!   └─────┬─────┘
//!         │ MISS
//!   ┌─────▼─────┐
//!   │  fetch()  │  ← 실패 시 오류 전파 (캐시 미변경)
//!   └─────┬─────┘
//!   ┌─────▼─────┐
//!   │ transform │
//!   └─────┬─────┘
//!   ┌─────▼─────┐
//!   │ 캐시 저장  │
//!   └───────────┘
//! ```
//!
//! 같은 키에 대한 동시 미스는 각각 업스트림을 호출하고 각각 저장합니다
//! (마지막 쓰기 우선). 중복 요청 병합은 하지 않습니다.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::ttl::TtlCache;
use crate::error::Result;

/// 공유 [`TtlCache`] 위에서 동작하는 cache-aside 조회기.
#[derive(Clone)]
pub struct CacheAside {
    cache: Arc<TtlCache>,
}

impl CacheAside {
    /// 공유 캐시로 조회기를 생성합니다.
    pub fn new(cache: Arc<TtlCache>) -> Self {
        Self { cache }
    }

    /// 내부 캐시를 가져옵니다.
    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    /// 캐시를 확인하고, 미스면 `fetch` → `transform` 결과를 저장 후 반환합니다.
    ///
    /// 캐시에는 변환이 끝난 값이 저장되므로 히트 시에는 업스트림 호출과
    /// 변환 모두 생략됩니다. `fetch`나 `transform`이 실패하면 캐시는
    /// 변경되지 않습니다.
    pub async fn resolve<T, F, Fut, X>(&self, key: &str, fetch: F, transform: X) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
        X: FnOnce(Value) -> Result<T>,
    {
        self.resolve_when(key, fetch, transform, |_| true).await
    }

    /// [`resolve`](Self::resolve)와 같지만 `keep`이 `false`를 돌려준 값은
    /// 반환만 하고 저장하지 않습니다.
    pub async fn resolve_when<T, F, Fut, X, K>(
        &self,
        key: &str,
        fetch: F,
        transform: X,
        keep: K,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
        X: FnOnce(Value) -> Result<T>,
        K: FnOnce(&T) -> bool,
    {
        if let Some(cached) = self.cache.get(key).await {
            match serde_json::from_value::<T>(cached) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    // 같은 키를 다른 타입으로 조회한 경우. 새로 받아 덮어씀
                    warn!(key = %key, error = %e, "cached value has unexpected shape, refetching");
                }
            }
        }

        debug!(key = %key, "cache-aside miss, fetching upstream");
        let raw = fetch().await?;
        let value = transform(raw)?;

        if keep(&value) {
            self.cache.set(key, serde_json::to_value(&value)?).await;
        } else {
            debug!(key = %key, "value not kept, cache unchanged");
        }
        Ok(value)
    }

    /// 변환 없이 원본 응답을 캐싱합니다.
    pub async fn resolve_raw<F, Fut>(&self, key: &str, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        self.resolve(key, fetch, Ok).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn aside() -> CacheAside {
        CacheAside::new(Arc::new(TtlCache::new(Duration::from_secs(300))))
    }

    #[tokio::test]
    async fn test_miss_fetches_transforms_and_stores() {
        let aside = aside();

        let doubled: Vec<i64> = aside
            .resolve(
                "numbers",
                || async { Ok(json!([1, 2, 3])) },
                |raw| {
                    let items = raw.as_array().cloned().unwrap_or_default();
                    Ok(items.iter().filter_map(|v| v.as_i64()).map(|n| n * 2).collect())
                },
            )
            .await
            .unwrap();

        assert_eq!(doubled, vec![2, 4, 6]);
        // 변환된 값이 저장됨
        assert_eq!(aside.cache().get("numbers").await, Some(json!([2, 4, 6])));
    }

    #[tokio::test]
    async fn test_hit_skips_fetch_and_transform() {
        let aside = aside();
        aside.cache().set("numbers", json!([9])).await;

        let fetches = AtomicUsize::new(0);
        let value: Vec<i64> = aside
            .resolve(
                "numbers",
                || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(json!([1]))
                },
                |_| -> Result<Vec<i64>> { panic!("transform must not run on hit") },
            )
            .await
            .unwrap();

        assert_eq!(value, vec![9]);
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_and_cache_untouched() {
        let aside = aside();

        let result = aside
            .resolve_raw("broken", || async {
                Err(DataError::Transport("connection refused".to_string()))
            })
            .await;

        assert!(matches!(result, Err(DataError::Transport(_))));
        assert!(aside.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_transform_error_propagates() {
        let aside = aside();

        let result: Result<Vec<i64>> = aside
            .resolve(
                "shape",
                || async { Ok(json!({"unexpected": true})) },
                |_| Err(DataError::Schema("expected a list".to_string())),
            )
            .await;

        assert!(matches!(result, Err(DataError::Schema(_))));
        assert!(aside.cache().get("shape").await.is_none());
    }

    async fn non_empty_list(aside: &CacheAside, body: Value) -> Vec<i64> {
        aside
            .resolve_when(
                "list",
                || async move { Ok(body) },
                |raw| Ok(serde_json::from_value(raw)?),
                |items: &Vec<i64>| !items.is_empty(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_when_skips_store() {
        let aside = aside();

        assert!(non_empty_list(&aside, json!([])).await.is_empty());
        assert!(aside.cache().get("list").await.is_none());

        assert_eq!(non_empty_list(&aside, json!([1])).await, vec![1]);
        assert_eq!(aside.cache().get("list").await, Some(json!([1])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refetched() {
        let aside = aside();
        let fetches = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let fetches = fetches.clone();
            aside
                .resolve_raw("k", || async move {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(json!("v"))
                })
                .await
                .unwrap();
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        let fetches_after = fetches.clone();
        aside
            .resolve_raw("k", || async move {
                fetches_after.fetch_add(1, Ordering::SeqCst);
                Ok(json!("v2"))
            })
            .await
            .unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cold_misses_all_complete() {
        let aside = aside();
        let fetches = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let aside = aside.clone();
                let fetches = fetches.clone();
                tokio::spawn(async move {
                    aside
                        .resolve_raw("cold", || async move {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            Ok(json!({"writer": i, "items": [i, i]}))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        // 중복 억제가 없으므로 1회 이상 호출될 수 있음
        assert!(fetches.load(Ordering::SeqCst) >= 1);
        let stored = aside.cache().get("cold").await.unwrap();
        let writer = stored["writer"].as_i64().unwrap();
        assert_eq!(stored["items"], json!([writer, writer]));
    }
}
