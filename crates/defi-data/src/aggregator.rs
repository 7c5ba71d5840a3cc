//! 프로토콜별 TVL 스파크라인 병렬 수집기.
//!
//! 프로토콜 slug 목록마다 상세 응답을 조회(엔티티 단위 캐시 적용)하여 최근 N개의
//! 일별 TVL 샘플을 추출합니다. 동시 요청 수는 `max_concurrency`로 제한되며,
//! 한 slug의 실패는 해당 slug만 빈 시계열로 만들고 전체 결과에는 영향을 주지 않습니다.

use defi_core::{AggregatorConfig, SparklineMap, UpstreamConfig};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::cache::CacheAside;
use crate::error::Result;
use crate::provider::UpstreamClient;
use crate::transform::sparkline_samples;

/// 스파크라인 병렬 수집기.
#[derive(Clone)]
pub struct SparklineAggregator {
    upstream: Arc<dyn UpstreamClient>,
    cache: CacheAside,
    api_base_url: String,
    detail_timeout: Duration,
    max_concurrency: usize,
    sample_count: usize,
}

impl SparklineAggregator {
    /// 새 수집기를 생성합니다.
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        cache: CacheAside,
        api_base_url: impl Into<String>,
        detail_timeout: Duration,
        max_concurrency: usize,
        sample_count: usize,
    ) -> Self {
        Self {
            upstream,
            cache,
            api_base_url: api_base_url.into(),
            detail_timeout,
            max_concurrency: max_concurrency.max(1),
            sample_count,
        }
    }

    /// 설정에서 수집기를 생성합니다.
    pub fn from_config(
        upstream: Arc<dyn UpstreamClient>,
        cache: CacheAside,
        upstream_config: &UpstreamConfig,
        config: &AggregatorConfig,
    ) -> Self {
        Self::new(
            upstream,
            cache,
            upstream_config.api_base_url.trim_end_matches('/'),
            Duration::from_secs(upstream_config.detail_timeout_secs),
            config.max_concurrency,
            config.sample_count,
        )
    }

    /// 프로토콜 상세 URL. 상세 라우트와 같은 캐시 키로 사용됩니다.
    pub fn detail_url(&self, slug: &str) -> String {
        format!("{}/protocol/{}", self.api_base_url, slug)
    }

    /// 최대 동시 요청 수.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// 모든 slug의 스파크라인을 수집합니다.
    ///
    /// 결과 맵은 입력 slug마다 정확히 하나의 키를 가집니다 (중복 slug는 하나로 합쳐짐).
    /// 이 함수 자체는 실패하지 않습니다.
    pub async fn build_sparklines(&self, slugs: &[String]) -> SparklineMap {
        let start = Instant::now();

        let results: Vec<(String, Vec<f64>)> = stream::iter(slugs.iter().cloned())
            .map(|slug| async move {
                let samples = match self.fetch_samples(&slug).await {
                    Ok(samples) => samples,
                    Err(e) => {
                        warn!(slug = %slug, error = %e, "스파크라인 수집 실패, 빈 시계열 사용");
                        Vec::new()
                    }
                };
                (slug, samples)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let map: SparklineMap = results.into_iter().collect();
        let empty = map.values().filter(|samples| samples.is_empty()).count();

        info!(
            protocols = map.len(),
            empty = empty,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "스파크라인 수집 완료"
        );

        map
    }

    /// slug 하나의 최근 샘플을 조회합니다. 상세 응답은 원본 그대로 캐싱됩니다.
    async fn fetch_samples(&self, slug: &str) -> Result<Vec<f64>> {
        let key = self.detail_url(slug);
        let url = key.clone();
        let upstream = self.upstream.clone();
        let timeout = self.detail_timeout;

        let detail = self
            .cache
            .resolve_raw(&key, || async move { upstream.fetch_json(&url, timeout).await })
            .await?;

        let samples = sparkline_samples(&detail, self.sample_count)?;
        debug!(slug = %slug, samples = samples.len(), "스파크라인 샘플 추출");
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::error::DataError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// URL별 고정 응답을 돌려주는 테스트 업스트림.
    #[derive(Default)]
    struct FakeUpstream {
        responses: HashMap<String, Value>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl FakeUpstream {
        fn with(mut self, url: &str, body: Value) -> Self {
            self.responses.insert(url.to_string(), body);
            self
        }
    }

    #[async_trait]
    impl UpstreamClient for FakeUpstream {
        async fn fetch_json(&self, url: &str, _timeout: Duration) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| DataError::Transport(format!("HTTP 404 Not Found from {}", url)))
        }
    }

    fn detail(days: usize) -> Value {
        let tvl: Vec<Value> = (1..=days)
            .map(|i| json!({"date": i, "totalLiquidityUSD": i as f64 * 100.0}))
            .collect();
        json!({"name": "x", "tvl": tvl})
    }

    fn aggregator(upstream: Arc<FakeUpstream>, max_concurrency: usize) -> SparklineAggregator {
        SparklineAggregator::new(
            upstream,
            CacheAside::new(Arc::new(TtlCache::default())),
            "http://upstream.test",
            Duration::from_secs(15),
            max_concurrency,
            7,
        )
    }

    #[tokio::test]
    async fn test_success_and_failure_are_isolated() {
        let upstream = Arc::new(
            FakeUpstream::default().with("http://upstream.test/protocol/a", detail(10)),
        );
        let aggregator = aggregator(upstream.clone(), 10);

        let map = aggregator
            .build_sparklines(&["a".to_string(), "b".to_string()])
            .await;

        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], vec![400.0, 500.0, 600.0, 700.0, 800.0, 900.0, 1000.0]);
        assert!(map["b"].is_empty());
    }

    #[tokio::test]
    async fn test_malformed_detail_yields_empty_series() {
        let upstream = Arc::new(
            FakeUpstream::default()
                .with("http://upstream.test/protocol/short", detail(3))
                .with("http://upstream.test/protocol/odd", json!({"tvl": "none"}))
                .with("http://upstream.test/protocol/blank", json!({"tvl": []})),
        );
        let map = aggregator(upstream, 4)
            .build_sparklines(&["short".into(), "odd".into(), "blank".into()])
            .await;

        assert_eq!(map["short"], vec![100.0, 200.0, 300.0]);
        assert!(map["odd"].is_empty());
        assert!(map["blank"].is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let mut upstream = FakeUpstream::default();
        let slugs: Vec<String> = (0..12).map(|i| format!("p{}", i)).collect();
        for slug in &slugs {
            upstream = upstream.with(&format!("http://upstream.test/protocol/{}", slug), detail(7));
        }
        let upstream = Arc::new(upstream);

        let map = aggregator(upstream.clone(), 3).build_sparklines(&slugs).await;

        assert_eq!(map.len(), 12);
        assert!(upstream.peak_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_detail_cached_per_entity() {
        let upstream = Arc::new(
            FakeUpstream::default().with("http://upstream.test/protocol/a", detail(8)),
        );
        let aggregator = aggregator(upstream.clone(), 2);

        aggregator.build_sparklines(&["a".to_string()]).await;
        let second = aggregator.build_sparklines(&["a".to_string()]).await;

        assert_eq!(second["a"].len(), 7);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_detail_is_not_cached() {
        let upstream = Arc::new(FakeUpstream::default());
        let aggregator = aggregator(upstream.clone(), 2);

        aggregator.build_sparklines(&["gone".to_string()]).await;
        aggregator.build_sparklines(&["gone".to_string()]).await;

        assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_input_and_zero_concurrency() {
        let upstream = Arc::new(FakeUpstream::default());
        let aggregator = aggregator(upstream, 0);

        assert_eq!(aggregator.max_concurrency(), 1);
        assert!(aggregator.build_sparklines(&[]).await.is_empty());
    }
}
