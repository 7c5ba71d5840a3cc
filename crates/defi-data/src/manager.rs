//! 리소스별 조회 관리자.
//!
//! 각 논리 리소스를 업스트림 URL, 캐시 키, 변환 함수 한 묶음으로 고정하고
//! cache-aside 조회기를 통해 제공합니다.
//!
//! | 리소스 | 업스트림 | 캐시 키 |
//! |---|---|---|
//! | 프로토콜 목록 | `{api}/protocols` | URL |
//! | 프로토콜 상세 | `{api}/protocol/{slug}` | URL |
//! | 체인 목록 | `{api}/v2/chains` | URL |
//! | 수익 풀 | `{yields}/pools` | [`YIELDS_KEY`] |
//! | TVL 히스토리 | `{api}/v2/historicalChainTvl` | [`TVL_HISTORY_KEY`] |
//! | 스파크라인 | 프로토콜 목록 + 상세 N건 | [`SPARKLINES_KEY`] |

use defi_core::{
    AppConfig, ChainSummary, ProtocolSummary, SparklineMap, TvlHistorySummary, YieldPool,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::aggregator::SparklineAggregator;
use crate::cache::{CacheAside, CacheStats, TtlCache};
use crate::error::{DataError, Result};
use crate::provider::UpstreamClient;
use crate::transform::{
    transform_chains, transform_protocols, transform_tvl_history, transform_yields,
};

/// 수익 풀 캐시 키.
pub const YIELDS_KEY: &str = "yields";

/// TVL 히스토리 캐시 키.
pub const TVL_HISTORY_KEY: &str = "tvl-history";

/// 스파크라인 집계 결과 캐시 키.
pub const SPARKLINES_KEY: &str = "sparklines";

/// DeFi 데이터 조회 관리자.
///
/// 하나의 [`TtlCache`]를 조회기와 스파크라인 수집기가 공유합니다.
pub struct DefiDataManager {
    upstream: Arc<dyn UpstreamClient>,
    cache: CacheAside,
    aggregator: SparklineAggregator,
    api_base_url: String,
    yields_base_url: String,
    timeout: Duration,
}

impl DefiDataManager {
    /// 설정과 업스트림 클라이언트로 관리자를 생성합니다.
    pub fn new(config: &AppConfig, upstream: Arc<dyn UpstreamClient>) -> Self {
        let cache = CacheAside::new(Arc::new(TtlCache::new(Duration::from_secs(
            config.cache.ttl_secs,
        ))));
        let aggregator = SparklineAggregator::from_config(
            upstream.clone(),
            cache.clone(),
            &config.upstream,
            &config.aggregator,
        );

        info!(
            api_base_url = %config.upstream.api_base_url,
            yields_base_url = %config.upstream.yields_base_url,
            ttl_secs = config.cache.ttl_secs,
            "DeFi 데이터 관리자 생성"
        );

        Self {
            upstream,
            cache,
            aggregator,
            api_base_url: config.upstream.api_base_url.trim_end_matches('/').to_string(),
            yields_base_url: config.upstream.yields_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.upstream.timeout_secs),
        }
    }

    // ==================== URL ====================

    pub fn protocols_url(&self) -> String {
        format!("{}/protocols", self.api_base_url)
    }

    pub fn protocol_url(&self, slug: &str) -> String {
        self.aggregator.detail_url(slug)
    }

    pub fn chains_url(&self) -> String {
        format!("{}/v2/chains", self.api_base_url)
    }

    pub fn yields_url(&self) -> String {
        format!("{}/pools", self.yields_base_url)
    }

    pub fn tvl_history_url(&self) -> String {
        format!("{}/v2/historicalChainTvl", self.api_base_url)
    }

    // ==================== 조회 ====================

    /// 단일 리소스를 조회합니다. 실패는 `error` 레벨로 기록 후 전파합니다.
    async fn fetch(&self, url: String) -> Result<Value> {
        self.upstream
            .fetch_json(&url, self.timeout)
            .await
            .inspect_err(|e| error!(url = %url, error = %e, "업스트림 조회 실패"))
    }

    /// TVL 상위 프로토콜 목록.
    ///
    /// 빈 목록은 캐시하지 않으므로 다음 요청에서 다시 조회합니다.
    pub async fn protocols(&self) -> Result<Vec<ProtocolSummary>> {
        let url = self.protocols_url();
        self.cache
            .resolve_when(
                &url,
                || self.fetch(url.clone()),
                transform_protocols,
                |protocols: &Vec<ProtocolSummary>| !protocols.is_empty(),
            )
            .await
    }

    /// 프로토콜 상세 (원본 그대로).
    ///
    /// slug가 비어 있거나 경로 구분자 또는 상위 경로 참조를 포함하면
    /// [`DataError::InvalidInput`]입니다.
    pub async fn protocol(&self, slug: &str) -> Result<Value> {
        validate_slug(slug)?;
        let url = self.protocol_url(slug);
        self.cache
            .resolve_raw(&url, || self.fetch(url.clone()))
            .await
    }

    /// TVL 내림차순 체인 목록.
    pub async fn chains(&self) -> Result<Vec<ChainSummary>> {
        let url = self.chains_url();
        self.cache
            .resolve(&url, || self.fetch(url.clone()), transform_chains)
            .await
    }

    /// 조건을 만족하는 수익 풀 목록.
    pub async fn yields(&self) -> Result<Vec<YieldPool>> {
        self.cache
            .resolve(YIELDS_KEY, || self.fetch(self.yields_url()), transform_yields)
            .await
    }

    /// 최근 30일 전체 TVL 요약.
    pub async fn tvl_history(&self) -> Result<TvlHistorySummary> {
        self.cache
            .resolve(
                TVL_HISTORY_KEY,
                || self.fetch(self.tvl_history_url()),
                transform_tvl_history,
            )
            .await
    }

    /// 상위 프로토콜들의 스파크라인.
    ///
    /// 집계 결과가 캐시에 없을 때만 프로토콜 목록(캐시 경유)을 조회해 집계합니다.
    /// 프로토콜 목록 조회 실패는 그대로 전파되고, 개별 프로토콜 실패는 빈 시계열이 됩니다.
    /// 프로토콜이 하나도 없으면 빈 맵을 반환하고 캐시하지 않습니다.
    pub async fn sparklines(&self) -> Result<SparklineMap> {
        self.cache
            .resolve_when(
                SPARKLINES_KEY,
                || async {
                    let protocols = self.protocols().await?;
                    if protocols.is_empty() {
                        warn!("프로토콜 목록이 비어 있음, 스파크라인 집계 생략");
                    }
                    let slugs: Vec<String> = protocols.into_iter().map(|p| p.slug).collect();
                    let map = self.aggregator.build_sparklines(&slugs).await;
                    Ok::<_, DataError>(serde_json::to_value(map)?)
                },
                |value| Ok(serde_json::from_value::<SparklineMap>(value)?),
                |map: &SparklineMap| !map.is_empty(),
            )
            .await
    }

    /// 캐시 통계.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.cache().stats().await
    }
}

/// 상세 조회용 slug 검증.
///
/// 영숫자와 `.`, `_`, `-`만 허용하고 `..`은 거부합니다. 통과한 slug는
/// 인코딩 없이 업스트림 URL 경로에 그대로 들어갑니다.
pub fn validate_slug(slug: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    if slug.is_empty() || !slug.chars().all(allowed) || slug.contains("..") {
        return Err(DataError::InvalidInput(format!("Invalid slug: {:?}", slug)));
    }
    Ok(())
}
