//! DeFi 분석 데이터 캐싱 및 집계.
//!
//! 이 crate는 다음을 제공합니다:
//! - TTL 기반 인메모리 캐시
//! - 업스트림 HTTP 클라이언트 (타임아웃, TLS 검증)
//! - 업스트림 응답 정규화 파이프라인
//! - cache-aside 조회기
//! - 프로토콜별 스파크라인 병렬 집계
//! - 리소스별 URL/캐시 키/변환을 묶는 [`DefiDataManager`]

pub mod aggregator;
pub mod cache;
pub mod error;
pub mod manager;
pub mod provider;
pub mod transform;

pub use error::{DataError, Result};
pub use manager::{DefiDataManager, SPARKLINES_KEY, TVL_HISTORY_KEY, YIELDS_KEY};

pub use aggregator::SparklineAggregator;
pub use cache::{CacheAside, CacheStats, TtlCache};
pub use provider::{HttpUpstream, UpstreamClient};
pub use transform::{
    transform_chains, transform_protocols, transform_tvl_history, transform_yields,
    MAX_PROTOCOLS, MAX_YIELD_POOLS, TVL_HISTORY_WINDOW,
};
