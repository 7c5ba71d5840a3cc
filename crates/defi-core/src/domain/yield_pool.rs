//! 수익 풀 레코드.

use serde::{Deserialize, Serialize};

/// 수익률 풀 한 건의 고정 필드 투영.
///
/// 9개 필드는 값이 없어도 항상 직렬화됩니다 (없으면 `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldPool {
    /// 풀 식별자 (UUID)
    #[serde(default)]
    pub pool: Option<String>,
    /// 프로젝트 slug
    #[serde(default)]
    pub project: Option<String>,
    /// 풀 토큰 심볼 (예: "USDC-WETH")
    #[serde(default)]
    pub symbol: Option<String>,
    /// 체인 이름
    #[serde(default)]
    pub chain: Option<String>,
    /// 총 APY (%)
    pub apy: f64,
    /// 기본 APY (%)
    #[serde(default)]
    pub apy_base: Option<f64>,
    /// 보상 APY (%)
    #[serde(default)]
    pub apy_reward: Option<f64>,
    /// 풀 예치 자산 (USD)
    pub tvl_usd: f64,
    /// 스테이블코인 풀 여부
    #[serde(default)]
    pub stablecoin: Option<bool>,
}
