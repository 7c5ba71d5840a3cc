//! 체인 요약 레코드.

use serde::{Deserialize, Serialize};

/// 체인 목록 응답 한 건의 고정 필드 투영.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// 체인 이름 (예: "Ethereum")
    pub name: String,
    /// CoinGecko 식별자
    #[serde(default)]
    pub gecko_id: Option<String>,
    /// 네이티브 토큰 심볼
    #[serde(default, rename = "tokenSymbol")]
    pub token_symbol: Option<String>,
    /// 총 예치 자산 (USD)
    pub tvl: f64,
}
