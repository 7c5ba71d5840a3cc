//! 전체 DeFi TVL 히스토리 타입.

use serde::{Deserialize, Serialize};

/// 일별 TVL 시계열의 한 점.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvlHistoryPoint {
    /// Unix 타임스탬프 (초)
    #[serde(default, alias = "timestamp")]
    pub date: Option<i64>,
    /// 해당 일자의 TVL (USD)
    pub tvl: f64,
}

/// 최근 구간 TVL 요약.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TvlHistorySummary {
    /// 최신 TVL
    pub tvl: f64,
    /// 직전 점 대비 변동률 (%, 소수점 4자리 반올림)
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    /// 선택 구간의 TVL 값 (오래된 순)
    pub points: Vec<f64>,
}

impl TvlHistorySummary {
    /// 데이터가 부족할 때의 빈 요약.
    pub fn empty() -> Self {
        Self::default()
    }
}
