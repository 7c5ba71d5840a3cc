//! 프로토콜 요약 레코드.

use serde::{Deserialize, Serialize};

/// 중앙화 거래소 카테고리 (프로토콜 목록에서 제외 대상).
pub const CEX_CATEGORY: &str = "CEX";

/// 프로토콜 목록 응답 한 건의 고정 필드 투영.
///
/// 필드명은 업스트림 `/protocols` 응답과 동일하게 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    /// 프로토콜 이름
    pub name: String,
    /// 상세 조회에 쓰이는 식별자 (예: "aave", "lido")
    pub slug: String,
    /// 거버넌스 토큰 심볼
    #[serde(default)]
    pub symbol: Option<String>,
    /// 로고 이미지 URL
    #[serde(default)]
    pub logo: Option<String>,
    /// 카테고리 (예: "Lending", "Dexes", "CEX")
    #[serde(default)]
    pub category: Option<String>,
    /// 배포된 체인 목록
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chains: Option<Vec<String>>,
    /// 총 예치 자산 (USD)
    pub tvl: f64,
    /// 1시간 변동률 (%)
    #[serde(default)]
    pub change_1h: Option<f64>,
    /// 1일 변동률 (%)
    #[serde(default)]
    pub change_1d: Option<f64>,
    /// 7일 변동률 (%)
    #[serde(default)]
    pub change_7d: Option<f64>,
    /// 시가총액 (USD)
    #[serde(default)]
    pub mcap: Option<f64>,
    /// 프로토콜 웹사이트
    #[serde(default)]
    pub url: Option<String>,
}

impl ProtocolSummary {
    /// 중앙화 거래소 여부.
    pub fn is_cex(&self) -> bool {
        self.category.as_deref() == Some(CEX_CATEGORY)
    }
}
