//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 네트워크/DNS/TLS/타임아웃 또는 비정상 HTTP 상태
    #[error("Upstream error: {0}")]
    Transport(String),

    /// 응답 본문이 올바른 JSON이 아님
    #[error("Invalid JSON from upstream: {0}")]
    Decode(String),

    /// JSON은 올바르지만 필요한 최상위 필드가 없거나 타입이 다름
    #[error("Unexpected upstream schema: {0}")]
    Schema(String),

    /// 캐시 저장용 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 잘못된 입력 식별자 (예: 경로 구분자가 포함된 slug)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// 업스트림 응답 문제로 인한 오류인지 확인합니다.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DataError::Transport(_) | DataError::Decode(_) | DataError::Schema(_)
        )
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::Decode(err.to_string())
        } else {
            DataError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
