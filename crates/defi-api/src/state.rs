//! 애플리케이션 공유 상태.

use defi_data::DefiDataManager;
use std::sync::Arc;

/// 모든 핸들러가 공유하는 상태.
pub struct AppState {
    /// 리소스 조회 관리자 (캐시 포함)
    pub data: Arc<DefiDataManager>,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(data: Arc<DefiDataManager>) -> Self {
        Self {
            data,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 모든 업스트림 요청이 실패하는 클라이언트를 사용합니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use async_trait::async_trait;
    use defi_core::AppConfig;
    use defi_data::{DataError, UpstreamClient};
    use serde_json::Value;
    use std::time::Duration;

    struct UnreachableUpstream;

    #[async_trait]
    impl UpstreamClient for UnreachableUpstream {
        async fn fetch_json(&self, url: &str, _timeout: Duration) -> defi_data::Result<Value> {
            Err(DataError::Transport(format!("connection refused: {}", url)))
        }
    }

    let manager = DefiDataManager::new(&AppConfig::default(), Arc::new(UnreachableUpstream));
    AppState::new(Arc::new(manager))
}
