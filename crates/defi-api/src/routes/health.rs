//! 프록시 상태 endpoint.
//!
//! `/health`는 프로세스 생존만 알리고, `/health/ready`는 버전과 업타임, 응답 캐시
//! 적중 현황을 돌려줍니다. 업스트림은 호출하지 않습니다.

use axum::{extract::State, routing::get, Json, Router};
use defi_data::CacheStats;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// `/health/ready` 응답.
#[derive(Debug, Serialize)]
pub struct ReadinessReport {
    pub status: &'static str,
    pub version: String,
    pub uptime_secs: i64,
    /// RFC 3339
    pub timestamp: String,
    /// 응답 캐시 항목 수와 적중/미스 누계
    pub cache: CacheStats,
}

/// GET /health
pub async fn liveness() -> &'static str {
    "OK"
}

/// GET /health/ready
///
/// 업스트림 장애는 여기서 드러나지 않고 데이터 요청의 502로 보입니다.
pub async fn readiness(State(state): State<Arc<AppState>>) -> Json<ReadinessReport> {
    Json(ReadinessReport {
        status: "healthy",
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        cache: state.data.cache_stats().await,
    })
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(liveness))
        .route("/ready", get(readiness))
}
