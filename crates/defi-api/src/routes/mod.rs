//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/protocols` - TVL 상위 프로토콜
//! - `/api/protocol/{slug}` - 프로토콜 상세
//! - `/api/chains` - 체인 목록
//! - `/api/yields` - 수익 풀
//! - `/api/tvl-history` - 전체 TVL 30일 요약
//! - `/api/sparklines` - 프로토콜별 7일 TVL 스파크라인

pub mod defi;
pub mod health;

pub use defi::defi_router;
pub use health::{health_router, ReadinessReport};

use axum::http::StatusCode;
use axum::Router;
use std::sync::Arc;

use crate::error::{api_error, ApiResult};
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 등록되지 않은 경로는 JSON 404로 응답합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // 데이터 엔드포인트
        .nest("/api", defi_router())
        .fallback(not_found)
}

async fn not_found() -> ApiResult<()> {
    Err(api_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Not found"))
}
