//! DeFi 대시보드 API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (프로토콜, 체인, 수익 풀, TVL 히스토리, 스파크라인)
//! - 헬스 체크 엔드포인트
//! - CORS 및 선택적 정적 index 제공
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`app`]: 미들웨어 조합
//! - [`error`]: 에러 응답 형식

pub mod app;
pub mod error;
pub mod routes;
pub mod state;

pub use app::{cors_layer, create_app, create_router, serve};
pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
