//! DeFi 분석 데이터 endpoint.
//!
//! 각 핸들러는 [`DefiDataManager`](defi_data::DefiDataManager)의 리소스 조회를
//! 그대로 노출합니다. 캐시 히트 시 업스트림 호출은 발생하지 않습니다.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use defi_core::{ChainSummary, ProtocolSummary, SparklineMap, TvlHistorySummary, YieldPool};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::error::{api_error, data_error, ApiResult};
use crate::state::AppState;

/// TVL 상위 프로토콜 목록.
///
/// GET /api/protocols
pub async fn get_protocols(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ProtocolSummary>>> {
    let protocols = state.data.protocols().await.map_err(data_error)?;
    Ok(Json(protocols))
}

/// 프로토콜 상세 (업스트림 응답 원본).
///
/// GET /api/protocol/{slug}
pub async fn get_protocol(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    let detail = state.data.protocol(&slug).await.map_err(data_error)?;
    Ok(Json(detail))
}

/// 체인 목록.
///
/// GET /api/chains
pub async fn get_chains(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ChainSummary>>> {
    let chains = state.data.chains().await.map_err(data_error)?;
    Ok(Json(chains))
}

/// 수익 풀 목록.
///
/// GET /api/yields
pub async fn get_yields(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<YieldPool>>> {
    let pools = state.data.yields().await.map_err(data_error)?;
    Ok(Json(pools))
}

/// 전체 TVL 히스토리 요약.
///
/// GET /api/tvl-history
pub async fn get_tvl_history(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TvlHistorySummary>> {
    let summary = state.data.tvl_history().await.map_err(data_error)?;
    Ok(Json(summary))
}

/// 상위 프로토콜 스파크라인.
///
/// 프로토콜 목록을 가져오지 못하면 502입니다. 개별 프로토콜 실패는 빈 배열로 채워집니다.
/// GET /api/sparklines
pub async fn get_sparklines(State(state): State<Arc<AppState>>) -> ApiResult<Json<SparklineMap>> {
    match state.data.sparklines().await {
        Ok(map) => Ok(Json(map)),
        Err(e) if e.is_upstream() => {
            warn!(error = %e, "스파크라인용 프로토콜 목록 조회 실패");
            Err(api_error(
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Failed to fetch protocol list",
            ))
        }
        Err(e) => Err(data_error(e)),
    }
}

/// DeFi 데이터 라우터 생성.
pub fn defi_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/protocols", get(get_protocols))
        .route("/protocol/{*slug}", get(get_protocol))
        .route("/chains", get(get_chains))
        .route("/yields", get(get_yields))
        .route("/tvl-history", get(get_tvl_history))
        .route("/sparklines", get(get_sparklines))
}
