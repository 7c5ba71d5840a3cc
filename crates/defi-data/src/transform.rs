//! 업스트림 응답 정규화 파이프라인.
//!
//! 모든 함수는 상태가 없는 순수 함수입니다. 오류 처리 정책은 두 가지로 나뉩니다:
//!
//! - **레코드 제외**: 개별 레코드가 검증 조건을 통과하지 못하면 결과에서 조용히 빠집니다.
//! - **변환 중단**: 최상위 컨테이너(목록, `data` 필드)가 없거나 타입이 다르면
//!   [`DataError::Schema`]로 전체 변환이 실패합니다.

use defi_core::{ChainSummary, ProtocolSummary, TvlHistoryPoint, TvlHistorySummary, YieldPool};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::error::{DataError, Result};

/// 프로토콜 목록 최대 개수.
pub const MAX_PROTOCOLS: usize = 20;

/// 수익 풀 최대 개수.
pub const MAX_YIELD_POOLS: usize = 100;

/// TVL 히스토리 요약 구간 (일).
pub const TVL_HISTORY_WINDOW: usize = 30;

/// 수익 풀 최소 예치 자산 (USD, 초과해야 포함).
pub const MIN_POOL_TVL_USD: f64 = 10_000.0;

/// 수익 풀 APY 상한 (%, 미만이어야 포함).
pub const MAX_POOL_APY: f64 = 1_000.0;

// ==================== 공용 헬퍼 ====================

/// 최상위 값이 목록인지 확인합니다.
fn expect_list(value: Value, what: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(DataError::Schema(format!(
            "{} must be a list, got {}",
            what,
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// 필드가 JSON 숫자면 값을 반환합니다.
fn numeric_field(record: &Value, field: &str) -> Option<f64> {
    record.get(field).and_then(Value::as_f64)
}

/// JSON 값의 참/거짓 판정 (없음, null, false, 0, 빈 문자열/목록/객체는 거짓).
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

/// 레코드를 고정 필드 타입으로 투영합니다. 타입이 맞지 않으면 제외합니다.
fn project<T: DeserializeOwned>(record: Value) -> Option<T> {
    match serde_json::from_value(record) {
        Ok(projected) => Some(projected),
        Err(e) => {
            trace!(error = %e, "레코드 투영 실패, 제외");
            None
        }
    }
}

/// 키 기준 내림차순 안정 정렬 (동률은 원래 순서 유지).
fn sort_descending_by<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

/// 소수점 `decimals`자리 반올림.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ==================== 레코드 검증 ====================

/// 프로토콜 목록 포함 조건: `tvl`이 숫자이고 CEX가 아님.
pub fn is_listed_protocol(record: &Value) -> bool {
    numeric_field(record, "tvl").is_some()
        && record.get("category").and_then(Value::as_str) != Some(defi_core::CEX_CATEGORY)
}

/// 체인 목록 포함 조건: `tvl`이 숫자.
pub fn is_listed_chain(record: &Value) -> bool {
    numeric_field(record, "tvl").is_some()
}

/// 수익 풀 포함 조건.
///
/// - `tvlUsd`가 숫자이고 10,000 초과
/// - `apy`가 숫자이고 0 초과 1,000 미만
/// - `outlier` 플래그가 설정되지 않음
pub fn is_eligible_pool(record: &Value) -> bool {
    let Some(tvl_usd) = numeric_field(record, "tvlUsd") else {
        return false;
    };
    let Some(apy) = numeric_field(record, "apy") else {
        return false;
    };

    tvl_usd > MIN_POOL_TVL_USD
        && apy > 0.0
        && apy < MAX_POOL_APY
        && !is_truthy(record.get("outlier"))
}

// ==================== 변환 함수 ====================

/// 프로토콜 목록 → TVL 상위 20개 (CEX 및 TVL 누락 제외).
pub fn transform_protocols(raw: Value) -> Result<Vec<ProtocolSummary>> {
    let records = expect_list(raw, "protocols")?;

    let mut protocols: Vec<ProtocolSummary> = records
        .into_iter()
        .filter(is_listed_protocol)
        .filter_map(project)
        .collect();

    sort_descending_by(&mut protocols, |p| p.tvl);
    protocols.truncate(MAX_PROTOCOLS);
    Ok(protocols)
}

/// 체인 목록 → TVL 내림차순 전체.
pub fn transform_chains(raw: Value) -> Result<Vec<ChainSummary>> {
    let records = expect_list(raw, "chains")?;

    let mut chains: Vec<ChainSummary> = records
        .into_iter()
        .filter(is_listed_chain)
        .filter_map(project)
        .collect();

    sort_descending_by(&mut chains, |c| c.tvl);
    Ok(chains)
}

/// 수익 풀 응답 (`{"data": [...]}`) → 조건을 만족하는 풀 최대 100개.
pub fn transform_yields(raw: Value) -> Result<Vec<YieldPool>> {
    let data = match raw {
        Value::Object(mut payload) => payload
            .remove("data")
            .ok_or_else(|| DataError::Schema("yields payload has no `data` field".to_string()))?,
        other => {
            return Err(DataError::Schema(format!(
                "yields payload must be an object, got {}",
                json_type(&other)
            )))
        }
    };
    let records = expect_list(data, "yields.data")?;

    let mut pools: Vec<YieldPool> = records
        .into_iter()
        .filter(is_eligible_pool)
        .filter_map(project)
        .collect();

    sort_descending_by(&mut pools, |p| p.tvl_usd);
    pools.truncate(MAX_YIELD_POOLS);
    Ok(pools)
}

/// 일별 TVL 시계열 → 최근 30일 요약.
///
/// 유효한 점이 2개 미만이면 빈 요약을 반환합니다. 변동률은 선택 구간의
/// 마지막 두 점으로 계산하며, 직전 값이 0이면 0입니다.
pub fn transform_tvl_history(raw: Value) -> Result<TvlHistorySummary> {
    let records = expect_list(raw, "tvl history")?;

    let series: Vec<f64> = records
        .into_iter()
        .filter_map(project::<TvlHistoryPoint>)
        .map(|point| point.tvl)
        .collect();

    if series.len() < 2 {
        return Ok(TvlHistorySummary::empty());
    }

    let window = &series[series.len().saturating_sub(TVL_HISTORY_WINDOW)..];
    let latest = window[window.len() - 1];
    let previous = window[window.len() - 2];

    let change = if previous != 0.0 {
        (latest - previous) / previous * 100.0
    } else {
        0.0
    };

    Ok(TvlHistorySummary {
        tvl: latest,
        change_24h: round_to(change, 4),
        points: window.to_vec(),
    })
}

/// 프로토콜 상세 응답에서 최근 `count`개의 일별 TVL 샘플을 추출합니다.
///
/// `tvl` 필드가 없거나 목록이 아니면 [`DataError::Schema`]입니다.
/// `totalLiquidityUSD`가 숫자가 아닌 항목은 0으로 취급합니다.
pub fn sparkline_samples(detail: &Value, count: usize) -> Result<Vec<f64>> {
    let series = detail
        .get("tvl")
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::Schema("protocol detail has no `tvl` list".to_string()))?;

    let recent = &series[series.len().saturating_sub(count)..];
    Ok(recent
        .iter()
        .map(|entry| numeric_field(entry, "totalLiquidityUSD").unwrap_or(0.0))
        .collect())
}
