//! 프로토콜별 스파크라인.

use std::collections::HashMap;

/// slug → 최근 TVL 샘플 (오래된 순).
///
/// 빈 벡터는 조회 실패 또는 데이터 없음을 의미합니다.
pub type SparklineMap = HashMap<String, Vec<f64>>;
