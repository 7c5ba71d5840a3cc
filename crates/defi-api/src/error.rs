//! API 에러 응답 타입.
//!
//! 모든 엔드포인트는 실패 시 같은 형식의 JSON 본문을 반환합니다.
//!
//! ```json
//! { "error": "Upstream error: HTTP 503 Service Unavailable from ...", "code": "UPSTREAM_ERROR" }
//! ```

use axum::http::StatusCode;
use axum::Json;
use defi_data::DataError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
    /// 에러 코드 (예: "UPSTREAM_ERROR", "INVALID_INPUT", "NOT_FOUND")
    pub code: String,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.error)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 상태 코드와 에러 본문을 묶습니다.
pub fn api_error(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiErrorResponse>) {
    (status, Json(ApiErrorResponse::new(code, message)))
}

/// [`DataError`]를 HTTP 응답으로 변환합니다.
///
/// - `InvalidInput` → 400
/// - `Transport` / `Decode` / `Schema` → 502
/// - `Serialization` / `Config` → 500
pub fn data_error(err: DataError) -> (StatusCode, Json<ApiErrorResponse>) {
    match err {
        DataError::InvalidInput(message) => {
            api_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
        }
        e if e.is_upstream() => api_error(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string()),
        e => {
            warn!(error = %e, "내부 오류");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.to_string(),
            )
        }
    }
}
