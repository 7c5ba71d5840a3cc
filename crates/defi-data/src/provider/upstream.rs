//! 업스트림 분석 API 클라이언트.
//!
//! # 오류 분류
//!
//! - 연결 거부, DNS, TLS, 타임아웃, 2xx 이외 상태 → [`DataError::Transport`]
//! - 본문이 JSON이 아님 → [`DataError::Decode`]
//!
//! 재시도는 하지 않습니다. 실패한 요청은 다음 요청(또는 다음 캐시 만료 주기)에서
//! 새로 시도됩니다.

use async_trait::async_trait;
use defi_core::UpstreamConfig;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{DataError, Result};

/// 업스트림 JSON 조회 트레잇.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// `url`에 GET 요청을 보내고 본문을 JSON으로 파싱합니다.
    async fn fetch_json(&self, url: &str, timeout: Duration) -> Result<Value>;
}

/// reqwest 기반 업스트림 클라이언트.
///
/// TLS 인증서 검증은 항상 활성화되어 있습니다.
#[derive(Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    /// 새 클라이언트를 생성합니다.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| DataError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { client })
    }

    /// 업스트림 설정으로 클라이언트를 생성합니다.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        Self::new(&config.user_agent)
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    #[instrument(skip(self))]
    async fn fetch_json(&self, url: &str, timeout: Duration) -> Result<Value> {
        debug!("업스트림 요청");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Transport(format!("HTTP {} from {}", status, url)));
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "업스트림 응답 수신");

        serde_json::from_slice(&body).map_err(|e| DataError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> HttpUpstream {
        HttpUpstream::new("defi-dashboard-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_json_parses_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/protocols")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name":"Aave","tvl":1.5}]"#)
            .create_async()
            .await;

        let url = format!("{}/protocols", server.url());
        let value = client()
            .fetch_json(&url, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(value, json!([{"name": "Aave", "tvl": 1.5}]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pools")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let url = format!("{}/pools", server.url());
        let result = client().fetch_json(&url, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(DataError::Decode(_))));
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/protocol/unknown")
            .with_status(500)
            .with_body(r#"{"message":"boom"}"#)
            .create_async()
            .await;

        let url = format!("{}/protocol/unknown", server.url());
        let result = client().fetch_json(&url, Duration::from_secs(5)).await;

        match result {
            Err(DataError::Transport(message)) => assert!(message.contains("500")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // 바인딩 후 바로 닫아 사용되지 않는 포트 확보
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/protocols", addr);
        let result = client().fetch_json(&url, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(DataError::Transport(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        // 연결은 받되 응답하지 않는 서버
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let url = format!("http://{}/slow", addr);
        let result = client().fetch_json(&url, Duration::from_millis(200)).await;

        assert!(matches!(result, Err(DataError::Transport(_))));
        server.abort();
    }
}
