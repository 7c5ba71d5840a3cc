//! 설정 관리.
//!
//! 기본값 ← 설정 파일(선택) ← 환경 변수 순으로 덮어씁니다.
//! 환경 변수는 `DASHBOARD` 접두사와 `__` 구분자를 사용합니다
//! (예: `DASHBOARD__CACHE__TTL_SECS=60`).

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 캐시 설정
    pub cache: CacheConfig,
    /// 업스트림 API 설정
    pub upstream: UpstreamConfig,
    /// 스파크라인 집계 설정
    pub aggregator: AggregatorConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// `index.html`을 제공할 정적 파일 디렉토리
    pub static_dir: Option<String>,
    /// 허용할 CORS origin 목록 (없으면 모든 origin 허용)
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: None,
            cors_origins: None,
        }
    }
}

/// 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 캐시 항목 유효 시간 (초)
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

/// 업스트림 API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// 프로토콜/체인/TVL API 기본 URL
    pub api_base_url: String,
    /// 수익 풀 API 기본 URL
    pub yields_base_url: String,
    /// 단일 리소스 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 스파크라인용 프로토콜 상세 요청 타임아웃 (초)
    pub detail_timeout_secs: u64,
    /// User-Agent 헤더
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.llama.fi".to_string(),
            yields_base_url: "https://yields.llama.fi".to_string(),
            timeout_secs: 30,
            detail_timeout_secs: 15,
            user_agent: concat!("defi-dashboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// 스파크라인 집계 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// 동시에 진행할 최대 상세 요청 수
    pub max_concurrency: usize,
    /// 프로토콜별로 유지할 최근 샘플 수
    pub sample_count: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            sample_count: 7,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("DASHBOARD")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// 설정값의 유효성을 검사합니다.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "cache.ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.aggregator.max_concurrency == 0 {
            return Err(config::ConfigError::Message(
                "aggregator.max_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.upstream.timeout_secs == 0 || self.upstream.detail_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "upstream timeouts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
