//! 업스트림 데이터 Provider 모듈.
//!
//! ## UpstreamClient
//! - 단일 HTTP GET → JSON 값 조회 트레잇
//! - 요청마다 개별 타임아웃 적용
//!
//! ## HttpUpstream
//! - reqwest 기반 구현 (rustls, 번들 루트 + 플랫폼 루트 인증서)

pub mod upstream;

pub use upstream::{HttpUpstream, UpstreamClient};
