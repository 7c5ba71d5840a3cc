//! # DeFi Core
//!
//! DeFi 대시보드 프록시의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 업스트림 응답을 정규화한 레코드 타입 (프로토콜, 체인, 수익 풀, TVL 히스토리)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod logging;

pub use crate::config::*;
pub use domain::*;
pub use logging::*;
