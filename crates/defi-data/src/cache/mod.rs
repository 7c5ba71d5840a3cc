//! 캐싱 레이어.
//!
//! - TTL 캐시: 키별 만료 시간이 있는 인메모리 저장소
//! - Cache-aside: 캐시 확인 → 미스 시 조회/변환 → 저장

pub mod aside;
pub mod ttl;

pub use aside::CacheAside;
pub use ttl::{CacheStats, TtlCache};
