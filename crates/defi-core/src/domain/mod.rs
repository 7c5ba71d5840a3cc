//! 업스트림 데이터를 정규화한 도메인 모델.

mod chain;
mod protocol;
mod sparkline;
mod tvl;
mod yield_pool;

pub use chain::*;
pub use protocol::*;
pub use sparkline::*;
pub use tvl::*;
pub use yield_pool::*;
