//! 공용 값 타입.

pub mod interval;
pub mod market_type;
pub mod pair;

pub use interval::KlineInterval;
pub use market_type::MarketType;
pub use pair::{Pair, PairError};
