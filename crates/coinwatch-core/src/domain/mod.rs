//! 도메인 모델.

pub mod balance;
pub mod kline;
pub mod monitor;
pub mod quote;

pub use balance::{AccountSection, AssetBalance, BalanceSnapshot};
pub use kline::Kline;
pub use monitor::{Direction, DirectionParseError, Monitor, MonitorStatus};
pub use quote::PriceQuote;
