//! # Coinwatch Exchange
//!
//! Binance 업스트림에 대한 마켓 게이트웨이 크레이트.
//!
//! - 마켓 유형별 현재가/캔들스틱 조회
//! - HMAC-SHA256 서명 계좌 잔고 조회
//! - 업스트림 에러 코드의 도메인 에러 매핑

pub mod binance;
pub mod error;
pub mod traits;

pub use binance::BinanceGateway;
pub use error::GatewayError;
pub use traits::{AccountDataSource, GatewayResult, MarketDataSource};
