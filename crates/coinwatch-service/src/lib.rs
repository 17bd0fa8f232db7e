//! # Coinwatch Service
//!
//! 서비스 계층 및 데몬 바이너리 크레이트.
//!
//! - `MonitorEngine`: 주기 스윕으로 가격 모니터를 평가/발동
//! - `AccountService`: 볼트 + 게이트웨이를 묶은 계좌 잔고 조회

pub mod account;
pub mod engine;
pub mod error;

pub use account::AccountService;
pub use engine::{start_monitor_engine, MonitorEngine, SweepStats};
pub use error::{ServiceError, ServiceResult};
