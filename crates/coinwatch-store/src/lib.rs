//! # Coinwatch Store
//!
//! 자격증명 볼트와 모니터 레지스트리의 내구 저장소 크레이트.
//!
//! - SQLite 기반 (sqlx)
//! - 자격증명은 AES-256-GCM으로 봉인되어 저장
//! - 모니터 상태 전이는 조건부 UPDATE로 경합 안전

pub mod error;
pub mod monitors;
pub mod schema;
pub mod vault;

pub use error::{StoreError, StoreResult};
pub use monitors::MonitorRegistry;
pub use schema::init_schema;
pub use vault::CredentialVault;
