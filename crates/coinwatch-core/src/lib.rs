//! # Coinwatch Core
//!
//! 시세 조회 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 마켓 유형 및 거래쌍 정의
//! - 시세/캔들스틱 데이터 구조체
//! - 가격 모니터 도메인 모델
//! - 설정 관리
//! - 로깅 인프라
//! - 자격증명 암호화

pub mod config;
pub mod crypto;
pub mod domain;
pub mod logging;
pub mod types;

pub use config::*;
pub use crypto::{generate_master_key, ApiCredentials, CredentialEncryptor, CryptoError, SealedCredentials};
pub use domain::*;
pub use logging::*;
pub use types::*;
