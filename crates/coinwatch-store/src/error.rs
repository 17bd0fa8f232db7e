//! 저장소 에러 타입.

use coinwatch_core::CryptoError;
use rust_decimal::Decimal;
use thiserror::Error;

/// 저장소 관련 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 데이터베이스 에러
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 자격증명이 등록되지 않은 사용자
    #[error("No credentials bound for user: {0}")]
    NotBound(String),

    /// 자격증명 형식 오류 (길이 미달 등)
    #[error("Invalid API key format: {0}")]
    InvalidKeyFormat(String),

    /// 복호화 실패.
    ///
    /// 마스터 키 교체나 레코드 손상을 의미하며,
    /// 미등록(`NotBound`)과 절대 혼동되지 않습니다.
    #[error("Credential decryption failed: {0}")]
    Decryption(#[from] CryptoError),

    /// 모니터를 찾을 수 없음
    #[error("Monitor not found: {0}")]
    NotFound(i64),

    /// 모니터 소유자가 아님
    #[error("Monitor {0} is owned by another user")]
    NotOwner(i64),

    /// 이미 종단 상태인 모니터
    #[error("Monitor {0} is already in a terminal state")]
    AlreadyFinal(i64),

    /// 유효하지 않은 목표 가격
    #[error("Invalid target price: {0} (must be positive)")]
    InvalidTargetPrice(Decimal),

    /// 손상된 레코드 (파싱 불가)
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// 저장소 작업을 위한 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;
