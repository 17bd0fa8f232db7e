//! 거래쌍 심볼 정규화.
//!
//! 다양한 입력 형식(`btc-usdt`, `BTC_USDT`, `btcusdt`)을 바이낸스 API가
//! 요구하는 대문자 연결 형식(`BTCUSDT`)으로 변환합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 거래쌍 파싱 에러.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    /// 빈 입력
    #[error("Pair must not be empty")]
    Empty,

    /// 너무 짧은 심볼 (최소 4자)
    #[error("Invalid pair: {0}")]
    TooShort(String),

    /// 허용되지 않는 문자 포함
    #[error("Pair contains invalid characters: {0}")]
    InvalidCharacters(String),
}

/// 정규화된 거래쌍 심볼 (예: `BTCUSDT`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pair(String);

impl Pair {
    /// 사용자 입력을 정규화하여 거래쌍을 생성합니다.
    ///
    /// 구분자(`-`, `_`, `/`)를 제거하고 대문자로 변환한 뒤
    /// 길이와 문자 집합을 검증합니다.
    pub fn parse(input: &str) -> Result<Self, PairError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PairError::Empty);
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | '/'))
            .collect::<String>()
            .to_uppercase();

        // 최소 2개의 자산 식별자가 필요
        if normalized.len() < 4 {
            return Err(PairError::TooShort(input.to_string()));
        }

        if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PairError::InvalidCharacters(input.to_string()));
        }

        Ok(Self(normalized))
    }

    /// 심볼 문자열 반환.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Pair {
    type Err = PairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
