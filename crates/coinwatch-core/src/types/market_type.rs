//! 마켓 유형 정의.
//!
//! 바이낸스의 네 가지 API 계열(현물, 선물, 마진, 알파)을 구분합니다.
//! 엔드포인트 선택은 게이트웨이 경계에서 한 번만 일어나며,
//! 호출자는 이 값으로 분기하지 않습니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시세를 제공하는 업스트림 API 계열.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// 현물
    Spot,
    /// 선물 (USDT 무기한)
    Futures,
    /// 마진
    Margin,
    /// 알파 토큰
    Alpha,
}

impl MarketType {
    /// 모든 마켓 유형 목록.
    pub const ALL: [MarketType; 4] = [
        MarketType::Spot,
        MarketType::Futures,
        MarketType::Margin,
        MarketType::Alpha,
    ];

    /// 소문자 식별자 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Futures => "futures",
            MarketType::Margin => "margin",
            MarketType::Alpha => "alpha",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spot" => Ok(MarketType::Spot),
            "futures" => Ok(MarketType::Futures),
            "margin" => Ok(MarketType::Margin),
            "alpha" => Ok(MarketType::Alpha),
            _ => Err(format!("Unknown market type: {}", s)),
        }
    }
}
