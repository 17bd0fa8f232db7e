//! 가격 모니터 도메인 모델.
//!
//! 모니터는 `active → triggered`(엔진에 의해) 또는 `active → cancelled`
//! (사용자에 의해)로 한 번만 전이하며, 종단 상태에서 빠져나오지 않습니다.
//! 발동된 모니터는 즉시 비활성화되므로 이전 샘플을 기억할 필요 없이
//! 현재 샘플만으로 레벨 크로싱을 판정합니다.

use crate::types::{MarketType, Pair};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 모니터 방향 파싱 에러.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid direction: {0} (expected 'up' or 'down')")]
pub struct DirectionParseError(pub String);

/// 목표가 도달 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// 상승 돌파 (현재가 >= 목표가)
    Up,
    /// 하락 돌파 (현재가 <= 목표가)
    Down,
}

impl Direction {
    /// 소문자 식별자 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(DirectionParseError(s.to_string())),
        }
    }
}

/// 모니터 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    /// 평가 대상
    Active,
    /// 발동됨 (종단)
    Triggered,
    /// 사용자 취소 (종단)
    Cancelled,
}

impl MonitorStatus {
    /// 소문자 식별자 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorStatus::Active => "active",
            MonitorStatus::Triggered => "triggered",
            MonitorStatus::Cancelled => "cancelled",
        }
    }

    /// 종단 상태 여부.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MonitorStatus::Active)
    }
}

impl FromStr for MonitorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MonitorStatus::Active),
            "triggered" => Ok(MonitorStatus::Triggered),
            "cancelled" => Ok(MonitorStatus::Cancelled),
            _ => Err(format!("Unknown monitor status: {}", s)),
        }
    }
}

/// 사용자 정의 가격 모니터.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
    /// 모니터 ID (단조 증가)
    pub id: i64,
    /// 소유자 사용자 ID
    pub owner_id: String,
    /// 거래쌍
    pub pair: Pair,
    /// 마켓 유형
    pub market_type: MarketType,
    /// 목표 가격
    pub target_price: Decimal,
    /// 도달 방향
    pub direction: Direction,
    /// 현재 상태
    pub status: MonitorStatus,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

impl Monitor {
    /// 현재가가 목표 조건을 만족하는지 판정합니다.
    ///
    /// 경계값 포함: `up`은 현재가 >= 목표가, `down`은 현재가 <= 목표가.
    pub fn is_crossed(&self, current_price: Decimal) -> bool {
        match self.direction {
            Direction::Up => current_price >= self.target_price,
            Direction::Down => current_price <= self.target_price,
        }
    }
}
