//! 계좌 잔고 스냅샷.
//!
//! 네 가지 업스트림 계좌 API의 서로 다른 응답 형태를
//! 하나의 스냅샷 스키마로 정규화합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 잔고 조회 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountSection {
    /// 전체 요약 (현물 + 자금 계좌 합산)
    Overview,
    /// 알파 토큰 계좌
    Alpha,
    /// 자금 계좌
    Funding,
    /// 현물 계좌
    Spot,
    /// 선물 계좌
    Futures,
}

impl AccountSection {
    /// 소문자 식별자 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountSection::Overview => "overview",
            AccountSection::Alpha => "alpha",
            AccountSection::Funding => "funding",
            AccountSection::Spot => "spot",
            AccountSection::Futures => "futures",
        }
    }
}

impl fmt::Display for AccountSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overview" => Ok(AccountSection::Overview),
            "alpha" => Ok(AccountSection::Alpha),
            "funding" => Ok(AccountSection::Funding),
            "spot" => Ok(AccountSection::Spot),
            "futures" => Ok(AccountSection::Futures),
            _ => Err(format!("Unknown account section: {}", s)),
        }
    }
}

/// 자산 하나의 잔고.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBalance {
    /// 자산 이름 (예: "BTC", "USDT")
    pub asset: String,
    /// 보유 수량
    pub amount: Decimal,
}

/// 정규화된 계좌 잔고 스냅샷.
///
/// 요청마다 생성되며 저장되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// 조회 구분
    pub section: AccountSection,
    /// 잔고가 있는 자산 목록
    pub assets: Vec<AssetBalance>,
    /// 합산 수량
    pub total: Decimal,
}

impl BalanceSnapshot {
    /// 자산 목록에서 스냅샷을 생성합니다 (합산 포함).
    pub fn from_assets(section: AccountSection, assets: Vec<AssetBalance>) -> Self {
        let total = assets.iter().map(|a| a.amount).sum();
        Self {
            section,
            assets,
            total,
        }
    }
}
