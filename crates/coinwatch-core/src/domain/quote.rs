//! 현재가 시세 데이터.

use crate::types::{MarketType, Pair};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 단일 거래쌍의 현재가.
///
/// 요청마다 생성되는 일회성 값으로, 저장되지 않습니다.
/// 가격은 비교 오차를 피하기 위해 항상 `Decimal`로 파싱됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    /// 거래쌍
    pub pair: Pair,
    /// 마켓 유형
    pub market_type: MarketType,
    /// 현재가
    pub price: Decimal,
    /// 조회 시각
    pub timestamp: DateTime<Utc>,
}

impl PriceQuote {
    /// 새 시세를 생성합니다.
    pub fn new(pair: Pair, market_type: MarketType, price: Decimal) -> Self {
        Self {
            pair,
            market_type,
            price,
            timestamp: Utc::now(),
        }
    }
}
