//! OHLCV 캔들스틱 데이터.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들 하나.
///
/// 요청마다 생성되는 일회성 값으로, 저장되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kline {
    /// 캔들 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량 (기준 자산 단위)
    pub volume: Decimal,
}

impl Kline {
    /// 시가 대비 종가 변동률(%)을 반환합니다.
    ///
    /// 시가가 0이면 `None`을 반환합니다.
    pub fn change_percent(&self) -> Option<Decimal> {
        if self.open.is_zero() {
            return None;
        }
        Some((self.close - self.open) / self.open * Decimal::ONE_HUNDRED)
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}
