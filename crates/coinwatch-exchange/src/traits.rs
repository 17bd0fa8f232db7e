//! 게이트웨이 trait 정의.
//!
//! 모니터 엔진과 계좌 서비스는 이 trait에만 의존하므로
//! 테스트에서 실제 업스트림 없이 동작을 검증할 수 있습니다.

use async_trait::async_trait;
use coinwatch_core::crypto::ApiCredentials;
use coinwatch_core::{AccountSection, BalanceSnapshot, Kline, KlineInterval, MarketType, Pair, PriceQuote};

use crate::GatewayError;

/// 게이트웨이 작업을 위한 Result 타입.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// 공개 시장 데이터 조회 인터페이스.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 거래쌍의 현재가 조회.
    async fn get_price(&self, pair: &Pair, market: MarketType) -> GatewayResult<PriceQuote>;

    /// 거래쌍의 캔들스틱 조회.
    async fn get_klines(
        &self,
        pair: &Pair,
        market: MarketType,
        interval: KlineInterval,
        limit: u32,
    ) -> GatewayResult<Vec<Kline>>;
}

/// 서명이 필요한 계좌 데이터 조회 인터페이스.
///
/// 자격증명은 호출마다 주입되며 게이트웨이에 저장되지 않습니다.
#[async_trait]
pub trait AccountDataSource: Send + Sync {
    /// 계좌 구분별 잔고 스냅샷 조회.
    async fn get_account_balances(
        &self,
        credentials: &ApiCredentials,
        section: AccountSection,
    ) -> GatewayResult<BalanceSnapshot>;
}
