//! 가격 모니터 엔진.
//!
//! 주기적으로 활성 모니터를 스윕하여 시세를 조회하고,
//! 목표 조건을 만족한 모니터를 발동시킵니다.
//!
//! # 설계 원칙
//! - 동일한 (거래쌍, 마켓) 조합의 시세는 스윕당 한 번만 조회합니다
//! - 상태 전이(`mark_triggered`)가 알림 전송보다 먼저 일어납니다.
//!   알림 실패는 로그로만 남고 전이를 되돌리지 않습니다
//! - 거래쌍 하나의 조회 실패가 다른 거래쌍의 평가를 막지 않습니다

use std::collections::HashMap;
use std::sync::Arc;

use coinwatch_core::{MarketType, Monitor, MonitorConfig};
use coinwatch_exchange::MarketDataSource;
use coinwatch_notification::{MonitorAlert, NotificationSink};
use coinwatch_store::{MonitorRegistry, StoreError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::ServiceResult;

/// 스윕 실행 통계.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStats {
    /// 평가 대상 모니터 수
    pub evaluated: usize,
    /// 시세 조회 횟수 (중복 제거 후)
    pub fetched: usize,
    /// 발동된 모니터 수
    pub triggered: usize,
    /// 조회/전이 실패 수
    pub errors: usize,
}

impl SweepStats {
    /// 스윕 결과를 로그로 남깁니다.
    pub fn log_summary(&self) {
        info!(
            "Sweep complete: evaluated={}, fetched={}, triggered={}, errors={}",
            self.evaluated, self.fetched, self.triggered, self.errors
        );
    }
}

/// 가격 모니터 엔진.
pub struct MonitorEngine {
    registry: Arc<MonitorRegistry>,
    market_data: Arc<dyn MarketDataSource>,
    sink: Arc<dyn NotificationSink>,
    config: MonitorConfig,
}

impl MonitorEngine {
    /// 새 엔진 생성.
    pub fn new(
        registry: Arc<MonitorRegistry>,
        market_data: Arc<dyn MarketDataSource>,
        sink: Arc<dyn NotificationSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            registry,
            market_data,
            sink,
            config,
        }
    }

    /// 스윕 한 번 실행.
    ///
    /// 활성 모니터 스냅샷을 (거래쌍, 마켓)별로 묶어 시세를 조회한 뒤
    /// 각 모니터의 목표 조건을 평가합니다.
    pub async fn sweep(&self) -> ServiceResult<SweepStats> {
        let monitors = self.registry.all_active().await?;

        let mut stats = SweepStats {
            evaluated: monitors.len(),
            ..Default::default()
        };

        if monitors.is_empty() {
            debug!("No active monitors, skipping sweep");
            return Ok(stats);
        }

        // (거래쌍, 마켓)별로 묶어 중복 조회 제거
        let mut groups: HashMap<(String, MarketType), Vec<Monitor>> = HashMap::new();
        for monitor in monitors {
            groups
                .entry((monitor.pair.as_str().to_string(), monitor.market_type))
                .or_default()
                .push(monitor);
        }
        stats.fetched = groups.len();

        // 동시 조회 상한 내에서 병렬로 시세 조회
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches));
        let mut handles = Vec::with_capacity(groups.len());

        for ((_, market), group) in groups {
            let market_data = Arc::clone(&self.market_data);
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                // 세마포어는 스윕 동안 닫히지 않음
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let pair = group[0].pair.clone();
                let result = market_data.get_price(&pair, market).await;
                (group, result)
            }));
        }

        for handle in handles {
            let (group, result) = match handle.await {
                Ok(pair_result) => pair_result,
                Err(e) => {
                    error!("Price fetch task failed: {}", e);
                    stats.errors += 1;
                    continue;
                }
            };

            let quote = match result {
                Ok(quote) => quote,
                Err(e) => {
                    // 거래쌍 하나의 실패는 해당 그룹만 건너뜀
                    error!(
                        "Price fetch failed for {} ({}): {}",
                        group[0].pair, group[0].market_type, e
                    );
                    stats.errors += 1;
                    continue;
                }
            };

            for monitor in group {
                if !monitor.is_crossed(quote.price) {
                    continue;
                }

                // 전이가 알림보다 먼저: 전이 실패 시 알림을 보내지 않음
                match self.registry.mark_triggered(monitor.id).await {
                    Ok(()) => {
                        stats.triggered += 1;
                        let alert = MonitorAlert::from_triggered(&monitor, quote.price);
                        if let Err(e) = self.sink.notify(&alert).await {
                            error!("Alert delivery failed for monitor {}: {}", monitor.id, e);
                        }
                    }
                    Err(StoreError::AlreadyFinal(id)) | Err(StoreError::NotFound(id)) => {
                        // 스윕 도중 취소/삭제된 모니터는 알림 없이 무시
                        debug!("Monitor {} left active set during sweep", id);
                    }
                    Err(e) => {
                        error!("State transition failed for monitor {}: {}", monitor.id, e);
                        stats.errors += 1;
                    }
                }
            }
        }

        Ok(stats)
    }

    /// 엔진 메인 루프.
    ///
    /// CancellationToken을 통해 graceful shutdown을 지원합니다.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.sweep_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            "Monitor engine started (interval: {}s)",
            self.config.sweep_interval_secs
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep().await {
                        Ok(stats) => stats.log_summary(),
                        Err(e) => error!("Sweep failed: {}", e),
                    }
                }

                _ = shutdown.cancelled() => {
                    info!("Monitor engine stopped");
                    break;
                }
            }
        }
    }
}

/// 엔진을 백그라운드 태스크로 시작합니다.
pub fn start_monitor_engine(engine: MonitorEngine, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(engine.run(shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coinwatch_core::{Direction, Kline, KlineInterval, MonitorStatus, Pair, PriceQuote};
    use coinwatch_exchange::{GatewayError, GatewayResult};
    use coinwatch_notification::{NotificationError, NotificationResult};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockMarketData {
        prices: HashMap<String, Decimal>,
        calls: AtomicUsize,
    }

    impl MockMarketData {
        fn new(prices: &[(&str, Decimal)]) -> Self {
            Self {
                prices: prices
                    .iter()
                    .map(|(pair, price)| (pair.to_string(), *price))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataSource for MockMarketData {
        async fn get_price(&self, pair: &Pair, market: MarketType) -> GatewayResult<PriceQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prices
                .get(pair.as_str())
                .map(|price| PriceQuote::new(pair.clone(), market, *price))
                .ok_or_else(|| GatewayError::InvalidSymbol(pair.as_str().to_string()))
        }

        async fn get_klines(
            &self,
            _pair: &Pair,
            _market: MarketType,
            _interval: KlineInterval,
            _limit: u32,
        ) -> GatewayResult<Vec<Kline>> {
            Ok(Vec::new())
        }
    }

    struct MockSink {
        alerts: Mutex<Vec<MonitorAlert>>,
        fail: bool,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                alerts: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                alerts: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl NotificationSink for MockSink {
        async fn notify(&self, alert: &MonitorAlert) -> NotificationResult<()> {
            if self.fail {
                return Err(NotificationError::SendFailed("mock failure".to_string()));
            }
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    async fn test_registry() -> Arc<MonitorRegistry> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        coinwatch_store::init_schema(&pool).await.unwrap();
        Arc::new(MonitorRegistry::new(pool))
    }

    fn test_config() -> MonitorConfig {
        MonitorConfig {
            sweep_interval_secs: 60,
            max_concurrent_fetches: 4,
        }
    }

    fn pair(s: &str) -> Pair {
        Pair::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_sweep_dedupes_price_fetches() {
        let registry = test_registry().await;
        // BTCUSDT/spot 3개, BTCUSDT/futures 1개, ETHUSDT/spot 1개 = 조회 3회
        for target in [dec!(90000), dec!(91000), dec!(92000)] {
            registry
                .create("user-1", pair("BTCUSDT"), MarketType::Spot, target, Direction::Up)
                .await
                .unwrap();
        }
        registry
            .create("user-1", pair("BTCUSDT"), MarketType::Futures, dec!(90000), Direction::Up)
            .await
            .unwrap();
        registry
            .create("user-2", pair("ETHUSDT"), MarketType::Spot, dec!(9000), Direction::Up)
            .await
            .unwrap();

        let market_data = Arc::new(MockMarketData::new(&[
            ("BTCUSDT", dec!(67000)),
            ("ETHUSDT", dec!(3500)),
        ]));
        let sink = Arc::new(MockSink::new());
        let engine = MonitorEngine::new(registry, market_data.clone(), sink, test_config());

        let stats = engine.sweep().await.unwrap();

        assert_eq!(stats.evaluated, 5);
        assert_eq!(stats.fetched, 3);
        assert_eq!(market_data.calls.load(Ordering::SeqCst), 3);
        assert_eq!(stats.triggered, 0);
    }

    #[tokio::test]
    async fn test_sweep_completes_with_single_permit() {
        let registry = test_registry().await;
        for pair_name in ["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT"] {
            registry
                .create("user-1", pair(pair_name), MarketType::Spot, dec!(1), Direction::Up)
                .await
                .unwrap();
        }

        let market_data = Arc::new(MockMarketData::new(&[
            ("BTCUSDT", dec!(67000)),
            ("ETHUSDT", dec!(3500)),
            ("SOLUSDT", dec!(150)),
            ("XRPUSDT", dec!(2)),
        ]));
        let sink = Arc::new(MockSink::new());
        let engine = MonitorEngine::new(
            registry,
            market_data.clone(),
            sink,
            MonitorConfig {
                sweep_interval_secs: 60,
                max_concurrent_fetches: 1,
            },
        );

        // 동시 조회 상한 1에서도 모든 그룹이 순차적으로 조회됨
        let stats = engine.sweep().await.unwrap();

        assert_eq!(stats.fetched, 4);
        assert_eq!(stats.triggered, 4);
        assert_eq!(market_data.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_sweep_triggers_and_notifies() {
        let registry = test_registry().await;
        let up = registry
            .create("user-1", pair("BTCUSDT"), MarketType::Spot, dec!(67000), Direction::Up)
            .await
            .unwrap();
        let down = registry
            .create("user-1", pair("BTCUSDT"), MarketType::Spot, dec!(70000), Direction::Down)
            .await
            .unwrap();
        let untouched = registry
            .create("user-1", pair("BTCUSDT"), MarketType::Spot, dec!(80000), Direction::Up)
            .await
            .unwrap();

        let market_data = Arc::new(MockMarketData::new(&[("BTCUSDT", dec!(67123.45))]));
        let sink = Arc::new(MockSink::new());
        let engine =
            MonitorEngine::new(registry.clone(), market_data, sink.clone(), test_config());

        let stats = engine.sweep().await.unwrap();

        assert_eq!(stats.triggered, 2);

        let monitors = registry.list("user-1").await.unwrap();
        let status_of = |id: i64| {
            monitors
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.status)
                .unwrap()
        };
        assert_eq!(status_of(up.id), MonitorStatus::Triggered);
        assert_eq!(status_of(down.id), MonitorStatus::Triggered);
        assert_eq!(status_of(untouched.id), MonitorStatus::Active);

        let alerts = sink.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.owner_id == "user-1"));
    }

    #[tokio::test]
    async fn test_sweep_isolates_pair_failures() {
        let registry = test_registry().await;
        registry
            .create("user-1", pair("NOPEUSDT"), MarketType::Spot, dec!(1), Direction::Up)
            .await
            .unwrap();
        let good = registry
            .create("user-1", pair("ETHUSDT"), MarketType::Spot, dec!(3000), Direction::Up)
            .await
            .unwrap();

        // NOPEUSDT는 조회 실패, ETHUSDT는 정상
        let market_data = Arc::new(MockMarketData::new(&[("ETHUSDT", dec!(3500))]));
        let sink = Arc::new(MockSink::new());
        let engine =
            MonitorEngine::new(registry.clone(), market_data, sink.clone(), test_config());

        let stats = engine.sweep().await.unwrap();

        assert_eq!(stats.errors, 1);
        assert_eq!(stats.triggered, 1);

        let monitors = registry.list("user-1").await.unwrap();
        let eth = monitors.iter().find(|m| m.id == good.id).unwrap();
        assert_eq!(eth.status, MonitorStatus::Triggered);
    }

    #[tokio::test]
    async fn test_notify_failure_does_not_revert_trigger() {
        let registry = test_registry().await;
        let m = registry
            .create("user-1", pair("BTCUSDT"), MarketType::Spot, dec!(60000), Direction::Up)
            .await
            .unwrap();

        let market_data = Arc::new(MockMarketData::new(&[("BTCUSDT", dec!(67000))]));
        let sink = Arc::new(MockSink::failing());
        let engine = MonitorEngine::new(registry.clone(), market_data, sink, test_config());

        let stats = engine.sweep().await.unwrap();

        // 알림 실패와 무관하게 발동 상태 유지 (재발동 없음)
        assert_eq!(stats.triggered, 1);
        let monitors = registry.list("user-1").await.unwrap();
        assert_eq!(monitors[0].status, MonitorStatus::Triggered);

        // 다음 스윕에서 다시 발동되지 않음
        assert_eq!(monitors.iter().filter(|mm| mm.id == m.id).count(), 1);
        let market_data = Arc::new(MockMarketData::new(&[("BTCUSDT", dec!(67000))]));
        let engine = MonitorEngine::new(
            registry.clone(),
            market_data,
            Arc::new(MockSink::new()),
            test_config(),
        );
        let stats = engine.sweep().await.unwrap();
        assert_eq!(stats.evaluated, 0);
        assert_eq!(stats.triggered, 0);
    }

    #[tokio::test]
    async fn test_engine_run_stops_on_cancellation() {
        let registry = test_registry().await;
        let market_data = Arc::new(MockMarketData::new(&[]));
        let sink = Arc::new(MockSink::new());
        let engine = MonitorEngine::new(
            registry,
            market_data,
            sink,
            MonitorConfig {
                sweep_interval_secs: 3600,
                max_concurrent_fetches: 1,
            },
        );

        let shutdown = CancellationToken::new();
        let handle = start_monitor_engine(engine, shutdown.clone());

        shutdown.cancel();
        handle.await.unwrap();
    }
}
