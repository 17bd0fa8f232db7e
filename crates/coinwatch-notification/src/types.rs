//! 알림 타입 및 trait 정의.

use async_trait::async_trait;
use coinwatch_core::Monitor;
use rust_decimal::Decimal;

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification delivery failed: {0}")]
    SendFailed(String),

    #[error("Invalid notification config: {0}")]
    InvalidConfig(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 발동된 모니터의 알림 이벤트.
#[derive(Debug, Clone)]
pub struct MonitorAlert {
    /// 알림 수신자 (모니터 소유자)
    pub owner_id: String,
    /// 모니터 ID
    pub monitor_id: i64,
    /// 알림 메시지 본문
    pub message: String,
}

impl MonitorAlert {
    /// 발동된 모니터와 현재가로 알림을 생성합니다.
    pub fn from_triggered(monitor: &Monitor, current_price: Decimal) -> Self {
        let direction_label = match monitor.direction {
            coinwatch_core::Direction::Up => "올랐습니다",
            coinwatch_core::Direction::Down => "내렸습니다",
        };

        let message = format!(
            "📢 가격 알림: {} ({})\n목표가 {} 까지 {}.\n현재가: {}",
            monitor.pair, monitor.market_type, monitor.target_price, direction_label, current_price
        );

        Self {
            owner_id: monitor.owner_id.clone(),
            monitor_id: monitor.id,
            message,
        }
    }
}

/// 알림 전달 trait.
///
/// 모니터 엔진은 이 trait에만 의존하며, 전달 실패가
/// 모니터 상태 전이를 되돌리지 않습니다.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 알림을 전달합니다.
    async fn notify(&self, alert: &MonitorAlert) -> NotificationResult<()>;

    /// 전달 채널이 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool;

    /// 전달 채널 이름을 반환합니다.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coinwatch_core::{Direction, MarketType, MonitorStatus, Pair};
    use rust_decimal_macros::dec;

    #[test]
    fn test_alert_message_contains_prices() {
        let monitor = Monitor {
            id: 7,
            owner_id: "user-1".to_string(),
            pair: Pair::parse("BTCUSDT").unwrap(),
            market_type: MarketType::Futures,
            target_price: dec!(67000),
            direction: Direction::Up,
            status: MonitorStatus::Triggered,
            created_at: Utc::now(),
        };

        let alert = MonitorAlert::from_triggered(&monitor, dec!(67123.45));

        assert_eq!(alert.owner_id, "user-1");
        assert_eq!(alert.monitor_id, 7);
        assert!(alert.message.contains("BTCUSDT"));
        assert!(alert.message.contains("67000"));
        assert!(alert.message.contains("67123.45"));
    }
}
