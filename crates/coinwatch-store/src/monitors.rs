//! 모니터 레지스트리.
//!
//! 가격 모니터의 생성/취소/조회와 상태 전이를 관리합니다.
//!
//! # 상태 전이
//! 모든 전이는 `status = 'active'` 조건부 UPDATE로 수행되어,
//! 엔진의 발동과 사용자의 취소가 경합해도 한쪽만 성공합니다.

use chrono::{DateTime, Utc};
use coinwatch_core::{Direction, MarketType, Monitor, MonitorStatus, Pair};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// DB에서 조회한 모니터 row.
#[derive(sqlx::FromRow)]
struct MonitorRow {
    id: i64,
    owner_id: String,
    pair: String,
    market_type: String,
    target_price: String,
    direction: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl MonitorRow {
    /// 저장 형식을 도메인 모델로 변환.
    fn into_monitor(self) -> StoreResult<Monitor> {
        let corrupt = |field: &str| StoreError::Corrupt(format!("monitor {}: {}", self.id, field));

        Ok(Monitor {
            id: self.id,
            pair: Pair::parse(&self.pair).map_err(|_| corrupt("pair"))?,
            market_type: self.market_type.parse().map_err(|_| corrupt("market_type"))?,
            target_price: self
                .target_price
                .parse::<Decimal>()
                .map_err(|_| corrupt("target_price"))?,
            direction: self.direction.parse().map_err(|_| corrupt("direction"))?,
            status: self.status.parse().map_err(|_| corrupt("status"))?,
            owner_id: self.owner_id,
            created_at: self.created_at,
        })
    }
}

const SELECT_MONITOR: &str = r#"
    SELECT id, owner_id, pair, market_type, target_price, direction, status, created_at
    FROM monitors
"#;

/// 모니터 레지스트리.
pub struct MonitorRegistry {
    pool: SqlitePool,
}

impl MonitorRegistry {
    /// 새 레지스트리 생성.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 모니터 생성.
    pub async fn create(
        &self,
        owner_id: &str,
        pair: Pair,
        market_type: MarketType,
        target_price: Decimal,
        direction: Direction,
    ) -> StoreResult<Monitor> {
        if target_price <= Decimal::ZERO {
            return Err(StoreError::InvalidTargetPrice(target_price));
        }

        let created_at = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO monitors (owner_id, pair, market_type, target_price, direction, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(pair.as_str())
        .bind(market_type.as_str())
        .bind(target_price.to_string())
        .bind(direction.as_str())
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Monitor created: id={}, owner={}, pair={}, target={}, direction={}",
            id, owner_id, pair, target_price, direction
        );

        Ok(Monitor {
            id,
            owner_id: owner_id.to_string(),
            pair,
            market_type,
            target_price,
            direction,
            status: MonitorStatus::Active,
            created_at,
        })
    }

    /// 모니터 취소 (소유자만 가능).
    pub async fn cancel(&self, owner_id: &str, id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE monitors SET status = 'cancelled' WHERE id = ?1 AND owner_id = ?2 AND status = 'active'",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            info!("Monitor cancelled: id={}, owner={}", id, owner_id);
            return Ok(());
        }

        // 실패 원인 구분: 미존재 / 타인 소유 / 이미 종단 상태
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT owner_id, status FROM monitors WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Err(StoreError::NotFound(id)),
            Some((owner, _)) if owner != owner_id => Err(StoreError::NotOwner(id)),
            Some(_) => Err(StoreError::AlreadyFinal(id)),
        }
    }

    /// 사용자의 전체 모니터 조회 (종단 상태 포함).
    pub async fn list(&self, owner_id: &str) -> StoreResult<Vec<Monitor>> {
        let rows: Vec<MonitorRow> =
            sqlx::query_as(&format!("{} WHERE owner_id = ?1 ORDER BY id", SELECT_MONITOR))
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(MonitorRow::into_monitor).collect()
    }

    /// 사용자의 활성 모니터 조회.
    pub async fn list_active(&self, owner_id: &str) -> StoreResult<Vec<Monitor>> {
        let rows: Vec<MonitorRow> = sqlx::query_as(&format!(
            "{} WHERE owner_id = ?1 AND status = 'active' ORDER BY id",
            SELECT_MONITOR
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MonitorRow::into_monitor).collect()
    }

    /// 전체 활성 모니터 조회 (스윕용).
    pub async fn all_active(&self) -> StoreResult<Vec<Monitor>> {
        let rows: Vec<MonitorRow> =
            sqlx::query_as(&format!("{} WHERE status = 'active' ORDER BY id", SELECT_MONITOR))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(MonitorRow::into_monitor).collect()
    }

    /// 모니터를 발동 상태로 전이 (엔진 전용).
    ///
    /// 이미 발동된 모니터에 대해서는 멱등하게 `Ok`를 반환하고,
    /// 취소된 모니터는 `AlreadyFinal`로 거부합니다.
    pub async fn mark_triggered(&self, id: i64) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE monitors SET status = 'triggered' WHERE id = ?1 AND status = 'active'")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 1 {
            info!("Monitor triggered: id={}", id);
            return Ok(());
        }

        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM monitors WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match status.as_ref().map(|(s,)| s.as_str()) {
            None => Err(StoreError::NotFound(id)),
            Some("triggered") => Ok(()),
            Some(_) => Err(StoreError::AlreadyFinal(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_registry() -> MonitorRegistry {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::schema::init_schema(&pool).await.unwrap();
        MonitorRegistry::new(pool)
    }

    fn btcusdt() -> Pair {
        Pair::parse("BTCUSDT").unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let registry = test_registry().await;

        let m = registry
            .create("user-1", btcusdt(), MarketType::Spot, dec!(50000), Direction::Up)
            .await
            .unwrap();
        assert_eq!(m.status, MonitorStatus::Active);

        let monitors = registry.list("user-1").await.unwrap();
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].id, m.id);
        assert_eq!(monitors[0].target_price, dec!(50000));
        assert_eq!(monitors[0].direction, Direction::Up);
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_target() {
        let registry = test_registry().await;

        let result = registry
            .create("user-1", btcusdt(), MarketType::Spot, dec!(0), Direction::Up)
            .await;
        assert!(matches!(result, Err(StoreError::InvalidTargetPrice(_))));

        let result = registry
            .create("user-1", btcusdt(), MarketType::Spot, dec!(-1), Direction::Down)
            .await;
        assert!(matches!(result, Err(StoreError::InvalidTargetPrice(_))));
    }

    #[tokio::test]
    async fn test_cancel_requires_ownership() {
        let registry = test_registry().await;
        let m = registry
            .create("user-1", btcusdt(), MarketType::Spot, dec!(50000), Direction::Up)
            .await
            .unwrap();

        let result = registry.cancel("user-2", m.id).await;
        assert!(matches!(result, Err(StoreError::NotOwner(_))));

        // 소유자는 취소 가능
        registry.cancel("user-1", m.id).await.unwrap();
        let monitors = registry.list("user-1").await.unwrap();
        assert_eq!(monitors[0].status, MonitorStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_missing_monitor() {
        let registry = test_registry().await;

        let result = registry.cancel("user-1", 999).await;
        assert!(matches!(result, Err(StoreError::NotFound(999))));
    }

    #[tokio::test]
    async fn test_cancel_terminal_monitor() {
        let registry = test_registry().await;
        let m = registry
            .create("user-1", btcusdt(), MarketType::Spot, dec!(50000), Direction::Up)
            .await
            .unwrap();

        registry.cancel("user-1", m.id).await.unwrap();
        let result = registry.cancel("user-1", m.id).await;
        assert!(matches!(result, Err(StoreError::AlreadyFinal(_))));
    }

    #[tokio::test]
    async fn test_mark_triggered_is_idempotent() {
        let registry = test_registry().await;
        let m = registry
            .create("user-1", btcusdt(), MarketType::Futures, dec!(67000), Direction::Up)
            .await
            .unwrap();

        registry.mark_triggered(m.id).await.unwrap();
        // 두 번째 호출도 성공 (멱등)
        registry.mark_triggered(m.id).await.unwrap();

        let monitors = registry.list("user-1").await.unwrap();
        assert_eq!(monitors[0].status, MonitorStatus::Triggered);
    }

    #[tokio::test]
    async fn test_mark_triggered_rejects_cancelled() {
        let registry = test_registry().await;
        let m = registry
            .create("user-1", btcusdt(), MarketType::Spot, dec!(50000), Direction::Down)
            .await
            .unwrap();

        registry.cancel("user-1", m.id).await.unwrap();

        let result = registry.mark_triggered(m.id).await;
        assert!(matches!(result, Err(StoreError::AlreadyFinal(_))));
    }

    #[tokio::test]
    async fn test_active_listings_exclude_terminal() {
        let registry = test_registry().await;
        let a = registry
            .create("user-1", btcusdt(), MarketType::Spot, dec!(50000), Direction::Up)
            .await
            .unwrap();
        let b = registry
            .create("user-1", btcusdt(), MarketType::Spot, dec!(40000), Direction::Down)
            .await
            .unwrap();
        registry
            .create("user-2", btcusdt(), MarketType::Futures, dec!(60000), Direction::Up)
            .await
            .unwrap();

        registry.mark_triggered(a.id).await.unwrap();

        let active = registry.list_active("user-1").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);

        // 전체 활성 조회는 사용자 구분 없이 반환
        let all = registry.all_active().await.unwrap();
        assert_eq!(all.len(), 2);

        // 종단 상태도 이력으로 조회 가능
        let full = registry.list("user-1").await.unwrap();
        assert_eq!(full.len(), 2);
    }
}
