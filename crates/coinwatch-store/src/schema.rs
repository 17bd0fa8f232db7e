//! 데이터베이스 스키마 초기화.

use sqlx::SqlitePool;

use crate::error::StoreResult;

/// 필요한 테이블과 인덱스를 생성합니다 (이미 있으면 무시).
pub async fn init_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS credentials (
            user_id    TEXT PRIMARY KEY,
            ciphertext BLOB NOT NULL,
            nonce      BLOB NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monitors (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id     TEXT NOT NULL,
            pair         TEXT NOT NULL,
            market_type  TEXT NOT NULL,
            target_price TEXT NOT NULL,
            direction    TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'active',
            created_at   TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_monitors_owner ON monitors(owner_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_monitors_status ON monitors(status)")
        .execute(pool)
        .await?;

    Ok(())
}
