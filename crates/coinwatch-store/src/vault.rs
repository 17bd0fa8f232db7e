//! 자격증명 볼트.
//!
//! 사용자별 API 자격증명을 AES-256-GCM으로 봉인하여 저장합니다.
//!
//! # 보안 설계
//! - 평문 자격증명은 `resolve()` 호출 경로에서만 일시적으로 존재합니다
//! - 캐싱하지 않으며, 호출마다 복호화합니다
//! - 키 값은 로그에 기록되지 않습니다 (길이 포함)
//! - 복호화 실패는 `Decryption`으로 보고되며 `NotBound`와 구분됩니다

use chrono::Utc;
use coinwatch_core::crypto::ApiCredentials;
use coinwatch_core::CredentialEncryptor;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// API 키/시크릿 키의 최소 길이.
const MIN_KEY_LENGTH: usize = 20;

/// 자격증명 볼트.
pub struct CredentialVault {
    pool: SqlitePool,
    encryptor: CredentialEncryptor,
}

impl CredentialVault {
    /// 새 볼트 생성.
    pub fn new(pool: SqlitePool, encryptor: CredentialEncryptor) -> Self {
        Self { pool, encryptor }
    }

    /// 자격증명 형식 검증.
    ///
    /// 형식 검증에 실패하면 아무것도 저장하지 않습니다.
    fn validate_format(api_key: &str, secret_key: &str) -> StoreResult<()> {
        if api_key.len() < MIN_KEY_LENGTH {
            return Err(StoreError::InvalidKeyFormat(format!(
                "API key too short (minimum {} characters)",
                MIN_KEY_LENGTH
            )));
        }
        if secret_key.len() < MIN_KEY_LENGTH {
            return Err(StoreError::InvalidKeyFormat(format!(
                "Secret key too short (minimum {} characters)",
                MIN_KEY_LENGTH
            )));
        }
        Ok(())
    }

    /// 사용자 자격증명 등록.
    ///
    /// 이미 등록된 사용자는 새 자격증명으로 교체됩니다.
    pub async fn bind(&self, user_id: &str, api_key: &str, secret_key: &str) -> StoreResult<()> {
        Self::validate_format(api_key, secret_key)?;

        let sealed = self
            .encryptor
            .seal(&ApiCredentials::new(api_key, secret_key))?;

        sqlx::query(
            r#"
            INSERT INTO credentials (user_id, ciphertext, nonce, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                ciphertext = excluded.ciphertext,
                nonce = excluded.nonce,
                created_at = excluded.created_at
            "#,
        )
        .bind(user_id)
        .bind(&sealed.ciphertext)
        .bind(sealed.nonce.as_slice())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!("Credentials bound for user: {}", user_id);
        Ok(())
    }

    /// 사용자 자격증명 삭제.
    pub async fn unbind(&self, user_id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM credentials WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotBound(user_id.to_string()));
        }

        info!("Credentials unbound for user: {}", user_id);
        Ok(())
    }

    /// 사용자 자격증명 복호화 조회.
    pub async fn resolve(&self, user_id: &str) -> StoreResult<ApiCredentials> {
        let row: Option<(Vec<u8>, Vec<u8>)> =
            sqlx::query_as("SELECT ciphertext, nonce FROM credentials WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let (ciphertext, nonce) = row.ok_or_else(|| StoreError::NotBound(user_id.to_string()))?;

        Ok(self.encryptor.open(&ciphertext, &nonce)?)
    }

    /// 자격증명 등록 여부 확인.
    pub async fn is_bound(&self, user_id: &str) -> StoreResult<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM credentials WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }
}
