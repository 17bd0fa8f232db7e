//! 계좌 잔고 조회 서비스.
//!
//! 볼트에서 자격증명을 복호화한 뒤 게이트웨이로 잔고를 조회합니다.
//!
//! # 보안 설계
//! - 자격증명 미등록/복호화 실패는 업스트림 호출 전에 반환됩니다
//! - 평문 자격증명은 이 호출 경로 안에서만 존재하며 저장되지 않습니다

use std::sync::Arc;

use coinwatch_core::{AccountSection, BalanceSnapshot};
use coinwatch_exchange::AccountDataSource;
use coinwatch_store::CredentialVault;
use tracing::debug;

use crate::error::ServiceResult;

/// 계좌 잔고 조회 서비스.
pub struct AccountService {
    vault: Arc<CredentialVault>,
    source: Arc<dyn AccountDataSource>,
}

impl AccountService {
    /// 새 서비스 생성.
    pub fn new(vault: Arc<CredentialVault>, source: Arc<dyn AccountDataSource>) -> Self {
        Self { vault, source }
    }

    /// 사용자의 계좌 잔고 스냅샷 조회.
    ///
    /// # Errors
    /// - 자격증명이 없으면 `StoreError::NotBound` (네트워크 호출 없음)
    /// - 복호화에 실패하면 `StoreError::Decryption` (네트워크 호출 없음)
    /// - 업스트림 인증 실패는 `GatewayError::Unauthorized`
    pub async fn get_balances(
        &self,
        user_id: &str,
        section: AccountSection,
    ) -> ServiceResult<BalanceSnapshot> {
        let credentials = self.vault.resolve(user_id).await?;

        debug!("Fetching {} balances for user: {}", section, user_id);
        let snapshot = self.source.get_account_balances(&credentials, section).await?;

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use async_trait::async_trait;
    use coinwatch_core::crypto::ApiCredentials;
    use coinwatch_core::{generate_master_key, AssetBalance, CredentialEncryptor};
    use coinwatch_exchange::GatewayResult;
    use coinwatch_store::StoreError;
    use rust_decimal_macros::dec;
    use secrecy::SecretString;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockAccountSource {
        calls: AtomicUsize,
        expected_api_key: String,
    }

    #[async_trait]
    impl AccountDataSource for MockAccountSource {
        async fn get_account_balances(
            &self,
            credentials: &ApiCredentials,
            section: AccountSection,
        ) -> GatewayResult<BalanceSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(credentials.api_key, self.expected_api_key);
            Ok(BalanceSnapshot::from_assets(
                section,
                vec![AssetBalance {
                    asset: "USDT".to_string(),
                    amount: dec!(100),
                }],
            ))
        }
    }

    const API_KEY: &str = "test-api-key-1234567890abcdef";
    const SECRET_KEY: &str = "test-secret-key-1234567890abcdef";

    async fn test_vault() -> Arc<CredentialVault> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        coinwatch_store::init_schema(&pool).await.unwrap();

        let key = SecretString::from(generate_master_key());
        Arc::new(CredentialVault::new(
            pool,
            CredentialEncryptor::new(&key).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_unbound_user_short_circuits_before_network() {
        let vault = test_vault().await;
        let source = Arc::new(MockAccountSource {
            calls: AtomicUsize::new(0),
            expected_api_key: API_KEY.to_string(),
        });
        let service = AccountService::new(vault, source.clone());

        let result = service.get_balances("nobody", AccountSection::Spot).await;

        assert!(matches!(
            result,
            Err(ServiceError::Store(StoreError::NotBound(_)))
        ));
        // 업스트림 호출이 전혀 없어야 함
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bound_user_gets_snapshot() {
        let vault = test_vault().await;
        vault.bind("user-1", API_KEY, SECRET_KEY).await.unwrap();

        let source = Arc::new(MockAccountSource {
            calls: AtomicUsize::new(0),
            expected_api_key: API_KEY.to_string(),
        });
        let service = AccountService::new(vault, source.clone());

        let snapshot = service
            .get_balances("user-1", AccountSection::Overview)
            .await
            .unwrap();

        assert_eq!(snapshot.section, AccountSection::Overview);
        assert_eq!(snapshot.total, dec!(100));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
