//! 서비스 에러 타입.

use coinwatch_exchange::GatewayError;
use coinwatch_notification::NotificationError;
use coinwatch_store::StoreError;
use thiserror::Error;

/// 서비스 계층 에러.
///
/// 하위 계층의 에러를 그대로 감싸서 호출자가 원인을 구분할 수 있게 합니다.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}

/// 서비스 작업을 위한 Result 타입.
pub type ServiceResult<T> = Result<T, ServiceError>;
