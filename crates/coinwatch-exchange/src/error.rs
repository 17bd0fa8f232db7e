//! 게이트웨이 에러 타입.

use thiserror::Error;

/// 마켓 게이트웨이 관련 에러.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 인증/권한 에러 (잘못된 API 키, 권한 부족)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded")]
    RateLimited,

    /// 업스트림이 인식하지 못하는 심볼
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// API 에러 코드
    #[error("API error {code}: {message}")]
    ApiError { code: i32, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::NetworkError(_) | GatewayError::Timeout(_) | GatewayError::RateLimited
        )
    }

    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, GatewayError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(err.to_string())
        } else if err.is_connect() {
            GatewayError::NetworkError(err.to_string())
        } else {
            GatewayError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::ParseError(err.to_string())
    }
}
