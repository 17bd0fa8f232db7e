//! 설정 관리.
//!
//! TOML 파일 위에 `COINWATCH__` 접두사 환경변수를 덮어쓰는 방식으로
//! 애플리케이션 설정을 로드합니다.

use crate::types::MarketType;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 마켓별 업스트림 엔드포인트 설정
    #[serde(default)]
    pub markets: MarketsConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 자격증명 볼트 설정
    pub vault: VaultConfig,
    /// 모니터 엔진 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 알림 전달 설정
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// 마켓별 엔드포인트 설정.
///
/// 네 가지 마켓 유형의 기본 URL을 독립적으로 설정할 수 있습니다.
/// URL 선택은 게이트웨이 경계에서 한 번만 일어납니다.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsConfig {
    /// 현물 API 기본 URL
    pub spot_base_url: String,
    /// 선물 API 기본 URL
    pub futures_base_url: String,
    /// 마진 API 기본 URL
    pub margin_base_url: String,
    /// 알파 토큰 API 기본 URL
    pub alpha_base_url: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            spot_base_url: "https://api.binance.com".to_string(),
            futures_base_url: "https://fapi.binance.com".to_string(),
            margin_base_url: "https://api.binance.com".to_string(),
            alpha_base_url: "https://api.binance.com".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl MarketsConfig {
    /// 마켓 유형에 해당하는 기본 URL 반환.
    pub fn base_url(&self, market: MarketType) -> &str {
        match market {
            MarketType::Spot => &self.spot_base_url,
            MarketType::Futures => &self.futures_base_url,
            MarketType::Margin => &self.margin_base_url,
            MarketType::Alpha => &self.alpha_base_url,
        }
    }

    /// 요청 타임아웃을 Duration으로 반환.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 연결 URL
    pub url: String,
    /// 최대 연결 수
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/coinwatch.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 자격증명 볼트 설정.
#[derive(Debug, Deserialize)]
pub struct VaultConfig {
    /// Base64로 인코딩된 32바이트 마스터 키.
    ///
    /// `coinwatch-service generate-key`로 생성할 수 있으며,
    /// 사용자 입력에서 유도되지 않습니다.
    pub master_key: SecretString,
}

/// 모니터 엔진 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// 스윕 실행 주기 (초)
    pub sweep_interval_secs: u64,
    /// 스윕 내 동시 시세 조회 상한
    pub max_concurrent_fetches: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
            max_concurrent_fetches: 4,
        }
    }
}

impl MonitorConfig {
    /// 스윕 주기를 Duration으로 반환.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// 알림 전달 설정.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationConfig {
    /// 알림 활성화 여부
    pub enabled: bool,
    /// 챗 브리지 웹훅 URL
    #[serde(default)]
    pub webhook_url: String,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (없으면 기본값 + 환경변수만 사용)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("COINWATCH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
