//! 웹훅 알림 전달.
//!
//! 챗 브리지의 수신 웹훅으로 알림을 POST합니다.

use async_trait::async_trait;
use coinwatch_core::NotificationConfig;
use serde::Serialize;
use tracing::{debug, info};

use crate::types::{MonitorAlert, NotificationError, NotificationResult, NotificationSink};

/// 웹훅 요청 본문.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    owner_id: &'a str,
    monitor_id: i64,
    message: &'a str,
}

/// 웹훅 알림 전달기.
pub struct WebhookSink {
    config: NotificationConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    /// 새 웹훅 전달기를 생성합니다.
    ///
    /// # Errors
    /// 활성화 상태인데 URL이 비어 있으면 `InvalidConfig`를 반환합니다.
    pub fn new(config: NotificationConfig) -> NotificationResult<Self> {
        if config.enabled && config.webhook_url.is_empty() {
            return Err(NotificationError::InvalidConfig(
                "webhook_url is required when notifications are enabled".to_string(),
            ));
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn notify(&self, alert: &MonitorAlert) -> NotificationResult<()> {
        if !self.config.enabled {
            debug!("Webhook sink disabled, skipping alert for monitor {}", alert.monitor_id);
            return Ok(());
        }

        let payload = WebhookPayload {
            owner_id: &alert.owner_id,
            monitor_id: alert.monitor_id,
            message: &alert.message,
        };

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotificationError::SendFailed(format!(
                "Webhook returned status {}",
                response.status()
            )));
        }

        info!(
            "Alert delivered: monitor={}, owner={}",
            alert.monitor_id, alert.owner_id
        );
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
