//! # Coinwatch Notification
//!
//! 발동된 가격 모니터의 알림 전달 크레이트.
//!
//! 전달 채널은 `NotificationSink` trait 뒤에 숨겨져 있으며,
//! 기본 구현으로 챗 브리지 웹훅(`WebhookSink`)을 제공합니다.

pub mod types;
pub mod webhook;

pub use types::{MonitorAlert, NotificationError, NotificationResult, NotificationSink};
pub use webhook::WebhookSink;
