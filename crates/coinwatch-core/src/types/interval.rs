//! 캔들스틱 데이터를 위한 시간 간격 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 캔들스틱 시간 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KlineInterval {
    /// 1분봉
    M1,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 1시간봉
    H1,
    /// 4시간봉
    H4,
    /// 일봉
    D1,
}

impl Default for KlineInterval {
    fn default() -> Self {
        Self::H1
    }
}

impl KlineInterval {
    /// 이 간격의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            KlineInterval::M1 => Duration::from_secs(60),
            KlineInterval::M5 => Duration::from_secs(5 * 60),
            KlineInterval::M15 => Duration::from_secs(15 * 60),
            KlineInterval::M30 => Duration::from_secs(30 * 60),
            KlineInterval::H1 => Duration::from_secs(60 * 60),
            KlineInterval::H4 => Duration::from_secs(4 * 60 * 60),
            KlineInterval::D1 => Duration::from_secs(24 * 60 * 60),
        }
    }

    /// 바이낸스 간격 문자열로 변환합니다.
    pub fn to_binance_interval(&self) -> &'static str {
        match self {
            KlineInterval::M1 => "1m",
            KlineInterval::M5 => "5m",
            KlineInterval::M15 => "15m",
            KlineInterval::M30 => "30m",
            KlineInterval::H1 => "1h",
            KlineInterval::H4 => "4h",
            KlineInterval::D1 => "1d",
        }
    }

    /// 바이낸스 간격 문자열에서 파싱합니다.
    pub fn from_binance_interval(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(KlineInterval::M1),
            "5m" => Some(KlineInterval::M5),
            "15m" => Some(KlineInterval::M15),
            "30m" => Some(KlineInterval::M30),
            "1h" => Some(KlineInterval::H1),
            "4h" => Some(KlineInterval::H4),
            "1d" => Some(KlineInterval::D1),
            _ => None,
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_binance_interval())
    }
}

impl FromStr for KlineInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_binance_interval(s).ok_or_else(|| format!("Invalid interval: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_roundtrip() {
        assert_eq!(KlineInterval::M15.to_binance_interval(), "15m");
        assert_eq!(
            KlineInterval::from_binance_interval("4h"),
            Some(KlineInterval::H4)
        );
        assert!(KlineInterval::from_binance_interval("2h").is_none());
    }

    #[test]
    fn test_interval_default_is_one_hour() {
        assert_eq!(KlineInterval::default(), KlineInterval::H1);
        assert_eq!(KlineInterval::default().duration().as_secs(), 3600);
    }
}
