//! Common types for the dashboard client
//!
//! Data transfer records exchanged with the monitoring API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cryptocurrency price snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoCurrency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_1h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_7d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume: Option<f64>,
    /// Server timestamp, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Direction of a percentage change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Unknown,
}

impl CryptoCurrency {
    /// Classify the 24h change. Zero counts as down.
    pub fn trend_24h(&self) -> Trend {
        match self.price_change_24h {
            Some(v) if v > 0.0 => Trend::Up,
            Some(_) => Trend::Down,
            None => Trend::Unknown,
        }
    }

    /// Parsed `last_updated`
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_updated.as_deref().and_then(parse_timestamp)
    }
}

/// Format an optional percentage change: `+1.23%`, `-4.00%` or `N/A`
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("+{v:.2}%"),
        Some(v) => format!("{v:.2}%"),
        None => "N/A".to_string(),
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO date-time taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Alert condition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Price above target
    PriceIncrease,
    /// Price below target
    PriceDecrease,
    /// Reserved, not offered for creation
    VolumeSpike,
    /// 24h change above target (percent)
    #[serde(rename = "PERCENT_CHANGE_24H")]
    PercentChange24h,
    /// Reserved, not offered for creation
    MarketCap,
}

impl AlertType {
    /// Types a user may create, in display order
    pub fn offered() -> [AlertType; 3] {
        [
            AlertType::PriceIncrease,
            AlertType::PriceDecrease,
            AlertType::PercentChange24h,
        ]
    }

    pub fn is_offered(self) -> bool {
        Self::offered().contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertType::PriceIncrease => "Price above",
            AlertType::PriceDecrease => "Price below",
            AlertType::PercentChange24h => "24h change above (%)",
            AlertType::VolumeSpike => "Volume spike",
            AlertType::MarketCap => "Market cap",
        }
    }

    /// Example target shown in an empty form, based on the coin's price
    pub fn placeholder(self, current_price: f64) -> String {
        match self {
            AlertType::PriceIncrease | AlertType::PriceDecrease => {
                format!("e.g. {current_price:.2}")
            }
            AlertType::PercentChange24h => "e.g. 5.0".to_string(),
            AlertType::VolumeSpike | AlertType::MarketCap => "Enter a value".to_string(),
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertType::PriceIncrease => write!(f, "PRICE_INCREASE"),
            AlertType::PriceDecrease => write!(f, "PRICE_DECREASE"),
            AlertType::VolumeSpike => write!(f, "VOLUME_SPIKE"),
            AlertType::PercentChange24h => write!(f, "PERCENT_CHANGE_24H"),
            AlertType::MarketCap => write!(f, "MARKET_CAP"),
        }
    }
}

/// A threshold alert rule as stored on the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub coin_symbol: String,
    pub alert_type: AlertType,
    pub target_value: f64,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Alert rule creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRuleDto {
    pub coin_symbol: String,
    pub alert_type: AlertType,
    pub target_value: f64,
    pub email: String,
}

/// Server-wide monitoring summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    pub timestamp: i64,
    pub cryptos_monitored: u64,
    pub active_alert_rules: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

/// Per-user monitoring subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStatus {
    pub username: String,
    pub active: bool,
    pub total_active_monitors: u64,
    pub timestamp: i64,
}

/// Body of the start monitoring request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartMonitoringRequest {
    pub email: String,
}
