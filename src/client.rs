//! Monitoring API client
//!
//! Implements the backend endpoints used by the dashboard:
//! - Market data (current prices, single coin, saved coins, forced refresh)
//! - System status and test notifications
//! - Alert rules (create, list active, deactivate)
//! - Per-user monitoring subscription (status, start, stop)
//!
//! Parameters get shape checks only; business rules are the server's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::BearerAuth;
use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::types::{
    AlertRule, AlertRuleDto, CryptoCurrency, MonitoringStatus, StartMonitoringRequest,
    SystemStatus,
};

/// Longest raw (non-JSON) error body surfaced as a server message
const MAX_RAW_ERROR_LEN: usize = 200;

/// The backend operations the dashboard depends on.
///
/// Implemented by [`MonitorClient`] over HTTP; the dashboard only sees this
/// trait, so handles are shared as `Arc<dyn DashboardApi>`.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn get_current_prices(&self) -> Result<Vec<CryptoCurrency>>;
    async fn get_crypto_by_coin_id(&self, coin_id: &str) -> Result<CryptoCurrency>;
    async fn get_saved_cryptos(&self) -> Result<Vec<CryptoCurrency>>;
    async fn force_update(&self) -> Result<()>;
    async fn get_system_status(&self) -> Result<SystemStatus>;
    async fn send_test_notification(&self) -> Result<()>;
    async fn create_alert_rule(&self, rule: &AlertRuleDto) -> Result<AlertRule>;
    async fn get_active_alert_rules(&self) -> Result<Vec<AlertRule>>;
    async fn deactivate_alert_rule(&self, rule_id: i64) -> Result<()>;
    async fn get_monitoring_status(&self) -> Result<MonitoringStatus>;
    async fn start_monitoring(&self, email: &str) -> Result<()>;
    async fn stop_monitoring(&self) -> Result<()>;
}

/// Monitoring API client
pub struct MonitorClient {
    http: reqwest::Client,
    base_url: String,
    auth: Option<BearerAuth>,
}

/// Error body shapes the backend returns
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl MonitorClient {
    /// Create new client for `base_url`
    pub fn new(base_url: &str, auth: Option<BearerAuth>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(MonitorError::Config(format!("invalid API base URL {base_url:?}")));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// Create client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let auth = BearerAuth::from_config(config)?;
        Self::new(&config.api_base_url, auth, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Build a request with the common headers
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(%method, path, %request_id, "api request");

        let mut builder = self
            .http
            .request(method, self.url(path))
            .header("Content-Type", "application/json")
            .header("X-Request-Id", request_id);

        if let Some(auth) = &self.auth {
            builder = builder.header("Authorization", auth.header_value());
        }
        builder
    }

    /// Perform GET request and decode the body
    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    /// Perform POST request and decode the body
    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Perform a request whose response body is ignored
    async fn send_ignoring_body<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Decode a successful response, or map the error status
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T> {
        let body = Self::check_status(response).await?;
        serde_json::from_str(&body).map_err(MonitorError::from)
    }

    /// Read the body, failing on non-2xx with the server's message
    async fn check_status(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            // The status already arrived; a lost error body stays an API error
            Err(e) if !status.is_success() => {
                warn!(status = status.as_u16(), error = %e, "failed to read error body");
                return Err(MonitorError::Api {
                    status: status.as_u16(),
                    message: None,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !status.is_success() {
            return Err(MonitorError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        Ok(body)
    }
}

/// Pull a human-readable message out of an error body
fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return parsed
            .message
            .or(parsed.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
    }

    if body.starts_with('{') || body.starts_with('<') || body.len() > MAX_RAW_ERROR_LEN {
        return None;
    }
    Some(body.to_string())
}

fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MonitorError::InvalidRequest(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Coin ids end up in the URL path
fn check_coin_id(coin_id: &str) -> Result<()> {
    require_non_empty(coin_id, "coin id")?;
    if coin_id
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
    {
        return Err(MonitorError::InvalidRequest(format!("malformed coin id {coin_id:?}")));
    }
    Ok(())
}

fn check_alert_dto(rule: &AlertRuleDto) -> Result<()> {
    require_non_empty(&rule.coin_symbol, "coin symbol")?;
    require_non_empty(&rule.email, "email")?;
    if !rule.target_value.is_finite() || rule.target_value <= 0.0 {
        return Err(MonitorError::InvalidRequest(format!(
            "target value must be a positive number, got {}",
            rule.target_value
        )));
    }
    Ok(())
}

#[async_trait]
impl DashboardApi for MonitorClient {
    async fn get_current_prices(&self) -> Result<Vec<CryptoCurrency>> {
        self.get("/api/crypto/current").await
    }

    async fn get_crypto_by_coin_id(&self, coin_id: &str) -> Result<CryptoCurrency> {
        check_coin_id(coin_id)?;
        let path = format!("/api/crypto/current/{coin_id}");
        self.get(&path).await
    }

    async fn get_saved_cryptos(&self) -> Result<Vec<CryptoCurrency>> {
        self.get("/api/crypto/saved").await
    }

    async fn force_update(&self) -> Result<()> {
        self.send_ignoring_body(Method::POST, "/api/crypto/update", Some(&serde_json::json!({})))
            .await
    }

    async fn get_system_status(&self) -> Result<SystemStatus> {
        self.get("/api/crypto/status").await
    }

    async fn send_test_notification(&self) -> Result<()> {
        self.send_ignoring_body(
            Method::POST,
            "/api/crypto/test-notification",
            Some(&serde_json::json!({})),
        )
        .await
    }

    async fn create_alert_rule(&self, rule: &AlertRuleDto) -> Result<AlertRule> {
        check_alert_dto(rule)?;
        self.post("/api/crypto/alerts", rule).await
    }

    async fn get_active_alert_rules(&self) -> Result<Vec<AlertRule>> {
        self.get("/api/crypto/alerts").await
    }

    async fn deactivate_alert_rule(&self, rule_id: i64) -> Result<()> {
        if rule_id <= 0 {
            return Err(MonitorError::InvalidRequest(format!("invalid rule id {rule_id}")));
        }
        let path = format!("/api/crypto/alerts/{rule_id}");
        self.send_ignoring_body::<()>(Method::DELETE, &path, None).await
    }

    async fn get_monitoring_status(&self) -> Result<MonitoringStatus> {
        self.get("/api/monitoring/status").await
    }

    async fn start_monitoring(&self, email: &str) -> Result<()> {
        require_non_empty(email, "email")?;
        let body = StartMonitoringRequest {
            email: email.trim().to_string(),
        };
        self.send_ignoring_body(Method::POST, "/api/monitoring/start", Some(&body))
            .await
    }

    async fn stop_monitoring(&self) -> Result<()> {
        self.send_ignoring_body(Method::POST, "/api/monitoring/stop", Some(&serde_json::json!({})))
            .await
    }
}
