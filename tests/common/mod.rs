//! Scripted in-memory backend for dashboard tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use crypto_monitor_dashboard::{
    AlertRule, AlertRuleDto, CryptoCurrency, DashboardApi, MonitorError, MonitoringStatus,
    Result, SystemStatus,
};

/// Failure the fake backend can produce
#[derive(Debug, Clone)]
pub enum Fail {
    Transport,
    Api(u16, Option<&'static str>),
}

impl Fail {
    fn into_error(self) -> MonitorError {
        match self {
            Fail::Transport => MonitorError::Transport("operation timed out".into()),
            Fail::Api(status, message) => MonitorError::Api {
                status,
                message: message.map(str::to_string),
            },
        }
    }
}

/// One read endpoint: a default reply plus queued one-off replies
pub struct Endpoint<T> {
    pub reply: std::result::Result<T, Fail>,
    pub script: VecDeque<(Duration, std::result::Result<T, Fail>)>,
    pub calls: usize,
}

impl<T: Clone> Endpoint<T> {
    fn new(reply: T) -> Self {
        Self {
            reply: Ok(reply),
            script: VecDeque::new(),
            calls: 0,
        }
    }

    fn next(&mut self) -> (Duration, std::result::Result<T, Fail>) {
        self.calls += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| (Duration::ZERO, self.reply.clone()))
    }
}

pub struct Backend {
    pub prices: Endpoint<Vec<CryptoCurrency>>,
    pub alerts: Endpoint<Vec<AlertRule>>,
    pub status: Endpoint<SystemStatus>,
    pub monitoring: Endpoint<MonitoringStatus>,
    /// Failure returned by every mutating call
    pub mutation_failure: Option<Fail>,
    pub force_updates: usize,
    pub test_notifications: usize,
    pub created: Vec<AlertRuleDto>,
    pub deactivated: Vec<i64>,
    pub start_requests: Vec<String>,
    pub stop_requests: usize,
    next_rule_id: i64,
}

pub struct FakeApi {
    backend: Mutex<Backend>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            backend: Mutex::new(Backend {
                prices: Endpoint::new(vec![coin("bitcoin", "BTC", 50000.0)]),
                alerts: Endpoint::new(Vec::new()),
                status: Endpoint::new(system_status(1, 0)),
                monitoring: Endpoint::new(monitoring_status(false)),
                mutation_failure: None,
                force_updates: 0,
                test_notifications: 0,
                created: Vec::new(),
                deactivated: Vec::new(),
                start_requests: Vec::new(),
                stop_requests: 0,
                next_rule_id: 1,
            }),
        }
    }

    /// Inspect or reconfigure the backend
    pub fn with<R>(&self, f: impl FnOnce(&mut Backend) -> R) -> R {
        f(&mut self.backend.lock().unwrap())
    }

    fn mutation(&self, record: impl FnOnce(&mut Backend)) -> Result<()> {
        let mut backend = self.backend.lock().unwrap();
        record(&mut backend);
        match backend.mutation_failure.clone() {
            Some(fail) => Err(fail.into_error()),
            None => Ok(()),
        }
    }
}

async fn reply<T>(step: (Duration, std::result::Result<T, Fail>)) -> Result<T> {
    let (delay, reply) = step;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    reply.map_err(Fail::into_error)
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn get_current_prices(&self) -> Result<Vec<CryptoCurrency>> {
        let step = self.with(|b| b.prices.next());
        reply(step).await
    }

    async fn get_crypto_by_coin_id(&self, coin_id: &str) -> Result<CryptoCurrency> {
        let step = self.with(|b| b.prices.next());
        let coins = reply(step).await?;
        coins
            .into_iter()
            .find(|c| c.coin_id == coin_id)
            .ok_or(MonitorError::Api {
                status: 404,
                message: Some("Coin not found".into()),
            })
    }

    async fn get_saved_cryptos(&self) -> Result<Vec<CryptoCurrency>> {
        let step = self.with(|b| b.prices.next());
        reply(step).await
    }

    async fn force_update(&self) -> Result<()> {
        self.mutation(|b| b.force_updates += 1)
    }

    async fn get_system_status(&self) -> Result<SystemStatus> {
        let step = self.with(|b| b.status.next());
        reply(step).await
    }

    async fn send_test_notification(&self) -> Result<()> {
        self.mutation(|b| b.test_notifications += 1)
    }

    async fn create_alert_rule(&self, rule: &AlertRuleDto) -> Result<AlertRule> {
        self.mutation(|b| b.created.push(rule.clone()))?;
        Ok(self.with(|b| {
            let created = AlertRule {
                id: Some(b.next_rule_id),
                coin_symbol: rule.coin_symbol.clone(),
                alert_type: rule.alert_type,
                target_value: rule.target_value,
                email: rule.email.clone(),
                active: Some(true),
            };
            b.next_rule_id += 1;
            if let Ok(list) = b.alerts.reply.as_mut() {
                list.push(created.clone());
            }
            created
        }))
    }

    async fn get_active_alert_rules(&self) -> Result<Vec<AlertRule>> {
        let step = self.with(|b| b.alerts.next());
        reply(step).await
    }

    async fn deactivate_alert_rule(&self, rule_id: i64) -> Result<()> {
        self.mutation(|b| b.deactivated.push(rule_id))?;
        self.with(|b| {
            if let Ok(list) = b.alerts.reply.as_mut() {
                list.retain(|r| r.id != Some(rule_id));
            }
        });
        Ok(())
    }

    async fn get_monitoring_status(&self) -> Result<MonitoringStatus> {
        let step = self.with(|b| b.monitoring.next());
        reply(step).await
    }

    async fn start_monitoring(&self, email: &str) -> Result<()> {
        self.mutation(|b| b.start_requests.push(email.to_string()))?;
        self.with(|b| b.monitoring.reply = Ok(monitoring_status(true)));
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<()> {
        self.mutation(|b| b.stop_requests += 1)?;
        self.with(|b| b.monitoring.reply = Ok(monitoring_status(false)));
        Ok(())
    }
}

pub fn coin(coin_id: &str, symbol: &str, price: f64) -> CryptoCurrency {
    CryptoCurrency {
        id: None,
        coin_id: coin_id.to_string(),
        symbol: symbol.to_string(),
        name: coin_id.to_string(),
        current_price: price,
        price_change_1h: None,
        price_change_24h: Some(1.5),
        price_change_7d: None,
        market_cap: None,
        total_volume: None,
        last_updated: None,
    }
}

pub fn system_status(coins: u64, rules: u64) -> SystemStatus {
    SystemStatus {
        status: "UP".to_string(),
        timestamp: 1_700_000_000_000,
        cryptos_monitored: coins,
        active_alert_rules: rules,
        last_update: None,
    }
}

pub fn monitoring_status(active: bool) -> MonitoringStatus {
    MonitoringStatus {
        username: "alice".to_string(),
        active,
        total_active_monitors: u64::from(active),
        timestamp: 1_700_000_000_000,
    }
}

/// Let spawned work finish; the paused clock auto-advances past it
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
