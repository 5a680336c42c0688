//! Dashboard module - headless view model of the monitoring dashboard
//!
//! Keeps prices, alert rules, system status and the monitoring subscription
//! in sync with the backend and exposes the dashboard's user actions.
//!
//! # Architecture
//! - `state.rs`: the view state and its guarded store
//! - `reconcile.rs`: full loads and monitoring checks merged into the store
//! - `messages.rs`: transient error/success messages
//! - `scheduler.rs`: the periodic refresh timer
//!
//! # Lifecycle
//! [`Dashboard::mount`] loads everything once and arms the refresh timer
//! (30 seconds by default). [`Dashboard::unmount`], or dropping the
//! dashboard, stops the timer and freezes the state; responses that land
//! afterwards are discarded.

mod messages;
mod reconcile;
mod scheduler;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::DashboardApi;
use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::types::{AlertRule, CryptoCurrency};
use crate::validation::{self, AlertForm, FormField};

use messages::Messages;
use reconcile::Reconciler;

pub use reconcile::{ALERTS_FAILED, PRICES_FAILED, STATUS_FAILED};
pub use scheduler::{RefreshScheduler, SchedulerState};
pub use state::{AlertModalState, ViewState, ViewStore};

pub const CREATE_ALERT_FAILED: &str = "Failed to create alert. Please try again.";
pub const DEACTIVATE_ALERT_FAILED: &str = "Failed to deactivate alert";
pub const FORCE_UPDATE_FAILED: &str = "Failed to refresh data";
pub const TEST_NOTIFICATION_FAILED: &str = "Failed to send test notification";
pub const TEST_NOTIFICATION_SENT: &str = "Test notification sent!";
pub const START_MONITORING_FAILED: &str = "Failed to start monitoring";
pub const STOP_MONITORING_FAILED: &str = "Failed to stop monitoring";
pub const MONITORING_STOPPED: &str = "Monitoring stopped";
pub const DEACTIVATE_PROMPT: &str = "Deactivate this alert?";

const ALERT_FORM_FIELDS: [FormField; 3] =
    [FormField::AlertType, FormField::TargetValue, FormField::Email];

/// Timing knobs of a mounted dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub refresh_interval: Duration,
    pub message_timeout: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            message_timeout: Duration::from_secs(5),
        }
    }
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            message_timeout: config.message_timeout(),
        }
    }
}

/// A mounted dashboard view
pub struct Dashboard {
    store: ViewStore,
    messages: Messages,
    reconciler: Reconciler,
    scheduler: RefreshScheduler,
}

impl Dashboard {
    /// Mount the dashboard: start the initial load and arm the refresh timer.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`MonitorError::Config`] on a zero refresh interval, before any
    /// request is sent.
    pub fn mount(api: Arc<dyn DashboardApi>, settings: DashboardSettings) -> Result<Self> {
        let mut scheduler = RefreshScheduler::new(settings.refresh_interval)?;
        let store = ViewStore::new();
        let messages = Messages::new(store.clone(), settings.message_timeout);
        let reconciler = Reconciler::new(api, store.clone(), messages.clone());

        reconciler.spawn_full_load();
        reconciler.spawn_monitoring_check();

        let ticker = reconciler.clone();
        scheduler.start(move || {
            let reconciler = ticker.clone();
            async move {
                futures::join!(reconciler.full_load(), reconciler.check_monitoring_status());
            }
        });

        info!(
            refresh_secs = settings.refresh_interval.as_secs(),
            "dashboard mounted"
        );

        Ok(Self {
            store,
            messages,
            reconciler,
            scheduler,
        })
    }

    /// Tear down: stop the timer and reject all further state changes.
    /// Safe to call more than once.
    pub fn unmount(&mut self) {
        let stopped = self.scheduler.stop();
        if self.store.teardown() {
            info!("dashboard unmounted");
        } else if stopped {
            warn!("refresh timer was still running on an unmounted dashboard");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.store.is_mounted()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Receiver notified whenever the view state changes
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.store.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.store.snapshot()
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.store.is_mounted() {
            Ok(())
        } else {
            Err(MonitorError::Unmounted)
        }
    }

    /// Run a full load now, outside the timer
    pub async fn load_data(&self) {
        self.reconciler.full_load().await;
    }

    pub async fn check_monitoring_status(&self) {
        self.reconciler.check_monitoring_status().await;
    }

    /// Ask the backend to refresh its prices, then reload
    pub async fn force_update(&self) -> Result<()> {
        self.ensure_mounted()?;
        match self.reconciler.api().force_update().await {
            Ok(()) => {
                info!("backend refresh requested");
                self.load_data().await;
                Ok(())
            }
            Err(e) => Err(self.fail(e, FORCE_UPDATE_FAILED, "force update failed")),
        }
    }

    /// Open the alert creation modal for `crypto`
    pub fn open_alert_modal(&self, crypto: CryptoCurrency) {
        self.store.update(|s| {
            s.alert_modal = Some(AlertModalState {
                crypto,
                loading: false,
                error: None,
            });
            s.clear_field_errors(&ALERT_FORM_FIELDS);
        });
    }

    pub fn close_alert_modal(&self) {
        self.store.update(|s| {
            s.alert_modal = None;
            s.clear_field_errors(&ALERT_FORM_FIELDS);
        });
    }

    /// Submit the alert form for the coin selected in the modal.
    ///
    /// Invalid input sets inline field errors and sends nothing. On success
    /// the modal closes and the dashboard reloads.
    pub async fn create_alert(&self, form: &AlertForm) -> Result<AlertRule> {
        self.ensure_mounted()?;
        let symbol = self
            .snapshot()
            .alert_modal
            .map(|modal| modal.crypto.symbol)
            .ok_or_else(|| MonitorError::InvalidRequest("no coin selected for the alert".into()))?;

        let dto = match form.validate(&symbol) {
            Ok(dto) => dto,
            Err(MonitorError::Validation(fields)) => {
                debug!(%symbol, ?fields, "alert form rejected");
                self.store.update(|s| {
                    s.clear_field_errors(&ALERT_FORM_FIELDS);
                    s.field_errors.extend(fields.iter().cloned());
                });
                return Err(MonitorError::Validation(fields));
            }
            Err(e) => return Err(e),
        };

        self.store.update(|s| {
            s.clear_field_errors(&ALERT_FORM_FIELDS);
            if let Some(modal) = s.alert_modal.as_mut() {
                modal.loading = true;
                modal.error = None;
            }
        });

        match self.reconciler.api().create_alert_rule(&dto).await {
            Ok(rule) => {
                info!(
                    symbol = %dto.coin_symbol,
                    alert_type = %dto.alert_type,
                    target = dto.target_value,
                    "alert rule created"
                );
                self.store.update(|s| s.alert_modal = None);
                self.load_data().await;
                Ok(rule)
            }
            Err(e) => {
                warn!(symbol = %dto.coin_symbol, error = %e, "alert creation failed");
                let message = e.user_message(CREATE_ALERT_FAILED);
                let shown_in_modal = self.store.update(|s| match s.alert_modal.as_mut() {
                    Some(modal) => {
                        modal.loading = false;
                        modal.error = Some(message.clone());
                        true
                    }
                    None => false,
                });
                // Modal closed while the request was in flight
                if shown_in_modal == Some(false) {
                    self.messages.error(message);
                }
                Err(e)
            }
        }
    }

    /// Deactivate an alert rule after the user confirms.
    ///
    /// Returns `Ok(false)` when nothing was sent (no id, or declined).
    pub async fn deactivate_alert<F>(&self, rule_id: Option<i64>, confirm: F) -> Result<bool>
    where
        F: FnOnce(&str) -> bool,
    {
        self.ensure_mounted()?;
        let Some(rule_id) = rule_id else {
            return Ok(false);
        };
        if !confirm(DEACTIVATE_PROMPT) {
            debug!(rule_id, "deactivation declined");
            return Ok(false);
        }

        match self.reconciler.api().deactivate_alert_rule(rule_id).await {
            Ok(()) => {
                info!(rule_id, "alert rule deactivated");
                self.load_data().await;
                Ok(true)
            }
            Err(e) => Err(self.fail(e, DEACTIVATE_ALERT_FAILED, "alert deactivation failed")),
        }
    }

    pub async fn send_test_notification(&self) -> Result<()> {
        self.ensure_mounted()?;
        match self.reconciler.api().send_test_notification().await {
            Ok(()) => {
                info!("test notification sent");
                self.messages.success(TEST_NOTIFICATION_SENT);
                Ok(())
            }
            Err(e) => Err(self.fail(e, TEST_NOTIFICATION_FAILED, "test notification failed")),
        }
    }

    /// Subscribe `email` to monitoring.
    ///
    /// A blank or malformed email sets an inline error and sends nothing.
    pub async fn start_monitoring(&self, email: &str) -> Result<()> {
        self.ensure_mounted()?;
        let email = match validation::validate_monitoring_email(email) {
            Ok(email) => email,
            Err(MonitorError::Validation(fields)) => {
                self.store.update(|s| {
                    s.clear_field_errors(&[FormField::MonitoringEmail]);
                    s.field_errors.extend(fields.iter().cloned());
                });
                return Err(MonitorError::Validation(fields));
            }
            Err(e) => return Err(e),
        };

        self.store.update(|s| {
            s.clear_field_errors(&[FormField::MonitoringEmail]);
            s.monitoring_pending = true;
        });

        let result = self.reconciler.api().start_monitoring(&email).await;
        self.settle_monitoring(result, true, &format!("Monitoring started for {email}"))
            .await
    }

    pub async fn stop_monitoring(&self) -> Result<()> {
        self.ensure_mounted()?;
        self.store.update(|s| s.monitoring_pending = true);

        let result = self.reconciler.api().stop_monitoring().await;
        self.settle_monitoring(result, false, MONITORING_STOPPED).await
    }

    async fn settle_monitoring(&self, result: Result<()>, active: bool, success: &str) -> Result<()> {
        match result {
            Ok(()) => {
                info!(active, "monitoring toggled");
                self.store.update(|s| {
                    s.monitoring_pending = false;
                    s.monitoring_active = active;
                    s.generations.supersede_monitoring();
                });
                self.messages.success(success);
                futures::join!(self.check_monitoring_status(), self.load_data());
                Ok(())
            }
            Err(e) => {
                self.store.update(|s| s.monitoring_pending = false);
                let fallback = if active {
                    START_MONITORING_FAILED
                } else {
                    STOP_MONITORING_FAILED
                };
                Err(self.fail(e, fallback, "monitoring toggle failed"))
            }
        }
    }

    /// Log a failed action and show its message
    fn fail(&self, e: MonitorError, fallback: &str, what: &'static str) -> MonitorError {
        warn!(error = %e, transport = e.is_transport(), "{what}");
        self.messages.error(e.user_message(fallback));
        e
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.unmount();
    }
}
