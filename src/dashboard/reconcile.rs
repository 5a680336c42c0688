//! Merging API responses into the view state
//!
//! A full load asks for prices, alert rules and system status at once.
//! Each response is applied on its own: a failing source keeps its last
//! known value and posts an error, the other two still update. Responses
//! older than what is already shown are dropped (see `Generations`).
//!
//! Starting a load does not clear a visible error. It stays until its
//! message timeout or until a newer message replaces it, so a failure seen
//! just before a timer tick is not wiped by that tick.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::messages::Messages;
use super::state::{LoadField, ViewState, ViewStore};
use crate::client::DashboardApi;
use crate::error::Result;

pub const PRICES_FAILED: &str = "Failed to load cryptocurrencies";
pub const ALERTS_FAILED: &str = "Failed to load alert rules";
pub const STATUS_FAILED: &str = "Failed to load system status";

#[derive(Clone)]
pub(crate) struct Reconciler {
    api: Arc<dyn DashboardApi>,
    store: ViewStore,
    messages: Messages,
}

impl Reconciler {
    pub(crate) fn new(api: Arc<dyn DashboardApi>, store: ViewStore, messages: Messages) -> Self {
        Self {
            api,
            store,
            messages,
        }
    }

    pub(crate) fn api(&self) -> &dyn DashboardApi {
        self.api.as_ref()
    }

    /// Run a full load in the background
    pub(crate) fn spawn_full_load(&self) {
        let this = self.clone();
        tokio::spawn(async move { this.full_load().await });
    }

    /// Run a monitoring status check in the background
    pub(crate) fn spawn_monitoring_check(&self) {
        let this = self.clone();
        tokio::spawn(async move { this.check_monitoring_status().await });
    }

    /// Fetch prices, alert rules and system status concurrently
    pub(crate) async fn full_load(&self) {
        let Some(generation) = self.store.update(|s| {
            s.loading = true;
            s.generations.begin_load()
        }) else {
            debug!("dashboard unmounted, skipping full load");
            return;
        };
        debug!(generation, "full load started");

        futures::join!(
            async {
                let result = self.api.get_current_prices().await;
                self.apply(LoadField::Prices, generation, result, |s, cryptos| {
                    s.cryptos = cryptos;
                });
            },
            async {
                let result = self.api.get_active_alert_rules().await;
                self.apply(LoadField::Alerts, generation, result, |s, alerts| {
                    s.alerts = alerts;
                });
            },
            async {
                let result = self.api.get_system_status().await;
                self.apply(LoadField::Status, generation, result, |s, status| {
                    s.system_status = Some(status);
                });
            },
        );
    }

    /// Merge one full-load response
    fn apply<T>(
        &self,
        field: LoadField,
        generation: u64,
        result: Result<T>,
        assign: impl FnOnce(&mut ViewState, T),
    ) {
        let outcome = self.store.update(|s| {
            // The price request drives the loading indicator
            if field == LoadField::Prices && s.generations.is_latest_load(generation) {
                s.loading = false;
            }
            match result {
                Ok(value) => {
                    if s.generations.accept_success(field, generation) {
                        assign(s, value);
                        Applied::Updated
                    } else {
                        Applied::Stale
                    }
                }
                Err(e) => {
                    if s.generations.accept_failure(field, generation) {
                        Applied::Failed(e)
                    } else {
                        Applied::Stale
                    }
                }
            }
        });

        match outcome {
            None => debug!(%field, generation, "response after unmount dropped"),
            Some(Applied::Updated) => debug!(%field, generation, "view updated"),
            Some(Applied::Stale) => debug!(%field, generation, "stale response dropped"),
            Some(Applied::Failed(e)) => {
                warn!(%field, generation, error = %e, "load failed, keeping last known data");
                let fallback = match field {
                    LoadField::Prices => PRICES_FAILED,
                    LoadField::Alerts => ALERTS_FAILED,
                    LoadField::Status => STATUS_FAILED,
                };
                self.messages.error(e.user_message(fallback));
            }
        }
    }

    /// Refresh the monitoring subscription.
    ///
    /// Failures are logged only; the visible error and the last known
    /// monitoring flag are left alone.
    pub(crate) async fn check_monitoring_status(&self) {
        let Some(generation) = self.store.update(|s| s.generations.begin_monitoring()) else {
            return;
        };

        match self.api.get_monitoring_status().await {
            Ok(status) => {
                let applied = self.store.update(|s| {
                    if !s.generations.accept_monitoring(generation) {
                        return false;
                    }
                    if s.monitoring_active != status.active {
                        info!(active = status.active, "monitoring status changed");
                    }
                    s.monitoring_active = status.active;
                    s.monitoring = Some(status);
                    true
                });
                if applied == Some(false) {
                    debug!(generation, "stale monitoring status dropped");
                }
            }
            Err(e) => warn!(generation, error = %e, "monitoring status check failed"),
        }
    }
}

enum Applied {
    Updated,
    Stale,
    Failed(crate::error::MonitorError),
}
