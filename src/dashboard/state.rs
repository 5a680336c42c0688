//! View state owned by a mounted dashboard
//!
//! The whole view model lives in one [`ViewState`] published through a
//! `watch` channel. Every write goes through [`ViewStore::update`], which
//! checks the mounted flag under the channel lock: once the dashboard is
//! torn down, late responses and timers can no longer touch the state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::types::{AlertRule, CryptoCurrency, MonitoringStatus, SystemStatus};
use crate::validation::{FieldError, FormField};

/// Alert creation modal, open for one coin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertModalState {
    pub crypto: CryptoCurrency,
    pub loading: bool,
    pub error: Option<String>,
}

/// Snapshot of everything the dashboard renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub cryptos: Vec<CryptoCurrency>,
    pub alerts: Vec<AlertRule>,
    pub system_status: Option<SystemStatus>,
    pub monitoring: Option<MonitoringStatus>,
    pub monitoring_active: bool,
    /// Start/stop monitoring request in flight
    pub monitoring_pending: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
    /// Inline validation failures from the last submission
    pub field_errors: Vec<FieldError>,
    pub alert_modal: Option<AlertModalState>,

    #[serde(skip)]
    pub(crate) mounted: bool,
    #[serde(skip)]
    pub(crate) generations: Generations,
    #[serde(skip)]
    pub(crate) message_seq: u64,
}

impl ViewState {
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Validation message for `field`, if the last submission failed on it
    pub fn field_error(&self, field: FormField) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub(crate) fn clear_field_errors(&mut self, fields: &[FormField]) {
        self.field_errors.retain(|e| !fields.contains(&e.field));
    }
}

/// Data sources filled by a full load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadField {
    Prices,
    Alerts,
    Status,
}

impl std::fmt::Display for LoadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadField::Prices => write!(f, "prices"),
            LoadField::Alerts => write!(f, "alerts"),
            LoadField::Status => write!(f, "status"),
        }
    }
}

/// Request generation tags.
///
/// Each full load and each monitoring check takes the next generation.
/// A success is applied only if no newer success for the same field has
/// been applied; a failure is reported only under the same condition.
/// Failures never advance a field's tag, so an older success landing after
/// a newer failure still refreshes the data.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Generations {
    issued_load: u64,
    prices: u64,
    alerts: u64,
    status: u64,
    issued_monitoring: u64,
    monitoring: u64,
}

impl Generations {
    pub(crate) fn begin_load(&mut self) -> u64 {
        self.issued_load += 1;
        self.issued_load
    }

    pub(crate) fn is_latest_load(&self, generation: u64) -> bool {
        generation == self.issued_load
    }

    fn slot(&mut self, field: LoadField) -> &mut u64 {
        match field {
            LoadField::Prices => &mut self.prices,
            LoadField::Alerts => &mut self.alerts,
            LoadField::Status => &mut self.status,
        }
    }

    /// Record a successful response; false when a newer one already landed
    pub(crate) fn accept_success(&mut self, field: LoadField, generation: u64) -> bool {
        let slot = self.slot(field);
        if generation < *slot {
            return false;
        }
        *slot = generation;
        true
    }

    /// Whether a failure for `generation` is still relevant
    pub(crate) fn accept_failure(&mut self, field: LoadField, generation: u64) -> bool {
        generation >= *self.slot(field)
    }

    pub(crate) fn begin_monitoring(&mut self) -> u64 {
        self.issued_monitoring += 1;
        self.issued_monitoring
    }

    pub(crate) fn accept_monitoring(&mut self, generation: u64) -> bool {
        if generation < self.monitoring {
            return false;
        }
        self.monitoring = generation;
        true
    }

    /// A start/stop action decided the monitoring flag; checks issued
    /// before it are stale.
    pub(crate) fn supersede_monitoring(&mut self) {
        self.issued_monitoring += 1;
        self.monitoring = self.issued_monitoring;
    }
}

/// Shared handle on the view state
#[derive(Clone)]
pub struct ViewStore {
    tx: Arc<watch::Sender<ViewState>>,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStore {
    /// Create a mounted store with an empty view
    pub fn new() -> Self {
        let state = ViewState {
            mounted: true,
            ..ViewState::default()
        };
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    /// Receiver notified on every applied change
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.tx.borrow().mounted
    }

    /// Apply `f` if the view is still mounted.
    ///
    /// Returns `None`, without calling `f`, once the view is torn down.
    pub fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> Option<R> {
        let mut out = None;
        self.tx.send_if_modified(|state| {
            if !state.mounted {
                return false;
            }
            out = Some(f(state));
            true
        });
        out
    }

    /// Mark the view torn down. Returns false if it already was.
    pub(crate) fn teardown(&self) -> bool {
        self.tx.send_if_modified(|state| {
            let was_mounted = state.mounted;
            state.mounted = false;
            was_mounted
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejected_after_teardown() {
        let store = ViewStore::new();
        assert_eq!(store.update(|s| s.loading = true), Some(()));
        assert!(store.snapshot().loading);

        assert!(store.teardown());
        assert!(!store.teardown());
        assert!(!store.is_mounted());

        assert_eq!(store.update(|s| s.loading = false), None);
        assert!(store.snapshot().loading);
    }

    #[test]
    fn test_subscribers_see_updates() {
        let store = ViewStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.update(|s| s.error = Some("boom".into()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_generations_drop_stale_success() {
        let mut g = Generations::default();
        let first = g.begin_load();
        let second = g.begin_load();
        assert!(g.is_latest_load(second));
        assert!(!g.is_latest_load(first));

        assert!(g.accept_success(LoadField::Prices, second));
        assert!(!g.accept_success(LoadField::Prices, first));
        assert!(!g.accept_failure(LoadField::Prices, first));
        // Other fields are tracked separately
        assert!(g.accept_success(LoadField::Alerts, first));
    }

    #[test]
    fn test_older_success_applies_after_newer_failure() {
        let mut g = Generations::default();
        let first = g.begin_load();
        let second = g.begin_load();

        assert!(g.accept_failure(LoadField::Status, second));
        assert!(g.accept_success(LoadField::Status, first));
        assert!(g.accept_failure(LoadField::Status, second));
    }

    #[test]
    fn test_supersede_monitoring() {
        let mut g = Generations::default();
        let check = g.begin_monitoring();
        g.supersede_monitoring();
        assert!(!g.accept_monitoring(check));
        let next = g.begin_monitoring();
        assert!(g.accept_monitoring(next));
    }

    #[test]
    fn test_field_errors_lookup() {
        let mut state = ViewState {
            field_errors: vec![
                FieldError::new(FormField::Email, "Email is required"),
                FieldError::new(FormField::MonitoringEmail, "Invalid email address"),
            ],
            ..ViewState::default()
        };
        assert_eq!(state.field_error(FormField::Email), Some("Email is required"));
        state.clear_field_errors(&[FormField::Email]);
        assert_eq!(state.field_error(FormField::Email), None);
        assert!(state.field_error(FormField::MonitoringEmail).is_some());
    }
}
