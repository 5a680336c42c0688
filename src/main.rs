//! Headless dashboard runner
//!
//! Mounts a dashboard against the configured monitoring API, logs every
//! state change and unmounts on Ctrl-C.

use std::sync::Arc;

use crypto_monitor_dashboard::{
    Config, Dashboard, DashboardSettings, MonitorClient, ViewState, format_percentage,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        environment = %config.environment,
        api = %config.api_base_url,
        authenticated = config.api_token.is_some(),
        "starting dashboard"
    );

    let client = match MonitorClient::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to create API client");
            std::process::exit(1);
        }
    };

    let mut dashboard =
        match Dashboard::mount(Arc::new(client), DashboardSettings::from_config(&config)) {
            Ok(d) => d,
            Err(e) => {
                error!(error = %e, "failed to mount dashboard");
                std::process::exit(1);
            }
        };
    let mut updates = dashboard.subscribe();
    let mut was_loading = false;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                log_state(&state, was_loading);
                was_loading = state.loading;
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                }
                break;
            }
        }
    }

    dashboard.unmount();
}

/// Per-change detail at debug; one info summary when a load settles
fn log_state(state: &ViewState, was_loading: bool) {
    if state.loading {
        return;
    }
    if let Some(err) = &state.error {
        debug!(error = %err, "visible error");
    }
    if let Some(msg) = &state.success_message {
        debug!(message = %msg, "visible message");
    }

    let status = state.system_status.as_ref().map_or("unknown", |s| s.status.as_str());
    if !load_settled(state, was_loading) {
        debug!(
            status,
            coins = state.cryptos.len(),
            alerts = state.alerts.len(),
            monitoring = state.monitoring_active,
            "view changed"
        );
        return;
    }

    for coin in &state.cryptos {
        debug!(
            symbol = %coin.symbol,
            price = coin.current_price,
            change_24h = %format_percentage(coin.price_change_24h),
            "price"
        );
    }
    info!(
        status,
        coins = state.cryptos.len(),
        alerts = state.alerts.len(),
        monitoring = state.monitoring_active,
        "dashboard refreshed"
    );
}

/// A full load just finished: the loading flag went from set to clear
fn load_settled(state: &ViewState, was_loading: bool) -> bool {
    was_loading && !state.loading
}
