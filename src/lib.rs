//! Crypto Monitor Dashboard - headless client for a price-monitoring backend
//!
//! Keeps a dashboard view of cryptocurrency prices, alert rules, system
//! status and the user's monitoring subscription in sync with a remote API.
//!
//! # Architecture
//! - `client`: typed HTTP gateway to the monitoring API
//! - `dashboard`: view state, periodic refresh and response reconciliation
//! - `validation`: client-side form checks
//!
//! Price polling, alert evaluation and email delivery all happen on the
//! server; this crate only reads, mutates through the API, and reconciles.

// Clippy configuration
#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::cast_precision_loss)] // Float casts OK for display
#![allow(clippy::map_unwrap_or)] // Explicit error handling preference

mod auth;
mod client;
mod config;
pub mod dashboard;
mod error;
mod types;
pub mod validation;

pub use auth::BearerAuth;
pub use client::{DashboardApi, MonitorClient};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardSettings, SchedulerState, ViewState};
pub use error::{MonitorError, Result};
pub use types::*;
pub use validation::{AlertForm, FieldError, FormField};
