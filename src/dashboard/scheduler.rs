//! Periodic refresh timer
//!
//! Two states: Idle (no task) and Active (a tokio task ticking every
//! `period`). Tick work is spawned, not awaited, so a slow tick never
//! delays the next one. Stopping aborts the timer task immediately; work
//! already spawned by earlier ticks runs to completion and is fenced off by
//! the view store's mounted check.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Active,
}

pub struct RefreshScheduler {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// A zero period is rejected; tokio's interval cannot tick at it.
    pub fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(MonitorError::Config(
                "refresh interval must be greater than zero".into(),
            ));
        }
        Ok(Self { period, task: None })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> SchedulerState {
        if self.task.is_some() {
            SchedulerState::Active
        } else {
            SchedulerState::Idle
        }
    }

    /// Idle -> Active. The first tick fires one period from now.
    ///
    /// Must be called from within a tokio runtime. Starting an active
    /// scheduler is a no-op.
    pub fn start<F, Fut>(&mut self, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.task.is_some() {
            warn!("refresh scheduler already active");
            return;
        }

        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("refresh tick");
                tokio::spawn(on_tick());
            }
        }));
        debug!(period_secs = period.as_secs_f64(), "refresh scheduler started");
    }

    /// Active -> Idle. Returns false if already idle.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                debug!("refresh scheduler stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
