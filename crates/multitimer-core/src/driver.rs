//! Live driver: keeps a [`TimerService`] ticking on a tokio runtime.
//!
//! Runs on the caller's task, so all mutation stays on one thread. Failed
//! saves are logged and the loop carries on; the next pump writes a fresh
//! snapshot anyway.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::events::Event;
use crate::service::TimerService;
use crate::storage::{Config, Store};

#[derive(Debug, Clone, Copy)]
pub struct DriverSettings {
    /// How often due cadences are polled.
    pub poll_interval: Duration,
    /// How often the midnight rollover is checked. `None` disables it.
    pub reset_check_interval: Option<Duration>,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            reset_check_interval: Some(Duration::from_secs(60)),
        }
    }
}

impl DriverSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.scheduler.poll_interval_ms.max(1)),
            reset_check_interval: config
                .daily_reset
                .enabled
                .then(|| Duration::from_secs(config.daily_reset.check_interval_secs.max(1))),
        }
    }
}

/// Drive `service` until `shutdown` resolves, handing every event to
/// `on_event` as it is produced.
pub async fn run<S, C, F, Fut>(
    service: &mut TimerService<S, C>,
    settings: DriverSettings,
    shutdown: Fut,
    mut on_event: F,
) where
    S: Store,
    C: Clock,
    F: FnMut(&Event),
    Fut: Future<Output = ()>,
{
    let mut poll = tokio::time::interval(settings.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // An hour stands in for "never" when the rollover check is off.
    let reset_period = settings
        .reset_check_interval
        .unwrap_or(Duration::from_secs(3600));
    let mut reset_check = tokio::time::interval(reset_period);
    reset_check.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                debug!("driver shutting down");
                break;
            }
            _ = poll.tick() => {
                if let Err(e) = service.pump() {
                    warn!(error = %e, "tick pump failed");
                }
            }
            _ = reset_check.tick(), if settings.reset_check_interval.is_some() => {
                if let Err(e) = service.check_daily_reset() {
                    warn!(error = %e, "daily reset check failed");
                }
            }
        }
        for event in service.drain_events() {
            on_event(&event);
        }
    }
}
