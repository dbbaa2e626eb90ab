//! Background polling that keeps an aggregated profile fresh.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::aggregator::ProfileAggregator;
use super::model::Profile;

/// Default spacing between aggregation cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for the profile poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Spacing between aggregation cycles.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Repeatedly aggregates a profile and delivers each snapshot to a
/// subscriber.
///
/// `start` performs one immediate aggregation, then repeats on a fixed
/// interval until `stop`. Stopping is safe at any point: a result still in
/// flight when the poller is stopped is discarded rather than delivered.
pub struct ProfilePoller {
    aggregator: Arc<ProfileAggregator>,
    user_id: i64,
    config: PollerConfig,
    on_update: Arc<dyn Fn(Profile) + Send + Sync>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl ProfilePoller {
    pub fn new(
        aggregator: Arc<ProfileAggregator>,
        user_id: i64,
        on_update: impl Fn(Profile) + Send + Sync + 'static,
    ) -> Self {
        Self::with_config(aggregator, user_id, PollerConfig::default(), on_update)
    }

    pub fn with_config(
        aggregator: Arc<ProfileAggregator>,
        user_id: i64,
        config: PollerConfig,
        on_update: impl Fn(Profile) + Send + Sync + 'static,
    ) -> Self {
        Self {
            aggregator,
            user_id,
            config,
            on_update: Arc::new(on_update),
            cancel: Mutex::new(None),
        }
    }

    /// Start polling. A second call while running is a no-op: at most one
    /// timer is live per poller instance.
    pub fn start(&self) {
        let mut slot = self.cancel.lock();
        if slot.is_some() {
            debug!(user_id = self.user_id, "Poller already running");
            return;
        }

        let token = CancellationToken::new();
        *slot = Some(token.clone());

        let aggregator = Arc::clone(&self.aggregator);
        let on_update = Arc::clone(&self.on_update);
        let user_id = self.user_id;
        let interval = self.config.interval;

        tokio::spawn(async move {
            // The first tick of a tokio interval completes immediately,
            // which gives the subscriber an initial snapshot before the
            // periodic cadence begins.
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let result = aggregator.aggregate(user_id).await;

                // A stop while the aggregation was in flight makes the
                // result stale; drop it instead of delivering.
                if token.is_cancelled() {
                    break;
                }

                match result {
                    Ok(profile) => on_update(profile),
                    Err(error) => warn!(user_id, error = %error, "Profile poll failed"),
                }
            }

            debug!(user_id, "Profile poller stopped");
        });
    }

    /// Stop polling. Safe to call at any time, including mid-aggregation.
    pub fn stop(&self) {
        if let Some(token) = self.cancel.lock().take() {
            token.cancel();
        }
    }

    /// Whether a polling task is currently live.
    pub fn is_running(&self) -> bool {
        self.cancel.lock().is_some()
    }
}

impl Drop for ProfilePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
