//! Session expiry watcher.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::clock::SessionClock;

/// Default polling cadence.
pub const DEFAULT_WATCH_TICK: Duration = Duration::from_secs(1);

/// Polls the session clock on a fixed cadence and fires an on-expired
/// callback exactly once per Valid -> Expired transition.
///
/// Polling rather than push keeps extensions made elsewhere in the
/// application visible without an event bus. The watcher re-arms when the
/// clock becomes valid again, so a later expiry fires again.
pub struct SessionWatcher {
    clock: SessionClock,
    tick: Duration,
    on_expired: Arc<dyn Fn() + Send + Sync>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl SessionWatcher {
    pub fn new(clock: SessionClock, on_expired: impl Fn() + Send + Sync + 'static) -> Self {
        Self::with_tick(clock, DEFAULT_WATCH_TICK, on_expired)
    }

    pub fn with_tick(
        clock: SessionClock,
        tick: Duration,
        on_expired: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            clock,
            tick,
            on_expired: Arc::new(on_expired),
            cancel: Mutex::new(None),
        }
    }

    /// Start watching. A second call while running is a no-op.
    pub fn start(&self) {
        let mut slot = self.cancel.lock();
        if slot.is_some() {
            return;
        }

        let token = CancellationToken::new();
        *slot = Some(token.clone());

        let clock = self.clock.clone();
        let on_expired = Arc::clone(&self.on_expired);
        let tick = self.tick;

        tokio::spawn(async move {
            let mut was_valid = clock.is_valid();

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(tick) => {}
                }

                let valid = clock.is_valid();
                if was_valid && !valid {
                    info!("Session expired; forcing logout");
                    on_expired();
                }
                was_valid = valid;
            }

            debug!("Session watcher stopped");
        });
    }

    pub fn stop(&self) {
        if let Some(token) = self.cancel.lock().take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel.lock().is_some()
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
