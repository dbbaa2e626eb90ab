//! Navigation queue with minimum dispatch spacing.
//!
//! Bursts of programmatic navigation can trip the host environment's
//! flood protection; the throttler serializes requests through a FIFO
//! queue and keeps a fixed minimum spacing between dispatches.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Minimum spacing between dispatched navigations.
pub const DEFAULT_NAVIGATION_SPACING: Duration = Duration::from_millis(200);

/// Options attached to a navigation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    #[serde(default)]
    pub replace: bool,
    /// Opaque state forwarded to the host router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
}

/// One queued navigation; consumed and discarded after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub destination: String,
    #[serde(default)]
    pub options: NavigateOptions,
}

/// Receiver for dispatched navigations (the host router adapter).
pub trait NavigationSink: Send + Sync {
    fn dispatch(&self, request: NavigationRequest) -> crate::Result<()>;
}

/// FIFO navigation queue with a single drain task and minimum spacing
/// between dispatches.
///
/// Enqueue order is dispatch order for the lifetime of the queue. There is
/// no cancellation: once queued, a navigation eventually dispatches. A
/// sink error is swallowed so one failed navigation cannot stall the rest.
pub struct NavigationThrottler {
    sink: Arc<dyn NavigationSink>,
    queue: Arc<Mutex<VecDeque<NavigationRequest>>>,
    draining: Arc<AtomicBool>,
    spacing: Duration,
}

impl NavigationThrottler {
    pub fn new(sink: Arc<dyn NavigationSink>) -> Self {
        Self::with_spacing(sink, DEFAULT_NAVIGATION_SPACING)
    }

    pub fn with_spacing(sink: Arc<dyn NavigationSink>, spacing: Duration) -> Self {
        Self {
            sink,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            draining: Arc::new(AtomicBool::new(false)),
            spacing,
        }
    }

    /// Enqueue a navigation; starts the drain task if one is not already
    /// running.
    pub fn navigate(&self, destination: impl Into<String>, options: NavigateOptions) {
        self.queue.lock().push_back(NavigationRequest {
            destination: destination.into(),
            options,
        });
        self.spawn_drain_if_idle();
    }

    /// Number of requests still waiting to dispatch.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    fn spawn_drain_if_idle(&self) {
        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let queue = Arc::clone(&self.queue);
        let draining = Arc::clone(&self.draining);
        let sink = Arc::clone(&self.sink);
        let spacing = self.spacing;

        tokio::spawn(async move {
            loop {
                let next = queue.lock().pop_front();

                match next {
                    Some(request) => {
                        debug!(destination = %request.destination, "Dispatching navigation");
                        if let Err(error) = sink.dispatch(request) {
                            // A failed navigation must not stall the queue.
                            warn!(error = %error, "Navigation dispatch failed");
                        }
                        tokio::time::sleep(spacing).await;
                    }
                    None => {
                        draining.store(false, Ordering::SeqCst);

                        // An enqueue may have raced the flag release; only
                        // exit once the queue is confirmed empty or another
                        // drain task took over.
                        if queue.lock().is_empty() {
                            break;
                        }
                        if draining
                            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct RecordingSink {
        dispatched: Mutex<Vec<(String, Instant)>>,
        fail_on: Option<String>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                dispatched: Mutex::new(Vec::new()),
                fail_on: None,
            })
        }

        fn failing_on(destination: &str) -> Arc<Self> {
            Arc::new(Self {
                dispatched: Mutex::new(Vec::new()),
                fail_on: Some(destination.to_owned()),
            })
        }

        fn names(&self) -> Vec<String> {
            self.dispatched
                .lock()
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }
    }

    impl NavigationSink for RecordingSink {
        fn dispatch(&self, request: NavigationRequest) -> crate::Result<()> {
            self.dispatched
                .lock()
                .push((request.destination.clone(), Instant::now()));
            if self.fail_on.as_deref() == Some(request.destination.as_str()) {
                return Err(crate::Error::Other("router rejected navigation".into()));
            }
            Ok(())
        }
    }

    async fn wait_for_dispatches(sink: &RecordingSink, count: usize) {
        for _ in 0..200 {
            if sink.dispatched.lock().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {count} dispatches, saw {}",
            sink.dispatched.lock().len()
        );
    }

    #[tokio::test]
    async fn test_fifo_order_and_minimum_spacing() {
        let sink = RecordingSink::new();
        let spacing = Duration::from_millis(100);
        let throttler = NavigationThrottler::with_spacing(sink.clone(), spacing);

        throttler.navigate("/dashboard", NavigateOptions::default());
        throttler.navigate("/loans", NavigateOptions::default());
        throttler.navigate("/documents", NavigateOptions::default());

        wait_for_dispatches(&sink, 3).await;

        assert_eq!(sink.names(), vec!["/dashboard", "/loans", "/documents"]);

        let dispatched = sink.dispatched.lock();
        for pair in dispatched.windows(2) {
            let gap = pair[1].1.duration_since(pair[0].1);
            assert!(gap >= spacing, "dispatch gap {gap:?} below spacing");
        }
    }

    #[tokio::test]
    async fn test_sink_error_does_not_stall_queue() {
        let sink = RecordingSink::failing_on("/loans");
        let throttler = NavigationThrottler::with_spacing(sink.clone(), Duration::from_millis(20));

        throttler.navigate("/dashboard", NavigateOptions::default());
        throttler.navigate("/loans", NavigateOptions::default());
        throttler.navigate("/documents", NavigateOptions::default());

        wait_for_dispatches(&sink, 3).await;
        assert_eq!(sink.names(), vec!["/dashboard", "/loans", "/documents"]);
    }

    #[tokio::test]
    async fn test_drain_restarts_after_idle() {
        let sink = RecordingSink::new();
        let throttler = NavigationThrottler::with_spacing(sink.clone(), Duration::from_millis(10));

        throttler.navigate("/first", NavigateOptions::default());
        wait_for_dispatches(&sink, 1).await;

        // Let the drain task wind down, then enqueue again.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(throttler.pending(), 0);

        throttler.navigate("/second", NavigateOptions::default());
        wait_for_dispatches(&sink, 2).await;
        assert_eq!(sink.names(), vec!["/first", "/second"]);
    }
}
