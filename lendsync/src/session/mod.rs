//! Session expiry tracking and forced-logout watching.
//!
//! The session is a single expiry timestamp in the credential store with a
//! minimum time-to-live enforced at every (re)set. Consumers poll the
//! remaining time instead of subscribing to pushes, which keeps external
//! extensions visible without an event bus.

mod clock;
mod watcher;

pub use clock::{SESSION_FLOOR_MINUTES, SessionClock};
pub use watcher::{DEFAULT_WATCH_TICK, SessionWatcher};
