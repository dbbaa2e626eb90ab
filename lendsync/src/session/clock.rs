//! Session expiry clock.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::credentials::CredentialStore;

/// Minimum session time-to-live, in minutes, enforced whenever the expiry
/// is (re)set. Also the renewal window for activity-based extension, so
/// repeated activity cannot compound the expiry beyond one extension's
/// ceiling.
pub const SESSION_FLOOR_MINUTES: i64 = 5;

const MS_PER_MINUTE: i64 = 60_000;

/// Tracks the session-expiry timestamp held in the credential store.
///
/// State machine: Unset -> Valid -> Expired. `extend` always moves to
/// Valid with at least the floor applied. The floor applies only at
/// (re)set time; reads report the raw remaining time, so an idle session
/// below the floor simply runs out.
#[derive(Clone)]
pub struct SessionClock {
    store: Arc<dyn CredentialStore>,
}

impl SessionClock {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Expiry as epoch milliseconds, if a session was established.
    pub fn expires_at(&self) -> Option<i64> {
        self.store.session_expiry()
    }

    /// Milliseconds until expiry; 0 once expired or when no session is
    /// set.
    pub fn remaining_ms(&self) -> i64 {
        match self.store.session_expiry() {
            Some(expires_at) => (expires_at - Utc::now().timestamp_millis()).max(0),
            None => 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.remaining_ms() > 0
    }

    /// (Re)establish the session to expire `max(minutes, floor)` minutes
    /// from now.
    pub fn extend(&self, minutes: i64) {
        let ttl = minutes.max(SESSION_FLOOR_MINUTES);
        let expires_at = Utc::now().timestamp_millis() + ttl * MS_PER_MINUTE;
        self.store.set_session_expiry(expires_at);
        debug!(minutes = ttl, "Session extended");
    }

    /// Extend in response to user activity, but only while the session is
    /// inside the renewal window (less than the floor remaining). Returns
    /// whether an extension happened; outside the window this is a no-op,
    /// which keeps active users logged in without renewing idle ones
    /// indefinitely.
    pub fn extend_on_activity(&self, minutes: i64) -> bool {
        if self.remaining_ms() < SESSION_FLOOR_MINUTES * MS_PER_MINUTE {
            self.extend(minutes);
            true
        } else {
            false
        }
    }

    /// Drop the session marker entirely.
    pub fn clear(&self) {
        self.store.clear_session_expiry();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;

    fn clock() -> (Arc<MemoryCredentialStore>, SessionClock) {
        let store = Arc::new(MemoryCredentialStore::new());
        let clock = SessionClock::new(store.clone());
        (store, clock)
    }

    #[test]
    fn test_unset_session_reports_zero() {
        let (_, clock) = clock();
        assert_eq!(clock.remaining_ms(), 0);
        assert_eq!(clock.expires_at(), None);
        assert!(!clock.is_valid());
    }

    #[test]
    fn test_extend_enforces_floor() {
        let (_, clock) = clock();

        // A one-minute request still yields the five-minute floor.
        clock.extend(1);
        let remaining = clock.remaining_ms();
        assert!(remaining >= 299_000, "got {remaining}");
        assert!(remaining <= 300_000);
    }

    #[test]
    fn test_extend_beyond_floor_is_honored() {
        let (_, clock) = clock();
        clock.extend(30);
        let remaining = clock.remaining_ms();
        assert!(remaining > 29 * 60_000);
        assert!(remaining <= 30 * 60_000);
    }

    #[test]
    fn test_expired_session_clamps_to_zero() {
        let (store, clock) = clock();
        store.set_session_expiry(Utc::now().timestamp_millis() - 1_000);
        assert_eq!(clock.remaining_ms(), 0);
        assert!(!clock.is_valid());
    }

    #[test]
    fn test_activity_extension_guard() {
        let (store, clock) = clock();

        // Well above the renewal window: activity must be a no-op.
        let far = Utc::now().timestamp_millis() + 10 * 60_000;
        store.set_session_expiry(far);
        assert!(!clock.extend_on_activity(5));
        assert_eq!(store.session_expiry(), Some(far));

        // Inside the window: activity extends back up to the floor.
        let near = Utc::now().timestamp_millis() + 60_000;
        store.set_session_expiry(near);
        assert!(clock.extend_on_activity(5));
        assert!(clock.remaining_ms() >= 299_000);
    }

    #[test]
    fn test_clear_returns_to_unset() {
        let (_, clock) = clock();
        clock.extend(5);
        assert!(clock.is_valid());
        clock.clear();
        assert_eq!(clock.expires_at(), None);
    }
}
