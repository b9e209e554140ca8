//! Session staleness.
//!
//! Staleness is checked lazily at the start of processing an inbound
//! event; no background sweep is required for correctness. The check runs
//! against the previous `last_activity_at`, before it is updated, so the
//! first message after a long absence is itself processed fresh.

use chrono::Duration;

use crate::domain::foundation::Timestamp;

use super::Session;

/// Decides when an idle session is reset.
#[derive(Debug, Clone, Copy)]
pub struct SessionLifecycle {
    threshold: Duration,
}

impl SessionLifecycle {
    /// Creates a lifecycle with the given inactivity threshold.
    pub fn new(threshold_minutes: i64) -> Self {
        Self {
            threshold: Duration::minutes(threshold_minutes),
        }
    }

    /// Returns true when the session has been idle strictly longer than
    /// the threshold.
    pub fn is_stale(&self, session: &Session, now: Timestamp) -> bool {
        now.duration_since(&session.last_activity_at()) > self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserIdentity;

    fn session_idle_for(minutes: i64, now: Timestamp) -> Session {
        Session::new(
            UserIdentity::new("919876543210").unwrap(),
            now.minus_minutes(minutes),
        )
    }

    #[test]
    fn idle_past_threshold_is_stale() {
        let lifecycle = SessionLifecycle::new(30);
        let now = Timestamp::now();
        assert!(lifecycle.is_stale(&session_idle_for(31, now), now));
    }

    #[test]
    fn idle_within_threshold_is_current() {
        let lifecycle = SessionLifecycle::new(30);
        let now = Timestamp::now();
        assert!(!lifecycle.is_stale(&session_idle_for(29, now), now));
    }

    #[test]
    fn exactly_at_threshold_is_current() {
        let lifecycle = SessionLifecycle::new(30);
        let now = Timestamp::now();
        assert!(!lifecycle.is_stale(&session_idle_for(30, now), now));
    }
}
