//! Time sources and single-shot deferred actions driven by the UI frame loop.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Monotonic time for timers plus wall-clock time for date-gated features.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn wall_clock(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A payload released once its deadline has passed.
///
/// There is no cancel method: dropping the action (or the view that owns it)
/// is the only way to stop it from firing.
#[derive(Debug)]
pub struct DeferredAction<T> {
    due_at: Instant,
    payload: Option<T>,
}

impl<T> DeferredAction<T> {
    pub fn schedule(now: Instant, delay: Duration, payload: T) -> Self {
        Self {
            due_at: now + delay,
            payload: Some(payload),
        }
    }

    /// Deadline of an action that has not fired yet.
    pub fn due_at(&self) -> Option<Instant> {
        self.payload.as_ref().map(|_| self.due_at)
    }

    pub fn is_pending(&self) -> bool {
        self.payload.is_some()
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if now >= self.due_at {
            self.payload.take()
        } else {
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_deadline() {
        let start = Instant::now();
        let mut action = DeferredAction::schedule(start, Duration::from_millis(2000), "go");

        assert_eq!(action.poll(start + Duration::from_millis(1999)), None);
        assert_eq!(action.due_at(), Some(start + Duration::from_millis(2000)));
        assert_eq!(action.poll(start + Duration::from_millis(2000)), Some("go"));
        assert_eq!(action.poll(start + Duration::from_millis(5000)), None);
        assert!(!action.is_pending());
        assert_eq!(action.due_at(), None);
    }
}
