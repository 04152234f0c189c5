//! Short-lived toast notifications, one slot per channel.

use std::time::{Duration, Instant};

use super::schedule::DeferredAction;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    Validation,
    GenericError,
    GenerationFailed,
}

impl NotificationChannel {
    pub const ALL: [NotificationChannel; 3] = [
        NotificationChannel::Validation,
        NotificationChannel::GenericError,
        NotificationChannel::GenerationFailed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::GenericError => "generic_error",
            Self::GenerationFailed => "generation_failed",
        }
    }
}

pub type DismissCallback = Box<dyn FnMut(NotificationChannel)>;

struct ActiveNotification {
    message: String,
    expiry: DeferredAction<()>,
}

/// A single toast slot.
///
/// Activating while already visible replaces the message and restarts the
/// timeout from the new activation instant. The dismissal callback runs exactly
/// once per visible period: on expiry or on explicit dismissal, whichever comes
/// first. Dropping the display discards any pending expiry without running the
/// callback.
pub struct NotificationDisplay {
    channel: NotificationChannel,
    duration: Duration,
    active: Option<ActiveNotification>,
    on_dismiss: Option<DismissCallback>,
    activations: u64,
}

impl NotificationDisplay {
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            channel,
            duration: DEFAULT_NOTIFICATION_DURATION,
            active: None,
            on_dismiss: None,
            activations: 0,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_dismiss_callback(mut self, on_dismiss: DismissCallback) -> Self {
        self.on_dismiss = Some(on_dismiss);
        self
    }

    pub fn activate(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        self.activations += 1;
        tracing::debug!(
            channel = self.channel.label(),
            activation = self.activations,
            restarted = self.active.is_some(),
            "notification activated"
        );
        self.active = Some(ActiveNotification {
            message,
            expiry: DeferredAction::schedule(now, self.duration, ()),
        });
    }

    /// Explicit dismissal. Returns `false` when nothing was visible.
    pub fn dismiss(&mut self) -> bool {
        if self.active.take().is_none() {
            return false;
        }
        self.fire_dismissed();
        true
    }

    /// Expires the notification once its timeout has elapsed. Returns `true` on
    /// the tick that hid it.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = match self.active.as_mut() {
            Some(active) => active.expiry.poll(now).is_some(),
            None => false,
        };
        if expired {
            self.active = None;
            self.fire_dismissed();
        }
        expired
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.message.as_str())
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.active.as_ref().and_then(|active| active.expiry.due_at())
    }

    #[cfg(test)]
    pub fn activations(&self) -> u64 {
        self.activations
    }

    fn fire_dismissed(&mut self) {
        tracing::debug!(channel = self.channel.label(), "notification dismissed");
        if let Some(on_dismiss) = self.on_dismiss.as_mut() {
            on_dismiss(self.channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    fn counting_display() -> (NotificationDisplay, Rc<Cell<u32>>) {
        let dismissed = Rc::new(Cell::new(0));
        let counter = dismissed.clone();
        let display = NotificationDisplay::new(NotificationChannel::Validation)
            .with_dismiss_callback(Box::new(move |_| counter.set(counter.get() + 1)));
        (display, dismissed)
    }

    #[test]
    fn expires_after_default_duration() {
        let (mut display, dismissed) = counting_display();
        let start = Instant::now();
        display.activate("Please enter text", start);

        assert!(display.is_active());
        assert_eq!(display.message(), Some("Please enter text"));
        assert!(!display.tick(start + Duration::from_millis(999)));
        assert!(display.tick(start + Duration::from_millis(1000)));
        assert!(!display.is_active());
        assert_eq!(dismissed.get(), 1);
    }

    #[test]
    fn explicit_dismissal_fires_callback_only_once() {
        let (mut display, dismissed) = counting_display();
        let start = Instant::now();
        display.activate("bye", start);

        assert!(display.dismiss());
        assert_eq!(dismissed.get(), 1);

        assert!(!display.tick(start + Duration::from_millis(1000)));
        assert!(!display.tick(start + Duration::from_millis(5000)));
        assert!(!display.dismiss());
        assert_eq!(dismissed.get(), 1);
    }

    #[test]
    fn retrigger_restarts_timeout_window() {
        let (mut display, dismissed) = counting_display();
        let start = Instant::now();
        display.activate("first", start);

        let retrigger = start + Duration::from_millis(600);
        display.activate("second", retrigger);
        assert_eq!(display.message(), Some("second"));
        assert_eq!(display.deadline(), Some(retrigger + Duration::from_millis(1000)));

        assert!(!display.tick(start + Duration::from_millis(1000)));
        assert!(display.is_active());
        assert_eq!(dismissed.get(), 0);

        assert!(display.tick(retrigger + Duration::from_millis(1000)));
        assert_eq!(dismissed.get(), 1);
        assert_eq!(display.activations(), 2);
    }

    #[test]
    fn custom_duration_is_respected() {
        let mut display = NotificationDisplay::new(NotificationChannel::GenerationFailed)
            .with_duration(Duration::from_millis(4000));
        let start = Instant::now();
        display.activate("service down", start);
        assert_eq!(display.deadline(), Some(start + Duration::from_millis(4000)));
        assert!(!display.tick(start + Duration::from_millis(3999)));
        assert!(display.tick(start + Duration::from_millis(4000)));
    }

    #[test]
    fn dropping_active_display_does_not_run_callback() {
        let (mut display, dismissed) = counting_display();
        display.activate("torn down", Instant::now());
        drop(display);
        assert_eq!(dismissed.get(), 0);
    }
}
