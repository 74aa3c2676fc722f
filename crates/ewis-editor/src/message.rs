//! Status message shown on the bottom screen row.
//!
//! A message is visible from the moment it is set until it is older than
//! the message timeout; after that the message bar is drawn empty. Time is
//! passed in rather than read from the clock, so visibility is testable.

use std::time::{Duration, Instant};

/// A message and the instant it was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    #[must_use]
    pub fn new(text: impl Into<String>, now: Instant) -> Self {
        Self {
            text: text.into(),
            set_at: now,
        }
    }

    /// The message text, whether or not it has expired.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text, if the message is younger than `timeout` at `now`.
    #[must_use]
    pub fn visible(&self, now: Instant, timeout: Duration) -> Option<&str> {
        (now.saturating_duration_since(self.set_at) < timeout).then_some(self.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn fresh_message_is_visible() {
        let t0 = Instant::now();
        let msg = StatusMessage::new("HELP: Ctrl-Q = quit", t0);
        assert_eq!(msg.visible(t0, TIMEOUT), Some("HELP: Ctrl-Q = quit"));
        assert_eq!(msg.visible(t0 + Duration::from_millis(4_999), TIMEOUT), Some("HELP: Ctrl-Q = quit"));
    }

    #[test]
    fn message_expires_at_timeout() {
        let t0 = Instant::now();
        let msg = StatusMessage::new("hi", t0);
        assert_eq!(msg.visible(t0 + TIMEOUT, TIMEOUT), None);
        assert_eq!(msg.text(), "hi");
    }

    #[test]
    fn clock_going_backwards_keeps_message() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let msg = StatusMessage::new("hi", t0);
        assert!(msg.visible(t0 - Duration::from_secs(1), TIMEOUT).is_some());
    }
}
