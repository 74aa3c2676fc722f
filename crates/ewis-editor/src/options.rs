//! Editor options.
//!
//! The handful of tunables ewis has. Every option has a default, so an
//! editor can be built with `Options::default()`; the command line
//! overrides individual values.
//!
//! | Option            | Default | Meaning                                 |
//! |-------------------|---------|-----------------------------------------|
//! | `tab_stop`        | 4       | tab width for rendered columns (min 1)  |
//! | `message_timeout` | 5 s     | how long a status message stays visible |
//! | `quit_key`        | Ctrl-Q  | control byte that ends the session      |

use std::time::Duration;

use ewis_term::ctrl_key;

/// Default tab width.
pub const DEFAULT_TAB_STOP: usize = 4;

/// Default lifetime of a status message.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Editor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    tab_stop: usize,
    /// How long a status message stays on the message bar.
    pub message_timeout: Duration,
    /// The control byte that quits.
    pub quit_key: u8,
}

impl Options {
    /// Tab width in columns. Always at least 1.
    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Set the tab width, clamped to at least 1.
    pub fn set_tab_stop(&mut self, width: usize) {
        self.tab_stop = width.max(1);
    }

    /// Builder form of [`set_tab_stop`](Self::set_tab_stop).
    #[must_use]
    pub fn with_tab_stop(mut self, width: usize) -> Self {
        self.set_tab_stop(width);
        self
    }

    /// Builder form for the message timeout.
    #[must_use]
    pub const fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = timeout;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            quit_key: ctrl_key(b'q'),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.tab_stop(), 4);
        assert_eq!(opts.message_timeout, Duration::from_secs(5));
        assert_eq!(opts.quit_key, 0x11);
    }

    #[test]
    fn tab_stop_is_at_least_one() {
        assert_eq!(Options::default().with_tab_stop(0).tab_stop(), 1);
        assert_eq!(Options::default().with_tab_stop(8).tab_stop(), 8);
    }

    #[test]
    fn message_timeout_builder() {
        let opts = Options::default().with_message_timeout(Duration::from_secs(1));
        assert_eq!(opts.message_timeout, Duration::from_secs(1));
    }
}
