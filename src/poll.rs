//! Bounded polling
//!
//! The reader has no interrupt line, so every wait is a busy poll: evaluate a
//! condition, sleep a fixed interval, and give up once the accumulated sleep
//! reaches the deadline. Time is counted from the sleeps themselves, so any
//! `DelayNs` works, including a fake one in tests.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::error::Error;

pub const DEFAULT_TIMEOUT_MS: u32 = 1000;
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 5;

/// Deadline and step of a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    /// 0 waits forever
    pub timeout_ms: u32,
    pub interval_ms: u32,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Poller {
    pub fn new(timeout_ms: u32, interval_ms: u32) -> Self {
        Self {
            timeout_ms,
            interval_ms: interval_ms.max(1),
        }
    }

    /// Poll `condition` until it holds or the deadline passes
    ///
    /// Returns `Ok(false)` on timeout, after logging a warning tagged with
    /// `what`. Errors from the condition itself end the wait immediately.
    pub fn wait_for<D, F>(&self, delay: &mut D, what: &str, mut condition: F) -> Result<bool, Error>
    where
        D: DelayNs,
        F: FnMut() -> Result<bool, Error>,
    {
        let interval = self.interval_ms.max(1);
        let mut elapsed: u32 = 0;

        loop {
            if condition()? {
                return Ok(true);
            }
            if self.timeout_ms > 0 && elapsed >= self.timeout_ms {
                warn!("{what} timeout after {elapsed} ms");
                return Ok(false);
            }
            delay.delay_ms(interval);
            elapsed = elapsed.saturating_add(interval);
        }
    }
}
