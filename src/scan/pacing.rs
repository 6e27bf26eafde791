//! Request pacing and throttle retry policy for upstream calls.

use backoff::backoff::Backoff;
use std::time::Duration;

/// Retries allowed after a throttled request, on top of the initial attempt.
pub const MAX_THROTTLE_RETRIES: u32 = 3;

/// Fixed delays between sequential upstream requests.
///
/// These keep a free-tier RPC endpoint from throttling the scan in the first
/// place; the retry policy below handles the times it throttles anyway.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// Delay between signature page fetches.
    pub signature_page: Duration,
    /// Delay after each transaction fetch, whether it succeeded or not.
    pub transaction_fetch: Duration,
    /// Delay after each price lookup during draw assembly.
    pub price_lookup: Duration,
}

impl Pacing {
    pub fn standard() -> Self {
        Self {
            signature_page: Duration::from_millis(300),
            transaction_fetch: Duration::from_millis(500),
            price_lookup: Duration::from_millis(200),
        }
    }

    /// No delays, for tests.
    pub fn none() -> Self {
        Self {
            signature_page: Duration::ZERO,
            transaction_fetch: Duration::ZERO,
            price_lookup: Duration::ZERO,
        }
    }
}

/// Linearly growing waits between throttle retries: 2s, 4s, 6s, then give up.
#[derive(Debug, Clone)]
pub struct ThrottleBackoff {
    base: Duration,
    attempt: u32,
}

impl ThrottleBackoff {
    pub fn new() -> Self {
        Self::with_base(Duration::from_secs(2))
    }

    /// Same retry count with a custom step, for tests.
    pub fn with_base(base: Duration) -> Self {
        Self { base, attempt: 0 }
    }
}

impl Default for ThrottleBackoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff for ThrottleBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= MAX_THROTTLE_RETRIES {
            return None;
        }
        self.attempt += 1;
        Some(self.base * self.attempt)
    }

    fn reset(&mut self) {
        self.attempt = 0;
    }
}
