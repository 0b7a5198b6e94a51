use std::time::Duration;

use crate::FetchOptions;

/// Retry state of a single fetch: remaining retries and the next delay.
///
/// Each call to [`Backoff::next_delay`] consumes one retry and doubles the
/// delay for the following one. Once no retries remain the state is
/// terminal and `next_delay` keeps returning `None`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Backoff {
    remaining: usize,
    delay_ms: u64,
}

impl Backoff {
    pub fn new(max_retries: usize, initial_backoff_ms: u64) -> Self {
        Self {
            remaining: max_retries,
            delay_ms: initial_backoff_ms,
        }
    }

    pub fn from_options(opts: &FetchOptions) -> Self {
        Self::new(opts.max_retries, opts.initial_backoff_ms)
    }

    /// Retries still available.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Delay the next retry would wait, in milliseconds.
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Consumes one retry, returning how long to wait before it.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        let delay = Duration::from_millis(self.delay_ms);
        self.remaining -= 1;
        self.delay_ms = self.delay_ms.saturating_mul(2);
        Some(delay)
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        self.next_delay()
    }
}
