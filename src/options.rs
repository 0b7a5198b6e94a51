use std::time::Duration;

use serde::Deserialize;

/// Configures retry and timeout behavior of a [`Fetcher`](crate::Fetcher).
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Delay before the first retry in milliseconds; doubles after each retry.
    pub initial_backoff_ms: u64,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            timeout_ms: 10_000,
        }
    }
}

impl FetchOptions {
    /// Single attempt, any non-success response is a failure.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff_ms(mut self, initial_backoff_ms: u64) -> Self {
        self.initial_backoff_ms = initial_backoff_ms;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reads options from environment variables, keeping defaults for unset ones.
    ///
    /// Reads:
    /// - `FIDO_MAX_RETRIES` — retries after the first attempt
    /// - `FIDO_BACKOFF_MS` — initial backoff in milliseconds
    /// - `FIDO_TIMEOUT_MS` — per-request timeout in milliseconds
    ///
    /// **Not available on `wasm32` targets** — environment variables do not
    /// exist in browser runtimes.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<Self, String> {
        let mut opts = Self::default();
        if let Some(value) = parse_var(&lookup, "FIDO_MAX_RETRIES")? {
            opts.max_retries = usize::try_from(value).map_err(|err| {
                format!("FIDO_MAX_RETRIES does not fit this platform, got '{value}': {err}")
            })?;
        }
        if let Some(value) = parse_var(&lookup, "FIDO_BACKOFF_MS")? {
            opts.initial_backoff_ms = value;
        }
        if let Some(value) = parse_var(&lookup, "FIDO_TIMEOUT_MS")? {
            opts.timeout_ms = value;
        }
        Ok(opts)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> std::result::Result<Option<u64>, String> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|err| format!("{key} must be a non-negative integer, got '{raw}': {err}")),
    }
}
