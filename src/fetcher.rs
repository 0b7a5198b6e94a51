use std::future::Future;
use std::time::Duration;

use futures::future::{select, Either};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{retry::Backoff, FetchOptions, FidoError, RequestOptions, Result};

/// Retrying JSON fetcher.
///
/// Every non-success response is retried with exponential backoff until
/// [`FetchOptions::max_retries`] is used up. Transport and decode failures
/// fail immediately.
#[derive(Clone, Debug, Default)]
pub struct Fetcher {
    http: reqwest::Client,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher with options read from `FIDO_*` environment variables.
    ///
    /// **Not available on `wasm32` targets**. See [`FetchOptions::from_env`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> std::result::Result<Self, String> {
        Ok(Self::new().with_options(FetchOptions::from_env()?))
    }

    /// Applies retry and timeout options.
    pub fn with_options(mut self, opts: FetchOptions) -> Self {
        self.options = opts;
        self
    }

    /// Uses an existing `reqwest` client, sharing its connection pool.
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetches `url` and parses the success body as JSON.
    pub async fn fetch(&self, url: &str, request: &RequestOptions) -> Result<Value> {
        self.fetch_inner(url, request, None).await
    }

    /// Like [`Fetcher::fetch`], but deserializes the payload into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        url: &str,
        request: &RequestOptions,
    ) -> Result<T> {
        let value = self.fetch(url, request).await?;
        serde_json::from_value(value).map_err(|err| {
            FidoError::Decode(format!("payload from {url} has unexpected shape: {err}"))
        })
    }

    /// Like [`Fetcher::fetch`], aborting the in-flight request or pending
    /// backoff with [`FidoError::Cancelled`] once `cancel` fires.
    pub async fn fetch_with_cancel(
        &self,
        url: &str,
        request: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        self.fetch_inner(url, request, Some(cancel)).await
    }

    async fn fetch_inner(
        &self,
        url: &str,
        request: &RequestOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value> {
        let mut backoff = Backoff::from_options(&self.options);
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(FidoError::Cancelled);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(%url, method = %request.method, "fido: fetch attempt");

            let builder = self
                .http
                .request(request.method.clone(), url)
                .timeout(self.options.timeout());
            let sent = unless_cancelled(request.apply(builder).send(), cancel).await?;
            let response = sent.map_err(|err| {
                #[cfg(feature = "tracing")]
                tracing::warn!(%url, error = %err, "fido: unable to fetch");
                FidoError::Transport(err)
            })?;

            let status = response.status();
            let read = unless_cancelled(response.text(), cancel).await?;

            if status.is_success() {
                let body = read.map_err(FidoError::Transport)?;
                let data = serde_json::from_str::<Value>(&body).map_err(|err| {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(%url, error = %err, "fido: response is not valid JSON");
                    FidoError::Decode(format!("invalid JSON from {url}: {err}; body: {body}"))
                })?;

                #[cfg(feature = "tracing")]
                tracing::debug!(%url, payload = %data, "fido: fetched");

                return Ok(data);
            }

            // A failed status is retried even if its body cannot be read.
            let body = read.unwrap_or_else(|err| {
                #[cfg(feature = "tracing")]
                tracing::debug!(%url, error = %err, "fido: unreadable error body");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
                String::new()
            });

            let remaining = backoff.remaining();
            match backoff.next_delay() {
                Some(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "fido: {} retries remaining, attempting to fetch({}) in {} ms.",
                        remaining,
                        url,
                        delay.as_millis()
                    );
                    #[cfg(not(feature = "tracing"))]
                    let _ = remaining;

                    unless_cancelled(sleep(delay), cancel).await?;
                }
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        "fido: Unable to fetch({}): {}, {}",
                        url,
                        status.as_u16(),
                        status.canonical_reason().unwrap_or_default()
                    );
                    return Err(FidoError::Http {
                        status: status.as_u16(),
                        body,
                    });
                }
            }
        }
    }
}

/// Races `fut` against `cancel`; cancellation wins ties.
async fn unless_cancelled<F: Future>(
    fut: F,
    cancel: Option<&CancellationToken>,
) -> Result<F::Output> {
    let Some(token) = cancel else {
        return Ok(fut.await);
    };
    let cancelled = token.cancelled();
    futures::pin_mut!(fut, cancelled);
    match select(cancelled, fut).await {
        Either::Left(_) => Err(FidoError::Cancelled),
        Either::Right((output, _)) => Ok(output),
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// Suspends on a `setTimeout` promise. Runtimes without a `window`
/// (edge workers) resolve immediately.
#[cfg(target_arch = "wasm32")]
async fn sleep(delay: Duration) {
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().and_then(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
                .ok()
        });
        if scheduled.is_none() {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}
