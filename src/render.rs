use tokio_util::sync::CancellationToken;

use crate::{
    dom::{Document, InsertionPoint},
    hydrate, Fetcher, FidoError, RequestOptions, Result,
};

/// Fetches JSON, hydrates a template with it and appends the markup to a
/// document element.
///
/// Calls are independent: each one owns its retry state, and concurrent
/// renders into the same document complete in no particular order.
#[derive(Clone, Debug)]
pub struct Renderer<D> {
    fetcher: Fetcher,
    document: D,
}

impl<D: Document> Renderer<D> {
    /// Creates a renderer using a default [`Fetcher`].
    pub fn new(document: D) -> Self {
        Self {
            fetcher: Fetcher::new(),
            document,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Renders `template` with data from `url` into the element `target_id`.
    ///
    /// The target is resolved before anything else: a missing element fails
    /// on the first poll and no request is sent. On any failure the target is
    /// left untouched and the error is logged as well as returned, so callers
    /// may ignore the result.
    pub async fn render(
        &self,
        template: &str,
        target_id: &str,
        url: &str,
        request: &RequestOptions,
    ) -> Result<()> {
        self.render_inner(template, target_id, url, request, None)
            .await
    }

    /// Like [`Renderer::render`], abandoning the fetch once `cancel` fires.
    pub async fn render_with_cancel(
        &self,
        template: &str,
        target_id: &str,
        url: &str,
        request: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.render_inner(template, target_id, url, request, Some(cancel))
            .await
    }

    async fn render_inner(
        &self,
        template: &str,
        target_id: &str,
        url: &str,
        request: &RequestOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!(target_id, %url, "fido: render");

        let result = self
            .render_into(template, target_id, url, request, cancel)
            .await;

        if let Err(err) = &result {
            #[cfg(feature = "tracing")]
            tracing::error!(target_id, %url, "fido: {err}");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
        }

        result
    }

    async fn render_into(
        &self,
        template: &str,
        target_id: &str,
        url: &str,
        request: &RequestOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        let target = self
            .document
            .target_by_id(target_id)
            .ok_or_else(|| FidoError::TargetNotFound(target_id.to_owned()))?;

        let data = match cancel {
            Some(token) => self.fetcher.fetch_with_cancel(url, request, token).await?,
            None => self.fetcher.fetch(url, request).await?,
        };
        if data.is_null() {
            return Err(FidoError::Hydrate(format!(
                "{url} returned null, nothing to hydrate"
            )));
        }

        target.append_html(&hydrate(template, &data))
    }
}
