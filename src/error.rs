/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FidoError {
    /// Network, timeout or request-construction error from `reqwest`.
    ///
    /// Transport failures are never retried.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Last non-success HTTP response once retries are exhausted.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Success response whose body is not valid JSON.
    #[error("decode error: {0}")]
    Decode(String),
    /// No element with the requested id exists in the document.
    #[error("the element with id={0} does not exist")]
    TargetNotFound(String),
    /// Fetched data cannot be used to hydrate a template.
    #[error("hydrate error: {0}")]
    Hydrate(String),
    /// The document rejected the hydrated markup.
    #[error("insert error: {0}")]
    Insert(String),
    /// The caller's cancellation token fired before completion.
    #[error("operation cancelled")]
    Cancelled,
}

impl FidoError {
    /// HTTP status of the final response, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
