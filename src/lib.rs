//! `fido` fetches JSON with retry/backoff and renders it into HTML.
//!
//! - [`Fetcher::fetch`] retrieves JSON, retrying non-success responses with
//!   exponential backoff.
//! - [`hydrate`] replaces `${name}` placeholders with values from flat data.
//! - [`Renderer::render`] combines both and appends the markup to a
//!   [`Document`] element.

pub mod dom;
mod error;
mod fetcher;
mod options;
mod render;
mod request;
pub mod retry;
pub mod template;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use dom::{Document, InsertionPoint, MemoryDocument, MemoryElement};
pub use error::FidoError;
pub use fetcher::Fetcher;
pub use options::FetchOptions;
pub use render::Renderer;
pub use request::RequestOptions;
pub use reqwest::Method;
pub use retry::Backoff;
pub use template::{hydrate, TemplateData};
pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, FidoError>;
