//! Renders a JSON endpoint into an in-memory document.
//!
//! ```bash
//! RUST_LOG=fido=debug cargo run --example render -- \
//!     https://api.github.com/repos/rust-lang/rust '<p>${full_name}: ${stargazers_count} stars</p>'
//! ```

use anyhow::Context;
use fido::{Fetcher, MemoryDocument, Renderer, RequestOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().context("usage: render <url> [template]")?;
    let template = args
        .next()
        .unwrap_or_else(|| "<pre>${name}</pre>".to_owned());

    let fetcher = Fetcher::from_env().map_err(anyhow::Error::msg)?;
    let doc = MemoryDocument::new().with_element("app", "");
    let renderer = Renderer::new(doc.clone()).with_fetcher(fetcher);

    let request = RequestOptions::get()
        .header("accept", "application/json")
        .header("user-agent", "fido-demo");
    renderer.render(&template, "app", &url, &request).await?;

    println!("{}", doc.inner_html("app").unwrap_or_default());
    Ok(())
}
