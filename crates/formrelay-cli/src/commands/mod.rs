//! Subcommand implementations for the `formrelay` binary.

pub mod forms;
pub mod submit;

use anyhow::{Context, Result};
use std::path::Path;

use formrelay::{HtmlPage, RelayConfig};

/// Read and parse an HTML page from disk.
pub async fn load_page(path: &Path, config: &RelayConfig) -> Result<HtmlPage> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read page: {}", path.display()))?;
    HtmlPage::parse(&html, &config.base_url)
        .with_context(|| format!("failed to parse page: {}", path.display()))
}
