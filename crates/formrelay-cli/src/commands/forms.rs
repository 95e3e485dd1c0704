//! `formrelay forms <page>` — list the forms on a page and whether they are relayed.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use formrelay::html::FormSummary;
use formrelay::{class_selector, RelayConfig};

use crate::output::print_json;

#[derive(Debug, Serialize)]
pub struct FormListing {
    #[serde(flatten)]
    pub summary: FormSummary,
    pub relayed: bool,
}

/// Summarise every form on the page.
pub async fn list(page: &Path, config: &RelayConfig) -> Result<Vec<FormListing>> {
    let predicate = class_selector(&config.form_class)?;
    let page = super::load_page(page, config).await?;

    Ok(page
        .forms()
        .iter()
        .map(|form| FormListing {
            relayed: predicate(&**form),
            summary: form.summary(),
        })
        .collect())
}

/// Run the forms command.
pub async fn run(page: &Path, base_url: Option<&str>, json: bool) -> Result<()> {
    let mut config = RelayConfig::from_env()?;
    if let Some(base_url) = base_url {
        config.base_url = base_url.to_string();
    }
    config.validate()?;

    let listings = list(page, &config).await?;
    if json {
        return print_json(&listings);
    }

    if listings.is_empty() {
        println!("No forms found in {}", page.display());
        return Ok(());
    }

    for listing in &listings {
        let form = &listing.summary;
        let id = form.id.as_deref().map(|id| format!(" #{id}")).unwrap_or_default();
        let marker = if listing.relayed { "relayed" } else { "native" };
        println!(
            "[{}]{id} {marker}  {} {}",
            form.index, form.method, form.action
        );
        if !form.classes.is_empty() {
            println!("    classes: {}", form.classes.join(" "));
        }
        for (name, value) in form.fields.fields() {
            println!("    {name} = {value:?}");
        }
    }
    Ok(())
}
