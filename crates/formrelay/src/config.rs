//! Configuration loading and resolution.
//!
//! Defaults are the fixed values a page ships with. Environment variables
//! override them, and the CLI overrides the environment.

use serde::{Deserialize, Serialize};

use crate::types::{RelayError, RelayResult};

/// Class that marks a form as relayed.
pub const DEFAULT_FORM_CLASS: &str = "demo__form";

/// Content swapped into an accepted form.
pub const SUCCESS_HTML: &str = "<h3>Thank you! We'll reach out shortly.</h3>";

/// Alert raised for any rejected submission.
pub const FAILURE_MESSAGE: &str = "Oops! Something went wrong. Please email us directly.";

/// Value of the `Accept` header on every relayed request.
pub const ACCEPT_JSON: &str = "application/json";

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Page URL used to resolve relative form actions when none is given.
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

pub const ENV_TIMEOUT_MS: &str = "FORMRELAY_TIMEOUT_MS";
pub const ENV_FORM_CLASS: &str = "FORMRELAY_FORM_CLASS";
pub const ENV_BASE_URL: &str = "FORMRELAY_BASE_URL";

/// Runtime settings for an interceptor and its transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub form_class: String,
    pub success_html: String,
    pub failure_message: String,
    pub timeout_ms: u64,
    pub base_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            form_class: DEFAULT_FORM_CLASS.to_string(),
            success_html: SUCCESS_HTML.to_string(),
            failure_message: FAILURE_MESSAGE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl RelayConfig {
    /// Defaults overlaid with `FORMRELAY_*` environment variables.
    pub fn from_env() -> RelayResult<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn overlay<F>(mut self, lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(ENV_TIMEOUT_MS) {
            self.timeout_ms = raw.trim().parse().map_err(|_| {
                RelayError::Config(format!("{ENV_TIMEOUT_MS} must be milliseconds, got {raw:?}"))
            })?;
        }
        if let Some(class) = get(ENV_FORM_CLASS) {
            self.form_class = class.trim().to_string();
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url.trim().to_string();
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> RelayResult<()> {
        if self.timeout_ms == 0 {
            return Err(RelayError::Config("timeout must be non-zero".to_string()));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(RelayError::Config(format!(
                "base URL is not absolute: {}",
                self.base_url
            )));
        }
        crate::target::class_selector(&self.form_class)
            .map_err(|e| RelayError::Config(e.to_string()))?;
        Ok(())
    }
}
