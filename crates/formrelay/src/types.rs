//! Core data types for submissions and their outcomes.

use serde::{Deserialize, Serialize};

/// Field values captured from a form at the moment of submission.
///
/// Pairs keep document order and duplicate names, the same way a browser
/// builds multipart form data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    /// Build a payload from `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// All pairs in submission order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted under `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode as a multipart body with one text part per field.
    pub fn into_multipart(self) -> reqwest::multipart::Form {
        self.fields
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            })
    }
}

/// What the endpoint answered. The body is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub status: u16,
}

impl ServerResponse {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a submission was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Rejection {
    /// The endpoint answered with a non-2xx status.
    Status(u16),
    /// No response arrived (connection, DNS, timeout, bad URL).
    Transport(String),
}

/// Terminal result of one relayed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Accepted { status: u16 },
    Rejected { reason: Rejection },
}

impl Outcome {
    pub fn from_response(response: &ServerResponse) -> Self {
        if response.is_success() {
            Outcome::Accepted {
                status: response.status,
            }
        } else {
            Outcome::Rejected {
                reason: Rejection::Status(response.status),
            }
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }
}

/// Errors that can occur in formrelay.
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Form not found: {0}")]
    FormNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Submission task ended early: {0}")]
    Task(String),
}

/// Convenience result type.
pub type RelayResult<T> = Result<T, RelayError>;
