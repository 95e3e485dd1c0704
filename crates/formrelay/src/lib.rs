//! formrelay — intercept form submissions and relay them to their endpoint without a page reload.
//!
//! A [`Document`] dispatches submit events to registered listeners. The
//! [`SubmissionInterceptor`] claims events whose target matches its
//! predicate, posts the form fields as multipart data, and either swaps in a
//! thank-you message or raises an alert.

pub mod config;
pub mod document;
pub mod events;
pub mod html;
pub mod interceptor;
pub mod target;
pub mod transport;
pub mod types;

pub use config::RelayConfig;
pub use document::{DispatchOutcome, Document, ListenerId, SubmitEvent, SubmitListener};
pub use events::{EventBus, RelayEvent};
pub use html::{HtmlForm, HtmlPage};
pub use interceptor::{Notifier, Registration, SubmissionInterceptor, SubmissionTask};
pub use target::{class_selector, SubmissionTarget, TargetPredicate};
pub use transport::{HttpTransport, Transport};
pub use types::*;
