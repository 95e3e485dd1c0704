//! Relay event bus — typed events for every intercepted submission.
//!
//! The EventBus is a `tokio::sync::broadcast` channel that carries
//! [`RelayEvent`] values. Consumers such as the CLI's JSON output subscribe
//! independently. When no subscribers exist, events are silently dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::Rejection;

/// Default buffer size for [`EventBus::default`].
pub const DEFAULT_CAPACITY: usize = 64;

/// Every event the interceptor emits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RelayEvent {
    /// A qualifying submission had its default suppressed and is being sent.
    SubmissionIntercepted {
        url: String,
        field_count: usize,
        timestamp: String,
    },
    /// The endpoint answered 2xx and the form content was replaced.
    SubmissionAccepted {
        url: String,
        status: u16,
        elapsed_ms: u64,
    },
    /// The submission failed and the user was alerted.
    SubmissionRejected {
        url: String,
        reason: Rejection,
        elapsed_ms: u64,
    },
}

impl RelayEvent {
    /// Target URL of the submission this event belongs to.
    pub fn url(&self) -> &str {
        match self {
            RelayEvent::SubmissionIntercepted { url, .. }
            | RelayEvent::SubmissionAccepted { url, .. }
            | RelayEvent::SubmissionRejected { url, .. } => url,
        }
    }

    /// True for the last event of a submission.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelayEvent::SubmissionIntercepted { .. })
    }
}

/// Broadcast channel shared by interceptors and their observers.
pub struct EventBus {
    sender: broadcast::Sender<RelayEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Emit an event to all subscribers. Silently ignores if no subscribers.
    pub fn emit(&self, event: RelayEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// RFC 3339 timestamp for the current time.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
