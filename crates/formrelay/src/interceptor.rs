//! The submission interceptor.
//!
//! For each submit event whose target matches the predicate, the interceptor
//! prevents the native submission, snapshots the fields, and spawns a task
//! that POSTs them to the form's action URL. An accepted submission has its
//! form content replaced; any other result raises the failure alert.
//!
//! Everything before the spawn happens synchronously inside the event
//! dispatch, so the default is always suppressed before the request starts.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::config::{RelayConfig, DEFAULT_FORM_CLASS, FAILURE_MESSAGE, SUCCESS_HTML};
use crate::document::{Document, ListenerId, SubmitEvent, SubmitListener};
use crate::events::{now_timestamp, EventBus, RelayEvent};
use crate::target::{class_selector, SubmissionTarget, TargetPredicate};
use crate::transport::Transport;
use crate::types::{FormPayload, Outcome, RelayError, RelayResult, Rejection};

/// Blocking user notification, the equivalent of a modal alert.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// A relayed submission in flight.
pub struct SubmissionTask {
    url: String,
    handle: JoinHandle<Outcome>,
}

impl SubmissionTask {
    /// Target URL of the request.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the submission. If the request has not completed, neither the
    /// content swap nor the alert happens.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the submission to finish.
    pub async fn outcome(self) -> RelayResult<Outcome> {
        self.handle.await.map_err(|e| {
            if e.is_cancelled() {
                RelayError::Task(format!("submission to {} was aborted", self.url))
            } else {
                RelayError::Task(format!("submission to {} panicked", self.url))
            }
        })
    }
}

/// Relays qualifying form submissions over HTTP.
pub struct SubmissionInterceptor {
    predicate: TargetPredicate,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    success_html: Arc<str>,
    failure_message: Arc<str>,
    events: Option<Arc<EventBus>>,
}

impl SubmissionInterceptor {
    /// An interceptor for `.demo__form` forms with the stock messages.
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        let predicate: TargetPredicate =
            Arc::new(|target: &dyn SubmissionTarget| target.has_class(DEFAULT_FORM_CLASS));
        Self {
            predicate,
            transport,
            notifier,
            success_html: Arc::from(SUCCESS_HTML),
            failure_message: Arc::from(FAILURE_MESSAGE),
            events: None,
        }
    }

    pub fn from_config(
        config: &RelayConfig,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> RelayResult<Self> {
        let mut interceptor = Self::new(transport, notifier);
        interceptor.predicate = class_selector(&config.form_class)?;
        interceptor.success_html = Arc::from(config.success_html.as_str());
        interceptor.failure_message = Arc::from(config.failure_message.as_str());
        Ok(interceptor)
    }

    /// Replace the predicate that decides which targets are relayed.
    pub fn with_predicate(mut self, predicate: TargetPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Register on `document`. The interceptor stays attached until the
    /// returned [`Registration`] is stopped or dropped.
    pub fn start(self: Arc<Self>, document: &Arc<Document>) -> Registration {
        let id = document.add_listener(self);
        tracing::debug!("Submission interceptor attached ({id:?})");
        Registration {
            document: Arc::clone(document),
            id,
            active: true,
        }
    }

    pub fn matches(&self, target: &dyn SubmissionTarget) -> bool {
        (self.predicate)(target)
    }

    /// Handle one submit event.
    ///
    /// Returns `None`, leaving the event untouched, when the target does not
    /// match. Otherwise prevents the default and returns the spawned
    /// submission. Must be called from within a tokio runtime.
    pub fn handle(&self, event: &mut SubmitEvent) -> Option<SubmissionTask> {
        let target = Arc::clone(event.target());
        if !self.matches(target.as_ref()) {
            tracing::trace!("Ignoring submit for non-matching form {}", target.action_url());
            return None;
        }

        event.prevent_default();
        let payload = target.field_snapshot();
        let url = target.action_url();

        if let Some(events) = &self.events {
            events.emit(RelayEvent::SubmissionIntercepted {
                url: url.clone(),
                field_count: payload.len(),
                timestamp: now_timestamp(),
            });
        }

        let relay = Relay {
            url: url.clone(),
            target,
            transport: Arc::clone(&self.transport),
            notifier: Arc::clone(&self.notifier),
            success_html: Arc::clone(&self.success_html),
            failure_message: Arc::clone(&self.failure_message),
            events: self.events.clone(),
        };
        let handle = tokio::spawn(relay.run(payload));

        Some(SubmissionTask { url, handle })
    }
}

impl SubmitListener for SubmissionInterceptor {
    fn on_submit(&self, event: &mut SubmitEvent) -> Option<SubmissionTask> {
        self.handle(event)
    }
}

/// State moved into a spawned submission.
struct Relay {
    url: String,
    target: Arc<dyn SubmissionTarget>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    success_html: Arc<str>,
    failure_message: Arc<str>,
    events: Option<Arc<EventBus>>,
}

impl Relay {
    async fn run(self, payload: FormPayload) -> Outcome {
        let started = Instant::now();

        let outcome = match self.transport.post(&self.url, payload).await {
            Ok(response) => Outcome::from_response(&response),
            Err(e) => Outcome::Rejected {
                reason: Rejection::Transport(e.to_string()),
            },
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let event = match &outcome {
            Outcome::Accepted { status } => {
                self.target.replace_content(&self.success_html);
                tracing::info!("Submission to {} accepted ({status})", self.url);
                RelayEvent::SubmissionAccepted {
                    url: self.url.clone(),
                    status: *status,
                    elapsed_ms,
                }
            }
            Outcome::Rejected { reason } => {
                tracing::debug!("Submission to {} rejected: {reason:?}", self.url);
                self.notifier.alert(&self.failure_message);
                RelayEvent::SubmissionRejected {
                    url: self.url.clone(),
                    reason: reason.clone(),
                    elapsed_ms,
                }
            }
        };

        if let Some(events) = &self.events {
            events.emit(event);
        }

        outcome
    }
}

/// Keeps an interceptor attached to a document.
pub struct Registration {
    document: Arc<Document>,
    id: ListenerId,
    active: bool,
}

impl Registration {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Detach the interceptor. Submissions already in flight still complete.
    pub fn stop(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if self.active {
            self.document.remove_listener(self.id);
            self.active = false;
            tracing::debug!("Submission interceptor detached ({:?})", self.id);
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.detach();
    }
}
