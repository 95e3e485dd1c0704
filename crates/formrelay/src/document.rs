//! Document host — dispatches submit events to registered listeners.
//!
//! A [`Document`] stands in for the page: it owns the listener list and
//! delivers each [`SubmitEvent`] to every listener synchronously, in
//! registration order. Whatever a listener does to the event (for example
//! preventing its default) is visible to the dispatcher as soon as
//! [`Document::dispatch`] returns, before any relayed request has run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::interceptor::SubmissionTask;
use crate::target::SubmissionTarget;
use crate::types::{Outcome, RelayResult};

/// A user-initiated form submission, valid for one dispatch.
pub struct SubmitEvent {
    target: Arc<dyn SubmissionTarget>,
    cancelable: bool,
    default_prevented: bool,
}

impl SubmitEvent {
    /// A cancelable submit event, as raised by a user submitting a form.
    pub fn new(target: Arc<dyn SubmissionTarget>) -> Self {
        Self {
            target,
            cancelable: true,
            default_prevented: false,
        }
    }

    /// A submit event whose default cannot be prevented.
    pub fn non_cancelable(target: Arc<dyn SubmissionTarget>) -> Self {
        Self {
            cancelable: false,
            ..Self::new(target)
        }
    }

    pub fn target(&self) -> &Arc<dyn SubmissionTarget> {
        &self.target
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Suppress the native submission. No effect on non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Receives submit events from a [`Document`].
pub trait SubmitListener: Send + Sync {
    /// Handle one event. Listeners that start a relayed submission return
    /// its task.
    fn on_submit(&self, event: &mut SubmitEvent) -> Option<SubmissionTask>;
}

/// Handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What happened to a dispatched submit event.
pub struct DispatchOutcome {
    /// When false, the host proceeds with the native submission.
    pub default_prevented: bool,
    /// Submissions started by listeners.
    pub tasks: Vec<SubmissionTask>,
}

impl DispatchOutcome {
    /// Wait for every started submission and collect their outcomes.
    pub async fn join(self) -> RelayResult<Vec<Outcome>> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            outcomes.push(task.outcome().await?);
        }
        Ok(outcomes)
    }
}

type ListenerList = Vec<(ListenerId, Arc<dyn SubmitListener>)>;

/// The page-level event target for submit events.
pub struct Document {
    listeners: RwLock<ListenerList>,
    next_id: AtomicU64,
}

impl Document {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn SubmitListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Dispatch a cancelable submit event for `target`.
    pub fn dispatch_submit(&self, target: Arc<dyn SubmissionTarget>) -> DispatchOutcome {
        self.dispatch(SubmitEvent::new(target))
    }

    /// Deliver `event` to every listener registered at the time of the call.
    pub fn dispatch(&self, mut event: SubmitEvent) -> DispatchOutcome {
        // Listeners may add or remove listeners while handling the event.
        let listeners: Vec<Arc<dyn SubmitListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        let tasks = listeners
            .iter()
            .filter_map(|listener| listener.on_submit(&mut event))
            .collect();

        DispatchOutcome {
            default_prevented: event.default_prevented(),
            tasks,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
