//! Update notifications raised by a binding.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::{AccessorError, BindingError, DataBinding};

/// Which direction an update (or the validation step that faulted) ran in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingAction {
    /// Target → source.
    UpdateSource,
    /// Source → target.
    UpdateTarget,
}

impl BindingAction {
    pub fn is_source(&self) -> bool {
        matches!(self, BindingAction::UpdateSource)
    }

    pub fn is_target(&self) -> bool {
        matches!(self, BindingAction::UpdateTarget)
    }
}

impl fmt::Display for BindingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingAction::UpdateSource => f.write_str("update source"),
            BindingAction::UpdateTarget => f.write_str("update target"),
        }
    }
}

/// How an operation ended.
#[derive(Debug, Clone)]
pub enum BindingOutcome {
    /// The receiving accessor accepted the value.
    Succeeded,
    /// The receiving accessor rejected the value without faulting.
    Failed,
    /// An accessor faulted.
    Faulted {
        error: BindingError,
        original: AccessorError,
    },
}

/// An update notification.
#[derive(Debug, Clone)]
pub struct BindingEvent {
    action: BindingAction,
    outcome: BindingOutcome,
}

impl BindingEvent {
    pub fn succeeded(action: BindingAction) -> Self {
        Self {
            action,
            outcome: BindingOutcome::Succeeded,
        }
    }

    pub fn failed(action: BindingAction) -> Self {
        Self {
            action,
            outcome: BindingOutcome::Failed,
        }
    }

    pub fn faulted(action: BindingAction, error: BindingError, original: AccessorError) -> Self {
        Self {
            action,
            outcome: BindingOutcome::Faulted { error, original },
        }
    }

    pub fn action(&self) -> BindingAction {
        self.action
    }

    pub fn outcome(&self) -> &BindingOutcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BindingOutcome::Succeeded)
    }

    pub fn is_fault(&self) -> bool {
        matches!(self.outcome, BindingOutcome::Faulted { .. })
    }

    /// The wrapped error of a faulted event.
    pub fn error(&self) -> Option<&BindingError> {
        match &self.outcome {
            BindingOutcome::Faulted { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The accessor's own error of a faulted event.
    pub fn original_error(&self) -> Option<&AccessorError> {
        match &self.outcome {
            BindingOutcome::Faulted { original, .. } => Some(original),
            _ => None,
        }
    }
}

/// Handle returned by [`DataBinding::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub(crate) type Listener = Arc<dyn Fn(&DataBinding, &BindingEvent) + Send + Sync>;

/// Registered listeners, notified in subscription order.
#[derive(Default)]
pub(crate) struct ListenerList {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ListenerId, Listener)>>,
}

impl ListenerList {
    pub(crate) fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    /// Deliver `event` to every listener, returning whether there were any.
    ///
    /// The list is snapshotted first so listeners may (un)subscribe while
    /// being notified.
    pub(crate) fn notify(&self, binding: &DataBinding, event: &BindingEvent) -> bool {
        let snapshot: Vec<Listener> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &snapshot {
            listener(binding, event);
        }
        !snapshot.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
