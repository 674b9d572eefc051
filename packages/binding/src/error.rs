//! Error types for the binding layer.
//!
//! Accessor faults never escape `update_source` / `update_target` /
//! `validate`: they are wrapped into [`BindingError::Wrapped`] and reported as a
//! faulted [`BindingEvent`](crate::BindingEvent). Only caller contract
//! violations, such as attaching a duplicate behavior, are returned directly.

use std::sync::Arc;

use crate::{BehaviorId, BindingAction, BindingBehavior, BindingId, DataBinding};

/// A fault raised by an accessor or binding source.
///
/// Cheap to clone: the same fault is carried both inside the wrapped
/// [`BindingError`] and as the event's original error.
#[derive(Clone)]
pub struct AccessorError {
    inner: Arc<dyn std::error::Error + Send + Sync>,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageError(String);

impl AccessorError {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self {
            inner: Arc::new(error),
        }
    }

    /// A fault carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Whether both handles refer to the same fault.
    pub fn ptr_eq(&self, other: &AccessorError) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for AccessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

impl std::fmt::Display for AccessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for AccessorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for AccessorError {
    fn from(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self {
            inner: Arc::from(error),
        }
    }
}

impl From<std::io::Error> for AccessorError {
    fn from(error: std::io::Error) -> Self {
        Self::new(error)
    }
}

impl From<String> for AccessorError {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<&str> for AccessorError {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

/// Errors at the binding layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BindingError {
    /// An accessor fault, wrapped with the binding and action it interrupted.
    #[error("binding {binding} failed to {action}: {source}")]
    Wrapped {
        binding: BindingId,
        action: BindingAction,
        /// Debug tag of the target path, when it has one.
        debug_tag: Option<String>,
        source: AccessorError,
    },

    /// A behavior with the same identity is already attached.
    #[error("behavior {id} is already attached (existing: {existing}, new: {new})")]
    DuplicateBehavior {
        id: BehaviorId,
        existing: &'static str,
        new: &'static str,
    },

    /// A binding configuration could not be parsed.
    #[error("invalid binding config: {message}")]
    Config { message: String },
}

impl BindingError {
    /// The action an accessor fault interrupted.
    pub fn action(&self) -> Option<BindingAction> {
        match self {
            BindingError::Wrapped { action, .. } => Some(*action),
            _ => None,
        }
    }
}

/// Wrap an accessor fault with the binding and action it interrupted.
pub fn wrap_binding_exception(
    binding: &DataBinding,
    action: BindingAction,
    error: AccessorError,
) -> BindingError {
    BindingError::Wrapped {
        binding: binding.id(),
        action,
        debug_tag: binding.debug_tag().map(str::to_string),
        source: error,
    }
}

/// The error for attaching `new` while `existing` holds the same identity.
pub fn duplicate_behavior(
    existing: &dyn BindingBehavior,
    new: &dyn BindingBehavior,
) -> BindingError {
    BindingError::DuplicateBehavior {
        id: new.id(),
        existing: existing.name(),
        new: new.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn accessor_error_from_message() {
        let e = AccessorError::msg("boom");
        assert_eq!(format!("{}", e), "boom");
        assert!(StdError::source(&e).is_none());
    }

    #[test]
    fn accessor_error_clones_share_fault() {
        let e = AccessorError::from("boom");
        let copy = e.clone();
        assert!(e.ptr_eq(&copy));
        assert!(!e.ptr_eq(&AccessorError::msg("boom")));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "member not found");
        let e: AccessorError = io_err.into();
        assert!(e.get_ref().downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn boxed_error_converts() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = "boxed".into();
        let e = AccessorError::from(boxed);
        assert_eq!(e.to_string(), "boxed");
    }

    #[test]
    fn wrapped_display_and_source() {
        let original = AccessorError::msg("boom");
        let e = BindingError::Wrapped {
            binding: BindingId::new(),
            action: BindingAction::UpdateTarget,
            debug_tag: None,
            source: original.clone(),
        };
        let display = format!("{}", e);
        assert!(display.contains("update target"));
        assert!(display.contains("boom"));
        assert_eq!(e.action(), Some(BindingAction::UpdateTarget));

        let source = StdError::source(&e).unwrap();
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn duplicate_behavior_display() {
        let e = BindingError::DuplicateBehavior {
            id: BehaviorId::from_u128(7),
            existing: "OneTime",
            new: "OneTimeAgain",
        };
        let display = format!("{}", e);
        assert!(display.contains("already attached"));
        assert!(display.contains("OneTimeAgain"));
        assert_eq!(e.action(), None);
    }

    #[test]
    fn config_error_display() {
        let e = BindingError::Config {
            message: "expected value".to_string(),
        };
        assert_eq!(format!("{}", e), "invalid binding config: expected value");
    }
}
