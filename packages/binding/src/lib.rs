//! Tether Binding: Bidirectional Data-Binding Core
//!
//! A [`DataBinding`] links a *target* endpoint (usually a UI-owned property)
//! to a *source* endpoint (usually a view-model property or expression). The
//! binding does not read or write endpoints itself. Platform layers supply
//! accessors, and the binding orchestrates them:
//!
//! - [`BindingSourceAccessor`] / [`SingleBindingSourceAccessor`]: read, write
//!   and validate an endpoint
//! - [`BindingBehavior`]: pluggable units attached to a binding, unique by
//!   [`BehaviorId`]
//! - [`BindingServices`]: the process-wide registry, debug sink and exception
//!   sink, passed to every binding
//!
//! Accessor faults never escape an update. They are wrapped into
//! [`BindingError::Wrapped`] and reported as a faulted [`BindingEvent`], and
//! routed to the [`ExceptionSink`] when no listener observed them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tether_binding::{
//!     AccessorError, BindingPath, BindingServices, BindingSource, BindingSourceAccessor,
//!     BindingValue, DataBinding, SingleBindingSourceAccessor,
//! };
//!
//! struct Member(BindingPath);
//!
//! impl BindingSource for Member {
//!     fn path(&self) -> &BindingPath {
//!         &self.0
//!     }
//!
//!     fn validate(&self, _throw_on_error: bool) -> Result<bool, AccessorError> {
//!         Ok(true)
//!     }
//! }
//!
//! struct Cell {
//!     sources: Vec<Arc<dyn BindingSource>>,
//!     value: Mutex<BindingValue>,
//! }
//!
//! impl Cell {
//!     fn new(path: &str, value: BindingValue) -> Self {
//!         Self {
//!             sources: vec![Arc::new(Member(BindingPath::new(path)))],
//!             value: Mutex::new(value),
//!         }
//!     }
//! }
//!
//! impl BindingSourceAccessor for Cell {
//!     fn sources(&self) -> &[Arc<dyn BindingSource>] {
//!         &self.sources
//!     }
//!
//!     fn get_value(&self, _: &DataBinding, _: bool) -> Result<BindingValue, AccessorError> {
//!         Ok(self.value.lock().map_err(|e| AccessorError::msg(e.to_string()))?.clone())
//!     }
//!
//!     fn set_value(
//!         &self,
//!         other: &dyn BindingSourceAccessor,
//!         binding: &DataBinding,
//!         throw_on_error: bool,
//!     ) -> Result<bool, AccessorError> {
//!         let value = other.get_value(binding, throw_on_error)?;
//!         *self.value.lock().map_err(|e| AccessorError::msg(e.to_string()))? = value;
//!         Ok(true)
//!     }
//! }
//!
//! impl SingleBindingSourceAccessor for Cell {
//!     fn source(&self) -> &Arc<dyn BindingSource> {
//!         &self.sources[0]
//!     }
//! }
//!
//! let target = Arc::new(Cell::new("Text", BindingValue::Unset));
//! let source = Cell::new("Name", BindingValue::new("Alice".to_string()));
//! let binding = DataBinding::new(target.clone(), source, BindingServices::default());
//!
//! assert!(binding.update_target());
//! let shown = target.get_value(&binding, true).unwrap();
//! assert_eq!(shown.get::<String>().as_deref(), Some("Alice"));
//!
//! binding.dispose();
//! assert!(binding.is_disposed());
//! ```

mod accessor;
mod behavior;
mod binding;
mod config;
pub mod error;
mod event;
mod id;
mod path;
mod services;
mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_doubles;

pub use accessor::{
    AsSourceAccessor, BindingSource, BindingSourceAccessor, SingleBindingSourceAccessor,
};
pub use behavior::{BindingBehavior, Behaviors};
pub use binding::{BindingHooks, DataBinding, BINDING};
pub use config::{BindingConfig, ExceptionRouting};
pub use error::{AccessorError, BindingError};
pub use event::{BindingAction, BindingEvent, BindingOutcome, ListenerId};
pub use id::{BehaviorId, BindingId};
pub use path::BindingPath;
pub use services::{
    BindingRegistry, BindingServices, DebugSink, ExceptionSink, InMemoryBindingRegistry,
    TracingDebugSink, TracingExceptionSink,
};
pub use value::BindingValue;
