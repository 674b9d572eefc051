//! Process-wide services shared by bindings.
//!
//! Created once at application start and handed to every
//! [`DataBinding`] constructor; dropping the last clone tears them down.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::{BindingConfig, BindingEvent, BindingId, DataBinding};

/// Tracks live bindings.
pub trait BindingRegistry: Send + Sync {
    fn register(&self, binding: &Arc<DataBinding>);

    /// Called once, when `binding` is disposed.
    fn unregister(&self, binding: &DataBinding);
}

/// Receives debug trace messages from bindings with a debuggable target path.
pub trait DebugSink: Send + Sync {
    fn debug(&self, binding: &DataBinding, tag: &str, message: &str);
}

/// Receives faults that are routed past the binding's own listeners.
pub trait ExceptionSink: Send + Sync {
    fn on_exception(&self, binding: &DataBinding, event: &BindingEvent);
}

/// A registry holding weak references, keyed by binding id.
#[derive(Default)]
pub struct InMemoryBindingRegistry {
    bindings: Mutex<BTreeMap<BindingId, Weak<DataBinding>>>,
}

impl InMemoryBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<BindingId, Weak<DataBinding>>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The live binding with this id, if registered and not yet dropped.
    pub fn get(&self, id: BindingId) -> Option<Arc<DataBinding>> {
        self.lock().get(&id).and_then(Weak::upgrade)
    }

    /// Registered ids, in id order.
    pub fn ids(&self) -> Vec<BindingId> {
        self.lock().keys().copied().collect()
    }
}

impl BindingRegistry for InMemoryBindingRegistry {
    fn register(&self, binding: &Arc<DataBinding>) {
        tracing::trace!(binding = %binding.id(), "registering binding");
        self.lock().insert(binding.id(), Arc::downgrade(binding));
    }

    fn unregister(&self, binding: &DataBinding) {
        tracing::trace!(binding = %binding.id(), "unregistering binding");
        self.lock().remove(&binding.id());
    }
}

impl fmt::Debug for InMemoryBindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBindingRegistry")
            .field("bindings", &self.ids())
            .finish()
    }
}

/// Emits debug messages as `tracing` debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDebugSink;

impl DebugSink for TracingDebugSink {
    fn debug(&self, binding: &DataBinding, tag: &str, message: &str) {
        tracing::debug!(binding = %binding.id(), tag, "{}", message);
    }
}

/// Emits faults as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingExceptionSink;

impl ExceptionSink for TracingExceptionSink {
    fn on_exception(&self, binding: &DataBinding, event: &BindingEvent) {
        match event.error() {
            Some(error) => tracing::error!(
                binding = %binding.id(),
                action = %event.action(),
                "{}",
                error
            ),
            None => tracing::error!(
                binding = %binding.id(),
                action = %event.action(),
                "binding fault"
            ),
        }
    }
}

/// Services passed to every binding.
///
/// Cloning is cheap; clones share the same registry and sinks.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tether_binding::{BindingConfig, BindingServices, ExceptionRouting, InMemoryBindingRegistry};
///
/// let registry = Arc::new(InMemoryBindingRegistry::new());
/// let services = BindingServices::new()
///     .with_registry(registry.clone())
///     .with_config(BindingConfig {
///         exception_routing: ExceptionRouting::Always,
///         ..Default::default()
///     });
/// assert!(services.exception_sink().is_some());
/// assert!(registry.is_empty());
/// ```
#[derive(Clone)]
pub struct BindingServices {
    registry: Arc<dyn BindingRegistry>,
    debug: Arc<dyn DebugSink>,
    exceptions: Option<Arc<dyn ExceptionSink>>,
    config: BindingConfig,
}

impl BindingServices {
    /// In-memory registry, `tracing` sinks, default config.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(InMemoryBindingRegistry::new()),
            debug: Arc::new(TracingDebugSink),
            exceptions: Some(Arc::new(TracingExceptionSink)),
            config: BindingConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn BindingRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.debug = sink;
        self
    }

    pub fn with_exception_sink(mut self, sink: Arc<dyn ExceptionSink>) -> Self {
        self.exceptions = Some(sink);
        self
    }

    /// Drop the exception sink. Routed faults are then logged with
    /// `tracing::warn!`.
    pub fn without_exception_sink(mut self) -> Self {
        self.exceptions = None;
        self
    }

    pub fn with_config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<dyn BindingRegistry> {
        &self.registry
    }

    pub fn debug_sink(&self) -> &Arc<dyn DebugSink> {
        &self.debug
    }

    pub fn exception_sink(&self) -> Option<&Arc<dyn ExceptionSink>> {
        self.exceptions.as_ref()
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Register `binding` with the registry. Bindings do not register
    /// themselves.
    pub fn register(&self, binding: &Arc<DataBinding>) {
        self.registry.register(binding);
    }
}

impl Default for BindingServices {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingServices")
            .field("has_exception_sink", &self.exceptions.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
