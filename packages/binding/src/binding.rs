//! The binding core.
//!
//! A [`DataBinding`] links a target accessor to a source accessor. It runs
//! update-source / update-target operations under a reentrancy guard, owns the
//! attached behaviors, reports outcomes to its listeners, and doubles as its
//! own [`DataContext`] for side-channel metadata.
//!
//! # Lifecycle
//!
//! ```text
//! Active ──dispose()──► Disposed
//! ```
//!
//! Disposal is idempotent and race-free: the context slot is atomically
//! swapped to the shared empty sentinel and only the caller that saw a
//! non-sentinel value runs teardown.
//!
//! # Reentrancy
//!
//! Each direction has an advisory guard. A nested `update_source` from within
//! an in-flight `update_source` on the same binding returns `false` without
//! raising an event. The guard is not a lock: concurrent callers on other
//! threads are neither blocked nor queued.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use tether_context::{
    ContextEntry, ContextError, ContextValue, DataConstant, DataContext, DataContextMap, DataKey,
};

use crate::behavior::{BehaviorSet, Behaviors};
use crate::error::wrap_binding_exception;
use crate::event::ListenerList;
use crate::{
    AccessorError, BindingAction, BindingBehavior, BindingEvent, BindingId, BindingServices,
    BindingSourceAccessor, ExceptionRouting, ListenerId, SingleBindingSourceAccessor,
};

/// The owning binding, as seen through the binding's own context.
pub static BINDING: DataConstant<Weak<DataBinding>> = DataConstant::new("tether.binding");

/// Extension points called by the binding at lifecycle transitions.
///
/// All methods default to no-ops.
pub trait BindingHooks: Send + Sync {
    /// A behavior accepted attachment and was kept.
    fn on_behavior_added(&self, _binding: &DataBinding, _behavior: &dyn BindingBehavior) {}

    /// A behavior was removed and detached.
    fn on_behavior_removed(&self, _binding: &DataBinding, _behavior: &dyn BindingBehavior) {}

    /// Teardown is starting. Runs once.
    fn on_dispose(&self, _binding: &DataBinding) {}
}

struct NoHooks;

impl BindingHooks for NoHooks {}

/// Sets a flag for the lifetime of the guard, including on unwind.
struct UpdateGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> UpdateGuard<'a> {
    /// `None` if the flag is already set.
    fn enter(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::Acquire) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A bidirectional link between a target and a source endpoint.
///
/// Always handled through `Arc<DataBinding>`; behaviors and the registry keep
/// [`Weak`] references.
pub struct DataBinding {
    id: BindingId,
    this: Weak<DataBinding>,
    target: Box<dyn SingleBindingSourceAccessor>,
    source: Box<dyn BindingSourceAccessor>,
    behaviors: BehaviorSet,
    listeners: ListenerList,
    is_source_updating: AtomicBool,
    is_target_updating: AtomicBool,
    /// `None` until first mutation; the empty sentinel once disposed.
    context: ArcSwapOption<DataContextMap>,
    services: BindingServices,
    hooks: Box<dyn BindingHooks>,
}

impl DataBinding {
    pub fn new<T, S>(target: T, source: S, services: BindingServices) -> Arc<Self>
    where
        T: SingleBindingSourceAccessor + 'static,
        S: BindingSourceAccessor + 'static,
    {
        Self::from_boxed(Box::new(target), Box::new(source), services, Box::new(NoHooks))
    }

    pub fn with_hooks<T, S, H>(
        target: T,
        source: S,
        services: BindingServices,
        hooks: H,
    ) -> Arc<Self>
    where
        T: SingleBindingSourceAccessor + 'static,
        S: BindingSourceAccessor + 'static,
        H: BindingHooks + 'static,
    {
        Self::from_boxed(Box::new(target), Box::new(source), services, Box::new(hooks))
    }

    pub fn from_boxed(
        target: Box<dyn SingleBindingSourceAccessor>,
        source: Box<dyn BindingSourceAccessor>,
        services: BindingServices,
        hooks: Box<dyn BindingHooks>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            id: BindingId::new(),
            this: this.clone(),
            target,
            source,
            behaviors: BehaviorSet::default(),
            listeners: ListenerList::default(),
            is_source_updating: AtomicBool::new(false),
            is_target_updating: AtomicBool::new(false),
            context: ArcSwapOption::empty(),
            services,
            hooks,
        })
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn target_accessor(&self) -> &dyn SingleBindingSourceAccessor {
        self.target.as_ref()
    }

    pub fn source_accessor(&self) -> &dyn BindingSourceAccessor {
        self.source.as_ref()
    }

    pub fn services(&self) -> &BindingServices {
        &self.services
    }

    /// The attached behaviors.
    pub fn behaviors(&self) -> Behaviors<'_> {
        Behaviors::new(self)
    }

    pub(crate) fn behavior_set(&self) -> &BehaviorSet {
        &self.behaviors
    }

    pub(crate) fn hooks(&self) -> &dyn BindingHooks {
        self.hooks.as_ref()
    }

    pub fn downgrade(&self) -> Weak<DataBinding> {
        self.this.clone()
    }

    /// Debug tag of the target path, if the path is debuggable.
    pub fn debug_tag(&self) -> Option<&str> {
        self.target.source().path().debug_tag()
    }

    pub fn is_disposed(&self) -> bool {
        matches!(&*self.context.load(), Some(store) if DataContextMap::is_empty_sentinel(store))
    }

    /// Register a listener for update events.
    pub fn subscribe(
        &self,
        listener: impl Fn(&DataBinding, &BindingEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(Arc::new(listener))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Push the target's value into the source.
    ///
    /// Returns `false` when the source rejected the value, an accessor faulted,
    /// or an update-source is already running on this binding.
    pub fn update_source(&self) -> bool {
        self.run_update(BindingAction::UpdateSource)
    }

    /// Push the source's value into the target.
    pub fn update_target(&self) -> bool {
        self.run_update(BindingAction::UpdateTarget)
    }

    fn run_update(&self, action: BindingAction) -> bool {
        let flag = match action {
            BindingAction::UpdateSource => &self.is_source_updating,
            BindingAction::UpdateTarget => &self.is_target_updating,
        };
        let Some(_guard) = UpdateGuard::enter(flag) else {
            return false;
        };

        let (begin, end) = match action {
            BindingAction::UpdateSource => ("Binding update source", "Binding end update source"),
            BindingAction::UpdateTarget => ("Binding update target", "Binding end update target"),
        };
        self.trace(begin);

        let result = match action {
            BindingAction::UpdateSource => {
                self.source
                    .set_value(self.target.as_source_accessor(), self, true)
            }
            BindingAction::UpdateTarget => self.target.set_value(self.source.as_ref(), self, true),
        };
        let updated = match result {
            Ok(true) => {
                self.listeners.notify(self, &BindingEvent::succeeded(action));
                true
            }
            Ok(false) => {
                self.listeners.notify(self, &BindingEvent::failed(action));
                false
            }
            Err(fault) => {
                self.raise_fault(action, fault);
                false
            }
        };

        self.trace(end);
        updated
    }

    /// Validate the target's source, then every source of the source
    /// accessor.
    ///
    /// Every source is validated even after one has failed.
    pub fn validate(&self) -> bool {
        let mut action = BindingAction::UpdateTarget;
        match self.validate_endpoints(&mut action) {
            Ok(valid) => valid,
            Err(fault) => {
                self.raise_fault(action, fault);
                false
            }
        }
    }

    fn validate_endpoints(&self, action: &mut BindingAction) -> Result<bool, AccessorError> {
        let mut valid = self.target.source().validate(true)?;
        *action = BindingAction::UpdateSource;
        for source in self.source.sources() {
            valid &= source.validate(true)?;
        }
        Ok(valid)
    }

    /// Tear the binding down. Only the first call has any effect.
    pub fn dispose(&self) {
        let previous = self.context.swap(Some(DataContextMap::empty()));
        if previous
            .as_ref()
            .is_some_and(DataContextMap::is_empty_sentinel)
        {
            return;
        }

        self.hooks.on_dispose(self);
        self.services.registry().unregister(self);
        self.listeners.clear();
        self.behaviors().clear();
        self.source.dispose();
        self.target.dispose();
        self.trace("Binding disposed");
    }

    fn raise_fault(&self, action: BindingAction, fault: AccessorError) {
        let error = wrap_binding_exception(self, action, fault.clone());
        let event = BindingEvent::faulted(action, error, fault);
        let observed = self.listeners.notify(self, &event);

        let route = match self.services.config().exception_routing {
            ExceptionRouting::Always => true,
            ExceptionRouting::Unobserved => !observed,
        };
        if !route {
            return;
        }
        match self.services.exception_sink() {
            Some(sink) => sink.on_exception(self, &event),
            None => tracing::warn!(
                binding = %self.id,
                %action,
                error = ?event.error(),
                "unobserved binding fault"
            ),
        }
    }

    fn trace(&self, message: &str) {
        let path = self.target.source().path();
        let tag = match path.debug_tag() {
            Some(tag) => tag,
            None if self.services.config().debug => path.path(),
            None => return,
        };
        self.services.debug_sink().debug(self, tag, message);
    }

    // Context plumbing

    fn store(&self) -> Option<Arc<DataContextMap>> {
        self.context.load_full()
    }

    /// The context store, materializing it on first use.
    fn store_or_init(&self) -> Arc<DataContextMap> {
        if let Some(store) = self.store() {
            return store;
        }
        let fresh = Arc::new(DataContextMap::from_entries([self.binding_entry()]));
        let previous = self
            .context
            .compare_and_swap(&None::<Arc<DataContextMap>>, Some(Arc::clone(&fresh)));
        match &*previous {
            Some(existing) => Arc::clone(existing),
            None => fresh,
        }
    }

    fn binding_entry(&self) -> ContextEntry {
        BINDING.to_entry(self.downgrade())
    }
}

/// The binding's own context.
///
/// Until the first mutation no store exists and reads see a single synthetic
/// entry, [`BINDING`]. After disposal every mutation is ignored.
impl DataContext for DataBinding {
    fn len(&self) -> usize {
        match self.store() {
            Some(store) => store.len(),
            None => 1,
        }
    }

    fn is_read_only(&self) -> bool {
        self.store().is_some_and(|store| store.is_read_only())
    }

    fn add_value(&self, key: &DataKey, value: ContextValue) -> Result<(), ContextError> {
        self.store_or_init().add_value(key, value)
    }

    fn add_or_update_value(&self, key: &DataKey, value: ContextValue) {
        self.store_or_init().add_or_update_value(key, value)
    }

    fn value(&self, key: &DataKey) -> Option<ContextValue> {
        match self.store() {
            Some(store) => store.value(key),
            None if key == BINDING.key() => {
                let (_, value) = self.binding_entry().into_parts();
                Some(value)
            }
            None => None,
        }
    }

    fn contains(&self, key: &DataKey) -> bool {
        match self.store() {
            Some(store) => store.contains(key),
            None => key == BINDING.key(),
        }
    }

    fn remove(&self, key: &DataKey) -> bool {
        self.store().is_some_and(|store| store.remove(key))
    }

    /// Copies every entry of `other` except its [`BINDING`], so merging
    /// another binding's context keeps this binding as the owner.
    fn merge(&self, other: &dyn DataContext) {
        let incoming = DataContextMap::from_entries(
            other
                .to_list()
                .into_iter()
                .filter(|entry| entry.key() != BINDING.key()),
        );
        self.store_or_init().merge(&incoming)
    }

    fn clear(&self) {
        if let Some(store) = self.store() {
            store.clear();
        }
    }

    fn to_list(&self) -> Vec<ContextEntry> {
        match self.store() {
            Some(store) if !DataContextMap::is_empty_sentinel(&store) => store.to_list(),
            _ => vec![self.binding_entry()],
        }
    }
}

impl fmt::Debug for DataBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBinding")
            .field("id", &self.id)
            .field("target", &self.target.source().path().path())
            .field(
                "sources",
                &self
                    .source
                    .sources()
                    .iter()
                    .map(|s| s.path().path())
                    .collect::<Vec<_>>(),
            )
            .field("behaviors", &self.behaviors.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
