//! Hand-written test doubles for accessors, behaviors, sinks and hooks.
//!
//! Enabled for this crate's own tests and, through the `test-utils` feature,
//! for downstream crates:
//!
//! ```toml
//! [dev-dependencies]
//! tether-binding = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::{
    AccessorError, BehaviorId, BindingBehavior, BindingEvent, BindingHooks, BindingPath,
    BindingSource, BindingSourceAccessor, BindingValue, DataBinding, DebugSink, ExceptionSink,
    ListenerId, SingleBindingSourceAccessor,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A source whose validity is set by the test.
///
/// An invalid source reports `Ok(false)`; a failing one faults.
pub struct TestSource {
    path: BindingPath,
    valid: AtomicBool,
    fault: Mutex<Option<String>>,
    validate_calls: AtomicUsize,
}

impl TestSource {
    pub fn new(path: &str) -> Self {
        Self::with_path(BindingPath::new(path))
    }

    pub fn with_path(path: BindingPath) -> Self {
        Self {
            path,
            valid: AtomicBool::new(true),
            fault: Mutex::new(None),
            validate_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::SeqCst);
    }

    /// Fault every following validation with `message`.
    pub fn fail_with(&self, message: &str) {
        *lock(&self.fault) = Some(message.to_string());
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }
}

impl BindingSource for TestSource {
    fn path(&self) -> &BindingPath {
        &self.path
    }

    fn validate(&self, _throw_on_error: bool) -> Result<bool, AccessorError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = lock(&self.fault).clone() {
            return Err(AccessorError::msg(message));
        }
        Ok(self.valid.load(Ordering::SeqCst))
    }
}

/// What [`TestAccessor::set_value`](BindingSourceAccessor::set_value) does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetMode {
    /// Read the other endpoint and store its value.
    Copy,
    /// Return `Ok(false)`.
    Reject,
    /// Fault with the message. Reads from this accessor fault too.
    Fail(String),
}

type SetHook = Arc<dyn Fn(&DataBinding) + Send + Sync>;

/// An accessor holding its value in memory.
pub struct TestAccessor {
    handles: Vec<Arc<TestSource>>,
    sources: Vec<Arc<dyn BindingSource>>,
    value: Mutex<BindingValue>,
    mode: Mutex<SetMode>,
    on_set: Mutex<Option<SetHook>>,
    set_calls: AtomicUsize,
    dispose_calls: AtomicUsize,
}

impl TestAccessor {
    pub fn new(path: &str) -> Self {
        Self::with_path(BindingPath::new(path))
    }

    pub fn with_path(path: BindingPath) -> Self {
        Self::from_sources(vec![Arc::new(TestSource::with_path(path))])
    }

    /// An accessor aggregating one source per path.
    pub fn multi(paths: &[&str]) -> Self {
        Self::from_sources(paths.iter().map(|p| Arc::new(TestSource::new(p))).collect())
    }

    fn from_sources(handles: Vec<Arc<TestSource>>) -> Self {
        let sources = handles
            .iter()
            .map(|h| Arc::clone(h) as Arc<dyn BindingSource>)
            .collect();
        Self {
            handles,
            sources,
            value: Mutex::new(BindingValue::Unset),
            mode: Mutex::new(SetMode::Copy),
            on_set: Mutex::new(None),
            set_calls: AtomicUsize::new(0),
            dispose_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_value(self, value: BindingValue) -> Self {
        *lock(&self.value) = value;
        self
    }

    pub fn rejecting(self) -> Self {
        self.set_mode(SetMode::Reject);
        self
    }

    pub fn failing(self, message: &str) -> Self {
        self.set_mode(SetMode::Fail(message.to_string()));
        self
    }

    pub fn set_mode(&self, mode: SetMode) {
        *lock(&self.mode) = mode;
    }

    /// Run `hook` at the start of every `set_value`, before the mode applies.
    pub fn on_set(&self, hook: impl Fn(&DataBinding) + Send + Sync + 'static) {
        *lock(&self.on_set) = Some(Arc::new(hook));
    }

    pub fn clear_on_set(&self) {
        *lock(&self.on_set) = None;
    }

    pub fn value(&self) -> BindingValue {
        lock(&self.value).clone()
    }

    pub fn store(&self, value: BindingValue) {
        *lock(&self.value) = value;
    }

    /// The `index`-th source, for adjusting validity.
    pub fn source_at(&self, index: usize) -> &Arc<TestSource> {
        &self.handles[index]
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn dispose_calls(&self) -> usize {
        self.dispose_calls.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.dispose_calls() > 0
    }
}

impl BindingSourceAccessor for TestAccessor {
    fn sources(&self) -> &[Arc<dyn BindingSource>] {
        &self.sources
    }

    fn get_value(
        &self,
        _binding: &DataBinding,
        _throw_on_error: bool,
    ) -> Result<BindingValue, AccessorError> {
        if let SetMode::Fail(message) = &*lock(&self.mode) {
            return Err(AccessorError::msg(message.clone()));
        }
        Ok(self.value())
    }

    fn set_value(
        &self,
        other: &dyn BindingSourceAccessor,
        binding: &DataBinding,
        throw_on_error: bool,
    ) -> Result<bool, AccessorError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        let hook = lock(&self.on_set).clone();
        if let Some(hook) = hook {
            hook(binding);
        }
        let mode = lock(&self.mode).clone();
        match mode {
            SetMode::Copy => {
                let value = other.get_value(binding, throw_on_error)?;
                self.store(value);
                Ok(true)
            }
            SetMode::Reject => Ok(false),
            SetMode::Fail(message) => Err(AccessorError::msg(message)),
        }
    }

    fn dispose(&self) {
        self.dispose_calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl SingleBindingSourceAccessor for TestAccessor {
    fn source(&self) -> &Arc<dyn BindingSource> {
        &self.sources[0]
    }
}

/// Shared record of attach/detach calls across several behaviors.
#[derive(Clone, Default)]
pub struct BehaviorLog {
    attached: Arc<Mutex<Vec<BehaviorId>>>,
    detached: Arc<Mutex<Vec<BehaviorId>>>,
}

impl BehaviorLog {
    pub fn attached(&self) -> Vec<BehaviorId> {
        lock(&self.attached).clone()
    }

    pub fn detached(&self) -> Vec<BehaviorId> {
        lock(&self.detached).clone()
    }
}

/// A behavior that counts its attach/detach calls.
pub struct TestBehavior {
    id: BehaviorId,
    accept: bool,
    log: Option<BehaviorLog>,
    binding: Mutex<Option<Weak<DataBinding>>>,
    attach_calls: AtomicUsize,
    detach_calls: AtomicUsize,
}

impl TestBehavior {
    pub fn new(id: BehaviorId) -> Self {
        Self {
            id,
            accept: true,
            log: None,
            binding: Mutex::new(None),
            attach_calls: AtomicUsize::new(0),
            detach_calls: AtomicUsize::new(0),
        }
    }

    /// Refuse every attachment.
    pub fn refusing(mut self) -> Self {
        self.accept = false;
        self
    }

    pub fn with_log(mut self, log: &BehaviorLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn attach_count(&self) -> usize {
        self.attach_calls.load(Ordering::SeqCst)
    }

    pub fn detach_count(&self) -> usize {
        self.detach_calls.load(Ordering::SeqCst)
    }

    /// The binding this behavior is attached to.
    pub fn binding(&self) -> Option<Weak<DataBinding>> {
        lock(&self.binding).clone()
    }
}

impl BindingBehavior for TestBehavior {
    fn id(&self) -> BehaviorId {
        self.id
    }

    fn attach(&self, binding: &DataBinding) -> bool {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        if !self.accept {
            return false;
        }
        if let Some(log) = &self.log {
            lock(&log.attached).push(self.id);
        }
        *lock(&self.binding) = Some(binding.downgrade());
        true
    }

    fn detach(&self, _binding: &DataBinding) {
        self.detach_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            lock(&log.detached).push(self.id);
        }
        *lock(&self.binding) = None;
    }
}

/// Collects the events a binding raises.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<BindingEvent>>>,
}

impl EventLog {
    /// Subscribe to `binding`, recording every event it raises.
    pub fn listen(&self, binding: &DataBinding) -> ListenerId {
        let events = Arc::clone(&self.events);
        binding.subscribe(move |_: &DataBinding, event: &BindingEvent| {
            lock(&events).push(event.clone());
        })
    }

    pub fn events(&self) -> Vec<BindingEvent> {
        lock(&self.events).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An exception sink that keeps what it receives.
#[derive(Default)]
pub struct RecordingExceptionSink {
    events: Mutex<Vec<BindingEvent>>,
}

impl RecordingExceptionSink {
    pub fn events(&self) -> Vec<BindingEvent> {
        lock(&self.events).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExceptionSink for RecordingExceptionSink {
    fn on_exception(&self, _binding: &DataBinding, event: &BindingEvent) {
        lock(&self.events).push(event.clone());
    }
}

/// A debug sink that keeps `(tag, message)` pairs.
#[derive(Default)]
pub struct RecordingDebugSink {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingDebugSink {
    pub fn messages(&self) -> Vec<(String, String)> {
        lock(&self.messages).clone()
    }
}

impl DebugSink for RecordingDebugSink {
    fn debug(&self, _binding: &DataBinding, tag: &str, message: &str) {
        lock(&self.messages).push((tag.to_string(), message.to_string()));
    }
}

/// Hooks that record each call as a short string.
#[derive(Clone, Default)]
pub struct RecordingHooks {
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingHooks {
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

impl BindingHooks for RecordingHooks {
    fn on_behavior_added(&self, _binding: &DataBinding, behavior: &dyn BindingBehavior) {
        lock(&self.calls).push(format!("added {}", behavior.id()));
    }

    fn on_behavior_removed(&self, _binding: &DataBinding, behavior: &dyn BindingBehavior) {
        lock(&self.calls).push(format!("removed {}", behavior.id()));
    }

    fn on_dispose(&self, _binding: &DataBinding) {
        lock(&self.calls).push("dispose".to_string());
    }
}
