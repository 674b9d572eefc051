//! Pluggable behaviors and the per-binding behavior collection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::duplicate_behavior;
use crate::{BehaviorId, BindingError, DataBinding};

/// A unit of behavior attached to a binding.
///
/// Behaviors that need to reach their binding later keep a
/// [`Weak`](std::sync::Weak) reference from [`DataBinding::downgrade`]; the
/// binding owns its behaviors, never the other way round.
///
/// # Object Safety
///
/// This trait is object-safe: bindings hold `Arc<dyn BindingBehavior>`.
pub trait BindingBehavior: Send + Sync {
    /// Identity of the behavior kind. At most one behavior per id is attached.
    fn id(&self) -> BehaviorId;

    /// Human-readable name, used in error messages.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Attach to `binding`. Returning `false` refuses the attachment and the
    /// behavior is not kept.
    fn attach(&self, binding: &DataBinding) -> bool;

    /// Detach from `binding`. Called after the binding has already dropped the
    /// behavior from its collection.
    fn detach(&self, binding: &DataBinding);
}

/// Data-pointer identity, ignoring vtables.
fn same_behavior<B: BindingBehavior + ?Sized>(a: &Arc<dyn BindingBehavior>, b: &Arc<B>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// The attached behaviors of one binding, in attachment order.
#[derive(Default)]
pub(crate) struct BehaviorSet {
    items: Mutex<Vec<Arc<dyn BindingBehavior>>>,
}

impl BehaviorSet {
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn BindingBehavior>>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn find(&self, id: BehaviorId) -> Option<Arc<dyn BindingBehavior>> {
        self.lock().iter().find(|b| b.id() == id).cloned()
    }

    /// Append `behavior`, or hand back the behavior already holding its id.
    fn push(&self, behavior: Arc<dyn BindingBehavior>) -> Result<(), Arc<dyn BindingBehavior>> {
        let mut items = self.lock();
        let id = behavior.id();
        if let Some(existing) = items.iter().find(|b| b.id() == id) {
            return Err(Arc::clone(existing));
        }
        items.push(behavior);
        Ok(())
    }

    fn take<B: BindingBehavior + ?Sized>(
        &self,
        behavior: &Arc<B>,
    ) -> Option<Arc<dyn BindingBehavior>> {
        let mut items = self.lock();
        let index = items.iter().position(|b| same_behavior(b, behavior))?;
        Some(items.remove(index))
    }

    fn take_all(&self) -> Vec<Arc<dyn BindingBehavior>> {
        std::mem::take(&mut *self.lock())
    }

    fn snapshot(&self) -> Vec<Arc<dyn BindingBehavior>> {
        self.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

/// The behavior collection of a binding, from [`DataBinding::behaviors`].
///
/// The collection lock is never held while calling into a behavior, so
/// `attach` and `detach` may freely inspect or modify the collection.
pub struct Behaviors<'a> {
    binding: &'a DataBinding,
}

impl<'a> Behaviors<'a> {
    pub(crate) fn new(binding: &'a DataBinding) -> Self {
        Self { binding }
    }

    fn set(&self) -> &'a BehaviorSet {
        self.binding.behavior_set()
    }

    /// Attach `behavior` and keep it if it accepts.
    ///
    /// Does nothing on a disposed binding.
    ///
    /// # Errors
    ///
    /// `BindingError::DuplicateBehavior` if a behavior with the same id is
    /// already attached. The collection is left unchanged.
    pub fn add(&self, behavior: Arc<dyn BindingBehavior>) -> Result<(), BindingError> {
        let binding = self.binding;
        if binding.is_disposed() {
            return Ok(());
        }
        if let Some(existing) = self.set().find(behavior.id()) {
            return Err(duplicate_behavior(existing.as_ref(), behavior.as_ref()));
        }
        if !behavior.attach(binding) {
            tracing::trace!(
                binding = %binding.id(),
                behavior = behavior.name(),
                "behavior refused attachment"
            );
            return Ok(());
        }
        // attach() may have added a behavior with the same id meanwhile.
        if let Err(existing) = self.set().push(Arc::clone(&behavior)) {
            behavior.detach(binding);
            return Err(duplicate_behavior(existing.as_ref(), behavior.as_ref()));
        }
        if binding.is_disposed() {
            // Lost a race with dispose(); its clear() may have missed us.
            if self.set().take(&behavior).is_some() {
                behavior.detach(binding);
            }
            return Ok(());
        }
        binding.hooks().on_behavior_added(binding, behavior.as_ref());
        Ok(())
    }

    /// Detach and remove `behavior`, returning whether it was attached.
    pub fn remove<B: BindingBehavior + ?Sized>(&self, behavior: &Arc<B>) -> bool {
        match self.set().take(behavior) {
            Some(removed) => {
                self.detach(removed.as_ref());
                true
            }
            None => false,
        }
    }

    /// Detach every behavior, in attachment order.
    pub fn clear(&self) {
        for behavior in self.set().take_all() {
            self.detach(behavior.as_ref());
        }
    }

    fn detach(&self, behavior: &dyn BindingBehavior) {
        behavior.detach(self.binding);
        self.binding.hooks().on_behavior_removed(self.binding, behavior);
    }

    /// Whether this exact behavior instance is attached.
    pub fn contains<B: BindingBehavior + ?Sized>(&self, behavior: &Arc<B>) -> bool {
        self.set().lock().iter().any(|b| same_behavior(b, behavior))
    }

    /// Whether a behavior with this id is attached.
    pub fn contains_id(&self, id: BehaviorId) -> bool {
        self.set().find(id).is_some()
    }

    pub fn get(&self, id: BehaviorId) -> Option<Arc<dyn BindingBehavior>> {
        self.set().find(id)
    }

    pub fn len(&self) -> usize {
        self.set().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the attached behaviors, in attachment order.
    pub fn to_vec(&self) -> Vec<Arc<dyn BindingBehavior>> {
        self.set().snapshot()
    }

    /// Iterate a snapshot of the attached behaviors, in attachment order.
    pub fn iter(&self) -> std::vec::IntoIter<Arc<dyn BindingBehavior>> {
        self.to_vec().into_iter()
    }
}

impl std::fmt::Debug for Behaviors<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.set().snapshot().iter().map(|b| b.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_doubles::{BehaviorLog, TestAccessor, TestBehavior};
    use crate::BindingServices;

    fn binding() -> Arc<DataBinding> {
        DataBinding::new(
            TestAccessor::new("Text"),
            TestAccessor::new("Name"),
            BindingServices::default(),
        )
    }

    #[test]
    fn add_attaches_and_keeps() {
        let binding = binding();
        let behavior = Arc::new(TestBehavior::new(BehaviorId::from_u128(1)));

        binding.behaviors().add(behavior.clone()).unwrap();
        assert_eq!(behavior.attach_count(), 1);
        assert!(binding.behaviors().contains(&behavior));
        assert!(binding.behaviors().contains_id(BehaviorId::from_u128(1)));
        assert_eq!(binding.behaviors().len(), 1);
    }

    #[test]
    fn refused_attach_is_not_kept() {
        let binding = binding();
        let behavior = Arc::new(TestBehavior::new(BehaviorId::from_u128(1)).refusing());

        binding.behaviors().add(behavior.clone()).unwrap();
        assert_eq!(behavior.attach_count(), 1);
        assert_eq!(behavior.detach_count(), 0);
        assert!(binding.behaviors().is_empty());
    }

    #[test]
    fn duplicate_id_is_rejected_and_set_unchanged() {
        let binding = binding();
        let first = Arc::new(TestBehavior::new(BehaviorId::from_u128(7)));
        let second = Arc::new(TestBehavior::new(BehaviorId::from_u128(7)));

        binding.behaviors().add(first.clone()).unwrap();
        let err = binding.behaviors().add(second.clone()).unwrap_err();

        assert!(matches!(
            err,
            BindingError::DuplicateBehavior { id, .. } if id == BehaviorId::from_u128(7)
        ));
        assert_eq!(second.attach_count(), 0);
        assert_eq!(binding.behaviors().len(), 1);
        assert!(binding.behaviors().contains(&first));
        assert!(!binding.behaviors().contains(&second));
    }

    #[test]
    fn remove_detaches_and_reports_presence() {
        let binding = binding();
        let behavior = Arc::new(TestBehavior::new(BehaviorId::from_u128(1)));
        binding.behaviors().add(behavior.clone()).unwrap();

        assert!(binding.behaviors().remove(&behavior));
        assert_eq!(behavior.detach_count(), 1);
        assert!(!binding.behaviors().remove(&behavior));
        assert_eq!(behavior.detach_count(), 1);
        assert!(binding.behaviors().is_empty());
    }

    #[test]
    fn clear_detaches_in_attachment_order() {
        let binding = binding();
        let log = BehaviorLog::default();
        for n in 1..=3 {
            let behavior = TestBehavior::new(BehaviorId::from_u128(n)).with_log(&log);
            binding.behaviors().add(Arc::new(behavior)).unwrap();
        }

        binding.behaviors().clear();
        assert!(binding.behaviors().is_empty());
        assert_eq!(
            log.detached(),
            vec![
                BehaviorId::from_u128(1),
                BehaviorId::from_u128(2),
                BehaviorId::from_u128(3)
            ]
        );
    }

    #[test]
    fn iteration_follows_attachment_order() {
        let binding = binding();
        for n in [3u128, 1, 2] {
            binding
                .behaviors()
                .add(Arc::new(TestBehavior::new(BehaviorId::from_u128(n))))
                .unwrap();
        }
        let ids: Vec<BehaviorId> = binding.behaviors().iter().map(|b| b.id()).collect();
        assert_eq!(
            ids,
            vec![
                BehaviorId::from_u128(3),
                BehaviorId::from_u128(1),
                BehaviorId::from_u128(2)
            ]
        );
    }

    #[test]
    fn add_after_dispose_is_a_no_op() {
        let binding = binding();
        binding.dispose();

        let behavior = Arc::new(TestBehavior::new(BehaviorId::from_u128(1)));
        binding.behaviors().add(behavior.clone()).unwrap();
        assert_eq!(behavior.attach_count(), 0);
        assert!(binding.behaviors().is_empty());
    }

    #[test]
    fn behavior_can_reach_binding_through_weak_reference() {
        let binding = binding();
        let behavior = Arc::new(TestBehavior::new(BehaviorId::from_u128(1)));
        binding.behaviors().add(behavior.clone()).unwrap();

        let attached = behavior.binding().and_then(|weak| weak.upgrade()).unwrap();
        assert_eq!(attached.id(), binding.id());
    }

    #[test]
    fn get_returns_attached_behavior() {
        let binding = binding();
        let behavior = Arc::new(TestBehavior::new(BehaviorId::from_u128(5)));
        binding.behaviors().add(behavior.clone()).unwrap();

        let found = binding.behaviors().get(BehaviorId::from_u128(5)).unwrap();
        assert!(same_behavior(&found, &behavior));
        assert!(binding.behaviors().get(BehaviorId::from_u128(6)).is_none());
    }
}
