//! Core traits: DataContext, TypedContext.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{ContextError, DataConstant, DataKey};

/// A shared, type-erased context value.
pub type ContextValue = Arc<dyn Any + Send + Sync>;

/// A (key, value) pair taken from a context snapshot.
#[derive(Clone)]
pub struct ContextEntry {
    key: DataKey,
    value: ContextValue,
}

impl ContextEntry {
    pub fn new(key: DataKey, value: ContextValue) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &DataKey {
        &self.key
    }

    pub fn value(&self) -> &ContextValue {
        &self.value
    }

    /// Borrow the value as `T`, if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).downcast_ref::<T>()
    }

    pub fn into_parts(self) -> (DataKey, ContextValue) {
        (self.key, self.value)
    }
}

impl fmt::Debug for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextEntry")
            .field("key", &self.key.id())
            .finish_non_exhaustive()
    }
}

/// A heterogeneous key/value store.
///
/// All operations take `&self`: implementations are shared between a binding,
/// its behaviors and its accessors, so they synchronize internally.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `&dyn DataContext`. The typed
/// operations live on [`TypedContext`], which every `DataContext` gets for free.
pub trait DataContext: Send + Sync {
    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether mutations are ignored.
    fn is_read_only(&self) -> bool {
        false
    }

    /// Insert a value.
    ///
    /// # Returns
    ///
    /// * `Err(ContextError::DuplicateKey)` - The key is already present.
    fn add_value(&self, key: &DataKey, value: ContextValue) -> Result<(), ContextError>;

    /// Insert a value, overwriting any existing entry for the key.
    fn add_or_update_value(&self, key: &DataKey, value: ContextValue);

    /// Look up a value. `None` when the key is absent.
    fn value(&self, key: &DataKey) -> Option<ContextValue>;

    fn contains(&self, key: &DataKey) -> bool;

    /// Remove an entry, returning whether it was present.
    fn remove(&self, key: &DataKey) -> bool;

    /// Copy every entry of `other` into this context, overwriting on conflict.
    fn merge(&self, other: &dyn DataContext) {
        for entry in other.to_list() {
            let (key, value) = entry.into_parts();
            self.add_or_update_value(&key, value);
        }
    }

    /// Remove every entry.
    fn clear(&self);

    /// Snapshot of all entries.
    fn to_list(&self) -> Vec<ContextEntry>;
}

/// Extension trait for typed access.
///
/// This trait is automatically implemented for all `DataContext`
/// implementations. A value stored under a key's id with a different type than
/// the key declares is reported as absent.
///
/// # Example
///
/// ```rust
/// use tether_context::{DataConstant, DataContextMap, TypedContext};
///
/// static LABEL: DataConstant<String> = DataConstant::new("example.label");
///
/// let context = DataContextMap::new();
/// assert_eq!(context.try_get(&LABEL), None);
/// assert_eq!(context.get(&LABEL), String::new());
///
/// context.add(&LABEL, "name".to_string()).unwrap();
/// assert_eq!(context.try_get(&LABEL).as_deref(), Some("name"));
/// assert!(context.add(&LABEL, "other".to_string()).is_err());
/// ```
pub trait TypedContext: DataContext {
    fn add<T: Any + Send + Sync>(
        &self,
        key: &DataConstant<T>,
        value: T,
    ) -> Result<(), ContextError> {
        self.add_value(key.key(), Arc::new(value))
    }

    fn add_or_update<T: Any + Send + Sync>(&self, key: &DataConstant<T>, value: T) {
        self.add_or_update_value(key.key(), Arc::new(value))
    }

    /// The stored value, or `None` if absent.
    fn try_get<T: Any + Send + Sync + Clone>(&self, key: &DataConstant<T>) -> Option<T> {
        let value = self.value(key.key())?;
        (*value).downcast_ref::<T>().cloned()
    }

    /// The stored value, or `T::default()` if absent.
    fn get<T: Any + Send + Sync + Clone + Default>(&self, key: &DataConstant<T>) -> T {
        self.try_get(key).unwrap_or_default()
    }
}

// Blanket implementation for all DataContexts
impl<C: DataContext + ?Sized> TypedContext for C {}

// Blanket implementations for references and smart pointers

impl<C: DataContext + ?Sized> DataContext for &C {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_read_only(&self) -> bool {
        (**self).is_read_only()
    }

    fn add_value(&self, key: &DataKey, value: ContextValue) -> Result<(), ContextError> {
        (**self).add_value(key, value)
    }

    fn add_or_update_value(&self, key: &DataKey, value: ContextValue) {
        (**self).add_or_update_value(key, value)
    }

    fn value(&self, key: &DataKey) -> Option<ContextValue> {
        (**self).value(key)
    }

    fn contains(&self, key: &DataKey) -> bool {
        (**self).contains(key)
    }

    fn remove(&self, key: &DataKey) -> bool {
        (**self).remove(key)
    }

    fn merge(&self, other: &dyn DataContext) {
        (**self).merge(other)
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn to_list(&self) -> Vec<ContextEntry> {
        (**self).to_list()
    }
}

impl<C: DataContext + ?Sized> DataContext for Arc<C> {
    fn len(&self) -> usize {
        self.as_ref().len()
    }

    fn is_read_only(&self) -> bool {
        self.as_ref().is_read_only()
    }

    fn add_value(&self, key: &DataKey, value: ContextValue) -> Result<(), ContextError> {
        self.as_ref().add_value(key, value)
    }

    fn add_or_update_value(&self, key: &DataKey, value: ContextValue) {
        self.as_ref().add_or_update_value(key, value)
    }

    fn value(&self, key: &DataKey) -> Option<ContextValue> {
        self.as_ref().value(key)
    }

    fn contains(&self, key: &DataKey) -> bool {
        self.as_ref().contains(key)
    }

    fn remove(&self, key: &DataKey) -> bool {
        self.as_ref().remove(key)
    }

    fn merge(&self, other: &dyn DataContext) {
        self.as_ref().merge(other)
    }

    fn clear(&self) {
        self.as_ref().clear()
    }

    fn to_list(&self) -> Vec<ContextEntry> {
        self.as_ref().to_list()
    }
}
