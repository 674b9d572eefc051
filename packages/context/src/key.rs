//! Context keys: untyped identity plus the typed handle callers use.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use crate::traits::{ContextEntry, ContextValue};

/// The identity of a context entry.
///
/// Two keys are the same entry if and only if their ids are equal. The value
/// type is not part of the identity; see [`DataConstant`] for the typed view.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DataKey {
    id: Cow<'static, str>,
}

impl DataKey {
    /// Create a key from a static id. Usable in `static` and `const` items.
    pub const fn from_static(id: &'static str) -> Self {
        Self {
            id: Cow::Borrowed(id),
        }
    }

    /// Create a key from a runtime id.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self { id: id.into() }
    }

    /// The key's id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A context key that statically carries its value type.
///
/// Declare keys as statics next to the code that owns the data:
///
/// ```rust
/// use tether_context::DataConstant;
///
/// pub static DEBUG_TAG: DataConstant<String> = DataConstant::new("binding.debug_tag");
/// assert_eq!(DEBUG_TAG.id(), "binding.debug_tag");
/// ```
///
/// `DataConstant<T>` dereferences to its [`DataKey`], so it can be passed
/// anywhere an untyped key is expected (`contains`, `remove`).
pub struct DataConstant<T> {
    key: DataKey,
    _type: PhantomData<fn() -> T>,
}

impl<T> DataConstant<T> {
    /// Create a typed key from a static id.
    pub const fn new(id: &'static str) -> Self {
        Self {
            key: DataKey::from_static(id),
            _type: PhantomData,
        }
    }

    /// Create a typed key named `owner.name` at runtime.
    pub fn create(owner: &str, name: &str) -> Self {
        Self {
            key: DataKey::new(format!("{}.{}", owner, name)),
            _type: PhantomData,
        }
    }

    /// The untyped identity of this key.
    pub fn key(&self) -> &DataKey {
        &self.key
    }
}

impl<T: std::any::Any + Send + Sync> DataConstant<T> {
    /// Pair this key with a value.
    pub fn to_entry(&self, value: T) -> ContextEntry {
        let value: ContextValue = std::sync::Arc::new(value);
        ContextEntry::new(self.key.clone(), value)
    }
}

impl<T> Deref for DataConstant<T> {
    type Target = DataKey;

    fn deref(&self) -> &DataKey {
        &self.key
    }
}

impl<T> Clone for DataConstant<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> PartialEq for DataConstant<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for DataConstant<T> {}

impl<T> fmt::Debug for DataConstant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataConstant")
            .field("id", &self.key.id())
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for DataConstant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static NAME: DataConstant<String> = DataConstant::new("test.name");

    #[test]
    fn static_and_runtime_keys_compare_by_id() {
        let runtime: DataConstant<String> = DataConstant::create("test", "name");
        assert_eq!(runtime, NAME.clone());
        assert_eq!(runtime.key(), NAME.key());
    }

    #[test]
    fn identity_ignores_value_type() {
        let other: DataConstant<u64> = DataConstant::new("test.name");
        assert_eq!(other.key(), NAME.key());
    }

    #[test]
    fn deref_exposes_untyped_key() {
        let key: &DataKey = &NAME;
        assert_eq!(key.id(), "test.name");
        assert_eq!(format!("{}", NAME), "test.name");
    }

    #[test]
    fn debug_includes_type_name() {
        let debug = format!("{:?}", NAME);
        assert!(debug.contains("test.name"));
        assert!(debug.contains("String"));
    }

    #[test]
    fn to_entry_carries_key_and_value() {
        let entry = NAME.to_entry("alice".to_string());
        assert_eq!(entry.key(), NAME.key());
        assert_eq!(entry.downcast_ref::<String>().map(String::as_str), Some("alice"));
    }
}
