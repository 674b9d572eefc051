//! Values exchanged between accessors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tether_context::ContextValue;

/// A value read from or written to a binding endpoint.
///
/// `Unset` means "no value" and is distinct from any concrete value, including
/// `()` or `None`.
#[derive(Clone, Default)]
pub enum BindingValue {
    #[default]
    Unset,
    Value(ContextValue),
}

impl BindingValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        BindingValue::Value(Arc::new(value))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, BindingValue::Unset)
    }

    /// Borrow the value as `T`, if set and of that type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            BindingValue::Unset => None,
            BindingValue::Value(value) => (**value).downcast_ref::<T>(),
        }
    }

    /// Clone the value out as `T`, if set and of that type.
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn as_shared(&self) -> Option<&ContextValue> {
        match self {
            BindingValue::Unset => None,
            BindingValue::Value(value) => Some(value),
        }
    }
}

impl From<ContextValue> for BindingValue {
    fn from(value: ContextValue) -> Self {
        BindingValue::Value(value)
    }
}

impl fmt::Debug for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingValue::Unset => f.write_str("Unset"),
            BindingValue::Value(_) => f.write_str("Value(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unset() {
        let value = BindingValue::default();
        assert!(value.is_unset());
        assert_eq!(value.get::<i32>(), None);
        assert!(value.as_shared().is_none());
    }

    #[test]
    fn typed_access() {
        let value = BindingValue::new("hello".to_string());
        assert!(!value.is_unset());
        assert_eq!(value.get::<String>().as_deref(), Some("hello"));
        assert_eq!(value.downcast_ref::<i32>(), None);
    }

    #[test]
    fn clones_share_the_value() {
        let value = BindingValue::new(vec![1, 2, 3]);
        let copy = value.clone();
        let (Some(a), Some(b)) = (value.as_shared(), copy.as_shared()) else {
            panic!("expected set values");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", BindingValue::Unset), "Unset");
        assert_eq!(format!("{:?}", BindingValue::new(1u8)), "Value(..)");
    }
}
