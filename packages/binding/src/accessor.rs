//! Endpoint contracts: sources and accessors.
//!
//! Accessors are supplied by the platform layer; the binding only orchestrates
//! them. A source accessor may aggregate several upstream [`BindingSource`]s
//! (a multi-binding expression); a target accessor always has exactly one.

use std::sync::Arc;

use crate::{AccessorError, BindingPath, BindingValue, DataBinding};

/// One observed endpoint: a member path on some object.
pub trait BindingSource: Send + Sync {
    /// The member path this source observes.
    fn path(&self) -> &BindingPath;

    /// Validate the endpoint's current state.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The endpoint is usable.
    /// * `Ok(false)` - The endpoint is not usable (e.g. the member is missing)
    ///   and `throw_on_error` was `false`.
    /// * `Err(AccessorError)` - The endpoint is not usable and `throw_on_error`
    ///   was `true`, or validation itself faulted.
    fn validate(&self, throw_on_error: bool) -> Result<bool, AccessorError>;
}

/// Reads and writes the value of a binding endpoint.
///
/// # Object Safety
///
/// This trait is object-safe: bindings hold `Box<dyn BindingSourceAccessor>`.
pub trait BindingSourceAccessor: Send + Sync {
    /// The upstream sources, in declaration order. Never empty.
    fn sources(&self) -> &[Arc<dyn BindingSource>];

    /// Read this endpoint's current value.
    fn get_value(
        &self,
        binding: &DataBinding,
        throw_on_error: bool,
    ) -> Result<BindingValue, AccessorError>;

    /// Pull the value from `other` and store it in this endpoint.
    ///
    /// `binding` is the calling binding; it is also the binding's
    /// [`DataContext`](tether_context::DataContext).
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The value was stored.
    /// * `Ok(false)` - The value was rejected (validation, conversion).
    /// * `Err(AccessorError)` - A fault occurred.
    fn set_value(
        &self,
        other: &dyn BindingSourceAccessor,
        binding: &DataBinding,
        throw_on_error: bool,
    ) -> Result<bool, AccessorError>;

    /// Release subscriptions held by the accessor. Called once, on binding
    /// disposal.
    fn dispose(&self) {}
}

/// View any accessor as a plain `&dyn BindingSourceAccessor`.
///
/// Implemented for every sized accessor, so `dyn SingleBindingSourceAccessor`
/// can be handed to APIs that take the general accessor.
pub trait AsSourceAccessor {
    fn as_source_accessor(&self) -> &dyn BindingSourceAccessor;
}

impl<T: BindingSourceAccessor> AsSourceAccessor for T {
    fn as_source_accessor(&self) -> &dyn BindingSourceAccessor {
        self
    }
}

/// An accessor with exactly one upstream source. Target accessors are always
/// single-source.
pub trait SingleBindingSourceAccessor: BindingSourceAccessor + AsSourceAccessor {
    fn source(&self) -> &Arc<dyn BindingSource>;
}

// Blanket implementations for shared handles

impl<T: BindingSourceAccessor + ?Sized> BindingSourceAccessor for Arc<T> {
    fn sources(&self) -> &[Arc<dyn BindingSource>] {
        self.as_ref().sources()
    }

    fn get_value(
        &self,
        binding: &DataBinding,
        throw_on_error: bool,
    ) -> Result<BindingValue, AccessorError> {
        self.as_ref().get_value(binding, throw_on_error)
    }

    fn set_value(
        &self,
        other: &dyn BindingSourceAccessor,
        binding: &DataBinding,
        throw_on_error: bool,
    ) -> Result<bool, AccessorError> {
        self.as_ref().set_value(other, binding, throw_on_error)
    }

    fn dispose(&self) {
        self.as_ref().dispose()
    }
}

impl<T: SingleBindingSourceAccessor + ?Sized> SingleBindingSourceAccessor for Arc<T> {
    fn source(&self) -> &Arc<dyn BindingSource> {
        self.as_ref().source()
    }
}

impl<T: BindingSource + ?Sized> BindingSource for Arc<T> {
    fn path(&self) -> &BindingPath {
        self.as_ref().path()
    }

    fn validate(&self, throw_on_error: bool) -> Result<bool, AccessorError> {
        self.as_ref().validate(throw_on_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_doubles::{TestAccessor, TestSource};

    #[test]
    fn single_accessor_exposes_its_source_in_sources() {
        let accessor = TestAccessor::new("Text");
        assert_eq!(accessor.sources().len(), 1);
        assert_eq!(accessor.source().path().path(), "Text");
        assert!(Arc::ptr_eq(&accessor.sources()[0], accessor.source()));
    }

    #[test]
    fn arc_blanket_impl_forwards() {
        let accessor = Arc::new(TestAccessor::new("Text"));
        let as_dyn: &dyn SingleBindingSourceAccessor = &accessor;
        assert_eq!(as_dyn.source().path().path(), "Text");
        assert_eq!(as_dyn.as_source_accessor().sources().len(), 1);

        as_dyn.dispose();
        assert!(accessor.is_disposed());
    }

    #[test]
    fn source_validate_forwards_through_arc() {
        let source = Arc::new(TestSource::new("Name"));
        source.set_valid(false);
        let shared: Arc<dyn BindingSource> = source.clone();
        assert!(!shared.validate(true).unwrap());
        assert_eq!(source.validate_calls(), 1);
    }
}
