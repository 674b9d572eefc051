//! Error types for the context layer.

use crate::DataKey;

/// Errors raised by context mutations.
///
/// Reads never fail: an absent key is reported as `None` (or the type's
/// default through [`TypedContext::get`](crate::TypedContext::get)).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// `add` was called with a key that is already present.
    #[error("duplicate context key: {key}")]
    DuplicateKey { key: DataKey },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_display_names_the_key() {
        let e = ContextError::DuplicateKey {
            key: DataKey::new("binding.debug_tag"),
        };
        assert_eq!(format!("{}", e), "duplicate context key: binding.debug_tag");
    }
}
