//! Identifiers for bindings and behaviors.

use uuid::Uuid;

/// Unique identifier for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(Uuid);

impl BindingId {
    /// Create a new random BindingId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a behavior kind.
///
/// Two behaviors with the same id cannot be attached to the same binding.
/// Behavior types usually declare their id as a constant:
///
/// ```rust
/// use tether_binding::BehaviorId;
///
/// const ONE_TIME: BehaviorId = BehaviorId::from_u128(0x5c8e_2f1a_0b7d_4c3e_9a61_d2f4_7e08_b915);
/// assert_eq!(ONE_TIME, BehaviorId::from_u128(0x5c8e_2f1a_0b7d_4c3e_9a61_d2f4_7e08_b915));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BehaviorId(Uuid);

impl BehaviorId {
    /// Create a new random BehaviorId, for behaviors that allow one instance
    /// per binding without sharing a kind.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BehaviorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BehaviorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
