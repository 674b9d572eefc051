//! Tether: bidirectional data binding.
//!
//! Tether keeps a target endpoint and a source endpoint in sync. The stack is
//! layered:
//!
//! - **context** ([`tether_context`]): the typed context store every binding
//!   carries as side-channel metadata
//! - **binding** ([`tether_binding`]): accessor contracts, behaviors, the
//!   binding core and the process-wide services it reports to
//!
//! This crate re-exports both layers. Depend on it unless you only need one.
//!
//! ```rust
//! use tether::{BindingConfig, BindingServices, DataConstant, DataContextMap, TypedContext};
//!
//! static THEME: DataConstant<String> = DataConstant::new("app.theme");
//!
//! let context = DataContextMap::new();
//! context.add_or_update(&THEME, "dark".to_string());
//! assert_eq!(context.get(&THEME), "dark");
//!
//! let services = BindingServices::new().with_config(BindingConfig::from_json("{}").unwrap());
//! assert!(!services.config().debug);
//! ```

pub use tether_binding::*;
pub use tether_context::*;

/// The typed context store.
pub mod context {
    pub use tether_context::*;
}

/// The binding core.
pub mod binding {
    pub use tether_binding::*;
}
