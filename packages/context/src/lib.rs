//! Tether Context: Typed Context Store
//!
//! This is the leaf of the Tether stack. A context is an open-ended mapping
//! from typed keys to values of the key's type. Bindings carry one as
//! side-channel metadata, and any layer above can define its own keys without
//! the store knowing about them.
//!
//! The store is split the same way the read/write layers are:
//! - [`DataContext`]: the object-safe contract over type-erased values
//! - [`TypedContext`]: an extension trait, implemented for every `DataContext`,
//!   that adds typed `add` / `add_or_update` / `get` / `try_get`
//! - [`DataContextMap`]: the standalone thread-safe implementation, plus a
//!   shared read-only empty sentinel
//!
//! # Example
//!
//! ```rust
//! use tether_context::{DataConstant, DataContext, DataContextMap, TypedContext};
//!
//! static RETRIES: DataConstant<u32> = DataConstant::new("example.retries");
//!
//! let context = DataContextMap::new();
//! context.add_or_update(&RETRIES, 3);
//! assert_eq!(context.get(&RETRIES), 3);
//! assert!(context.contains(&RETRIES));
//! ```

mod error;
mod key;
mod map;
mod traits;

pub use error::ContextError;
pub use key::{DataConstant, DataKey};
pub use map::DataContextMap;
pub use traits::{ContextEntry, ContextValue, DataContext, TypedContext};
