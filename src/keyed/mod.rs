//! Collections whose elements are reachable through secondary key indexes.
//!
//! [`KeyedSequence`] is a positional list backed by a gap sequence;
//! [`KeyedCollection`] has no positions. Both keep every configured index in
//! step with their elements. Index 0 is the element used as its own key,
//! indexes 1.. extract keys with arbitrary functions.
//!
//! ```
//! use gapkey::{Error, KeyConfig, KeyedAccess, KeyedConfig, KeyedSequence};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct User {
//!     id: u32,
//!     name: &'static str,
//! }
//!
//! let config = KeyedConfig::new()
//!     .with_key(KeyConfig::primary(|u: &User| Some(u.id)))
//!     .with_key(KeyConfig::new(|u: &User| Some(u.name)).sorted().order_by());
//! let mut users = KeyedSequence::with_config(config).unwrap();
//! users.add(User { id: 1, name: "mallory" }).unwrap();
//! users.add(User { id: 2, name: "alice" }).unwrap();
//!
//! assert_eq!(users.get(0).map(|u| u.id), Some(2));
//! assert_eq!(users.get_by_key(1, Some(&1u32)).unwrap().map(|u| u.name), Some("mallory"));
//! assert_eq!(
//!     users.add(User { id: 1, name: "bob" }),
//!     Err(Error::DuplicateKey { index: 1 })
//! );
//! ```

mod collection;
mod config;
mod coordinator;
mod index;
mod map_view;
mod sequence;
mod store;

pub use collection::KeyedCollection;
pub use config::Comparator;
pub use config::Extractor;
pub use config::Hook;
pub use config::IndexBuilder;
pub use config::Key;
pub use config::KeyConfig;
pub use config::KeyedConfig;
pub use config::Observer;
pub use config::Predicate;
pub use map_view::KeyedAccess;
pub use map_view::MapView;
pub use sequence::KeyedSequence;
