//! Gapkey - gap buffer sequences and keyed collections.
//!
//! [`GapSequence`] is a growable list with cheap insertion and removal at any
//! position. [`KeyedSequence`] and [`KeyedCollection`] add secondary key
//! indexes that are kept consistent with every mutation, with all-or-nothing
//! semantics when an index rejects an element.
//!
//! # Quick Start
//!
//! ```
//! use gapkey::{GapSequence, KeyConfig, KeyedConfig, KeyedCollection, KeyedAccess};
//!
//! let mut seq: GapSequence<u32> = (0..5).collect();
//! seq.rotate(0, 5, 2).unwrap();
//! assert_eq!(seq.to_vec(), vec![3, 4, 0, 1, 2]);
//!
//! let config = KeyedConfig::new().with_key(KeyConfig::unique(|s: &String| s.chars().next()));
//! let mut words = KeyedCollection::with_config(config).unwrap();
//! words.add("apple".to_string()).unwrap();
//! assert!(words.add("avocado".to_string()).is_err());
//! assert_eq!(words.get_by_key(1, Some(&'a')).unwrap().map(String::as_str), Some("apple"));
//! ```
//!
//! Nothing here is thread safe; callers sharing a collection between threads
//! have to serialize access themselves.

pub mod error;
pub mod keyed;
pub mod sequence;

pub use error::Error;
pub use error::Result;
pub use keyed::KeyConfig;
pub use keyed::KeyedAccess;
pub use keyed::KeyedCollection;
pub use keyed::KeyedConfig;
pub use keyed::KeyedSequence;
pub use keyed::MapView;
pub use sequence::GapSequence;
pub use sequence::Sequence;
