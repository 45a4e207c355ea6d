//! Error type shared by the gap sequence and the keyed collections.

use std::fmt;

/// Everything that can go wrong when mutating or querying a collection.
///
/// A failed mutation always leaves the collection exactly as it was before
/// the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The element key of a collection that rejects null elements was absent.
    NullElement,
    /// The element failed the configured constraint predicate.
    ConstraintViolation,
    /// An index rejected a missing key.
    NullKey { index: usize },
    /// An index rejected a key that is already present.
    DuplicateKey { index: usize },
    /// An explicit position would break the order of a key-sorted list.
    InvalidSortedIndex { index: usize },
    /// The collection is full and does not evict.
    MaxSizeReached { max: usize },
    /// The indexes disagree about an element. Usually caused by mutating an
    /// element without invalidating it.
    InvalidInternalState(&'static str),
    /// A single position outside `0..len` (or `0..=len` for inserts).
    IndexOutOfRange { index: usize, len: usize },
    /// A range `index..index + len` not contained in a sequence of `size`.
    InvalidRange { index: usize, len: usize, size: usize },
    /// Two ranges that must be disjoint overlap.
    OverlappingRanges,
    /// The operation is not available on this collection.
    Unsupported(&'static str),
    /// No index is configured at this position.
    InvalidKeyIndex { index: usize },
    /// The index exists but was configured with another key type.
    KeyTypeMismatch { index: usize },
    /// The configuration cannot be turned into a collection.
    InvalidConfig(&'static str),
    /// A before-insert or before-delete hook vetoed the operation.
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NullElement => write!(f, "null element not allowed"),
            Error::ConstraintViolation => write!(f, "element violates constraint"),
            Error::NullKey { index } => write!(f, "null key not allowed by index {index}"),
            Error::DuplicateKey { index } => write!(f, "duplicate key not allowed by index {index}"),
            Error::InvalidSortedIndex { index } => {
                write!(f, "position {index} breaks the order of a sorted list")
            }
            Error::MaxSizeReached { max } => write!(f, "maximum size {max} reached"),
            Error::InvalidInternalState(what) => write!(f, "invalid internal state: {what}"),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Error::InvalidRange { index, len, size } => {
                write!(f, "range {index}..{} out of bounds for size {size}", index.saturating_add(*len))
            }
            Error::OverlappingRanges => write!(f, "ranges overlap"),
            Error::Unsupported(what) => write!(f, "unsupported operation: {what}"),
            Error::InvalidKeyIndex { index } => write!(f, "no key index {index}"),
            Error::KeyTypeMismatch { index } => write!(f, "key index {index} has another key type"),
            Error::InvalidConfig(what) => write!(f, "invalid configuration: {what}"),
            Error::Rejected(why) => write!(f, "rejected by hook: {why}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_index() {
        assert_eq!(
            Error::DuplicateKey { index: 2 }.to_string(),
            "duplicate key not allowed by index 2"
        );
        assert_eq!(
            Error::InvalidRange { index: 3, len: 4, size: 5 }.to_string(),
            "range 3..7 out of bounds for size 5"
        );
    }
}
