//! Gap buffer sequence.
//!
//! [`GapSequence`] is an array-backed list that supports cheap insertion and
//! removal at any position, not just at the ends. The buffer is a ring with
//! an optional gap of empty slots inside the live range; edits that land on
//! the gap or on either end move no elements at all.
//!
//! ```
//! use gapkey::GapSequence;
//!
//! let mut seq = GapSequence::with_capacity(4);
//! for v in [1, 2, 3] {
//!     seq.insert(0, v).unwrap();
//! }
//! seq.insert(1, 9).unwrap();
//! assert_eq!(seq.to_vec(), vec![3, 9, 2, 1]);
//! ```

mod bulk;
mod gap;
mod impls;
mod iter;
mod layout;
mod view;

pub use gap::GapSequence;
pub use gap::DEFAULT_CAPACITY;
pub use iter::CursorBackMut;
pub use iter::CursorMut;
pub use iter::IntoIter;
pub use iter::Iter;
pub use iter::IterMut;
pub use layout::Layout;
pub use layout::LayoutClass;
pub use view::ReadOnly;
pub use view::Sequence;
