//! Physical layout snapshots.
//!
//! A [`GapSequence`](super::GapSequence) keeps its elements in a ring of
//! `capacity` slots. Walking the ring from `start` yields the elements before
//! the gap, then `gap_size` empty slots, then the remaining elements, then the
//! free region up to `start` again. `end` and `gap_start` are derived from the
//! other fields and never stored.

/// Immutable snapshot of where a sequence keeps its elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Physical slot holding logical element 0.
    pub start: usize,
    /// Physical slot one past the last element, wrapping to 0.
    pub end: usize,
    /// Physical slot of the first gap slot (0 when there is no gap).
    pub gap_start: usize,
    /// Number of empty slots between `gap_index - 1` and `gap_index`.
    pub gap_size: usize,
    /// Logical position the gap sits in front of (0 when there is no gap).
    pub gap_index: usize,
    /// Number of live elements.
    pub size: usize,
    /// Number of physical slots.
    pub capacity: usize,
}

/// The distinct shapes a layout can take.
///
/// Every mutation path of the sequence moves between these classes, so tests
/// use them to make sure each shape is reached and handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayoutClass {
    /// No elements.
    Empty,
    /// Every slot is used and element 0 sits in slot 0.
    Full,
    /// Every slot is used and the elements wrap around the physical end.
    FullWrapped,
    /// Contiguous from slot 0, free slots only at the tail.
    FreeTail,
    /// Contiguous up to the last slot, free slots only at the head.
    FreeHead,
    /// Contiguous, free slots on both sides.
    FreeBoth,
    /// Elements wrap around the physical end, free slots in the middle.
    Wrapped,
    /// Gap present, no other free slot, element 0 in slot 0.
    GapFull,
    /// Gap present, no other free slot, ring rotated.
    GapFullWrapped,
    /// Gap present, contiguous from slot 0.
    GapFreeTail,
    /// Gap present, contiguous up to the last slot.
    GapFreeHead,
    /// Gap present, free slots on both sides.
    GapFreeBoth,
    /// The part before the gap wraps around the physical end.
    GapWrappedBefore,
    /// The gap starts exactly at slot 0.
    GapAtOrigin,
    /// The gap itself wraps around the physical end.
    GapSplit,
    /// The part after the gap wraps around the physical end.
    GapWrappedAfter,
}

impl Layout {
    /// Slots that are neither live nor part of the gap.
    pub fn free(&self) -> usize {
        return self.capacity - self.size - self.gap_size;
    }

    /// A normalized layout starts at slot 0 and has no gap, so the live
    /// elements form a plain prefix of the slots.
    pub fn is_normalized(&self) -> bool {
        return self.start == 0 && self.gap_size == 0;
    }

    pub fn class(&self) -> LayoutClass {
        use LayoutClass::*;

        if self.size == 0 {
            return Empty;
        }
        let ring = self.size + self.gap_size;
        let free = self.free();
        let contiguous = self.start + ring <= self.capacity;

        if self.gap_size == 0 {
            if free == 0 {
                return if self.start == 0 { Full } else { FullWrapped };
            }
            if !contiguous {
                return Wrapped;
            }
            if self.start == 0 {
                return FreeTail;
            }
            return if self.start + ring == self.capacity { FreeHead } else { FreeBoth };
        }

        if free == 0 {
            return if self.start == 0 { GapFull } else { GapFullWrapped };
        }
        if contiguous {
            if self.start == 0 {
                return GapFreeTail;
            }
            return if self.start + ring == self.capacity { GapFreeHead } else { GapFreeBoth };
        }

        // Ring offset that lands on physical slot 0.
        let wrap = self.capacity - self.start;
        if wrap < self.gap_index {
            return GapWrappedBefore;
        }
        if wrap == self.gap_index {
            return GapAtOrigin;
        }
        if wrap < self.gap_index + self.gap_size {
            return GapSplit;
        }
        return GapWrappedAfter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(start: usize, size: usize, gap_index: usize, gap_size: usize, capacity: usize) -> Layout {
        let end = if capacity == 0 { 0 } else { (start + size + gap_size) % capacity };
        let gap_start = if gap_size == 0 { 0 } else { (start + gap_index) % capacity };
        return Layout { start, end, gap_start, gap_size, gap_index, size, capacity };
    }

    #[test]
    fn classifies_layouts_without_gap() {
        assert_eq!(layout(0, 0, 0, 0, 0).class(), LayoutClass::Empty);
        assert_eq!(layout(0, 4, 0, 0, 4).class(), LayoutClass::Full);
        assert_eq!(layout(2, 4, 0, 0, 4).class(), LayoutClass::FullWrapped);
        assert_eq!(layout(0, 2, 0, 0, 4).class(), LayoutClass::FreeTail);
        assert_eq!(layout(2, 2, 0, 0, 4).class(), LayoutClass::FreeHead);
        assert_eq!(layout(1, 2, 0, 0, 4).class(), LayoutClass::FreeBoth);
        assert_eq!(layout(3, 2, 0, 0, 4).class(), LayoutClass::Wrapped);
    }

    #[test]
    fn classifies_layouts_with_gap() {
        assert_eq!(layout(0, 4, 2, 2, 6).class(), LayoutClass::GapFull);
        assert_eq!(layout(3, 4, 2, 2, 6).class(), LayoutClass::GapFullWrapped);
        assert_eq!(layout(0, 3, 1, 1, 6).class(), LayoutClass::GapFreeTail);
        assert_eq!(layout(2, 3, 1, 1, 6).class(), LayoutClass::GapFreeHead);
        assert_eq!(layout(1, 3, 1, 1, 6).class(), LayoutClass::GapFreeBoth);
        assert_eq!(layout(8, 4, 3, 1, 10).class(), LayoutClass::GapWrappedBefore);
        assert_eq!(layout(8, 4, 2, 1, 10).class(), LayoutClass::GapAtOrigin);
        assert_eq!(layout(8, 3, 1, 2, 10).class(), LayoutClass::GapSplit);
        assert_eq!(layout(7, 4, 1, 1, 10).class(), LayoutClass::GapWrappedAfter);
    }

    #[test]
    fn normalized_means_prefix() {
        assert!(layout(0, 3, 0, 0, 8).is_normalized());
        assert!(!layout(1, 3, 0, 0, 8).is_normalized());
        assert!(!layout(0, 3, 1, 2, 8).is_normalized());
        assert_eq!(layout(0, 3, 1, 2, 8).free(), 3);
    }
}
