//! Gap buffer core: index translation, growth, insertion and removal.
//!
//! Slots form a ring. Logical position `i` maps to ring offset `i`, or
//! `i + gap_size` once `i` reaches the gap, and ring offset `r` lives in
//! physical slot `(start + r) % capacity`.
//!
//! Operations:
//! - get/set: O(1)
//! - insert/remove at either end: O(1) amortized
//! - insert/remove next to the gap: O(1)
//! - insert/remove elsewhere: O(distance to the gap, or to the nearer end)

use tracing::debug;
use tracing::trace;

use crate::error::Error;
use crate::error::Result;
use super::layout::Layout;

/// Capacity allocated by the first insertion into an unallocated sequence.
pub const DEFAULT_CAPACITY: usize = 10;

/// A growable sequence with cheap insertion and removal at any position.
///
/// Elements are kept in a circular buffer that may contain one gap of empty
/// slots. Edits next to the gap (or at either end) move no elements, and
/// edits elsewhere move only the elements between the edit and the gap.
pub struct GapSequence<T> {
    /// Physical slots; `None` wherever no live element is stored.
    pub(super) slots: Vec<Option<T>>,
    /// Physical slot of logical element 0.
    pub(super) start: usize,
    /// Number of live elements.
    pub(super) size: usize,
    /// Number of empty slots inside the live range.
    pub(super) gap_size: usize,
    /// Logical position in front of which the gap sits. Only meaningful when
    /// `gap_size > 0`, and then always in `1..size`.
    pub(super) gap_index: usize,
}

pub(super) fn empty_slots<T>(capacity: usize) -> Vec<Option<T>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    return slots;
}

impl<T> GapSequence<T> {
    /// Creates an empty sequence without allocating.
    pub fn new() -> GapSequence<T> {
        return GapSequence::with_capacity(0);
    }

    pub fn with_capacity(capacity: usize) -> GapSequence<T> {
        return GapSequence {
            slots: empty_slots(capacity),
            start: 0,
            size: 0,
            gap_size: 0,
            gap_index: 0,
        };
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.size;
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.size == 0;
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        return self.slots.len();
    }

    /// Snapshot of the physical layout.
    pub fn layout(&self) -> Layout {
        let capacity = self.capacity();
        let end = if capacity == 0 { 0 } else { (self.start + self.ring_len()) % capacity };
        let gap_start = if self.gap_size == 0 { 0 } else { self.ring_phys(self.gap_index) };
        return Layout {
            start: self.start,
            end,
            gap_start,
            gap_size: self.gap_size,
            gap_index: if self.gap_size == 0 { 0 } else { self.gap_index },
            size: self.size,
            capacity,
        };
    }

    // =========================================================================
    // Index translation
    // =========================================================================

    /// Live elements plus the gap.
    #[inline(always)]
    fn ring_len(&self) -> usize {
        return self.size + self.gap_size;
    }

    /// Slots outside both the live range and the gap.
    #[inline(always)]
    fn free(&self) -> usize {
        return self.capacity() - self.ring_len();
    }

    /// Reduces a position below `2 * capacity` into the slot range.
    #[inline(always)]
    fn wrap(&self, pos: usize) -> usize {
        let capacity = self.capacity();
        return if pos >= capacity { pos - capacity } else { pos };
    }

    #[inline(always)]
    pub(super) fn ring_phys(&self, ring: usize) -> usize {
        return self.wrap(self.start + ring);
    }

    /// Physical slot of logical position `index`.
    #[inline(always)]
    pub(super) fn phys(&self, index: usize) -> usize {
        let ring = if self.gap_size > 0 && index >= self.gap_index {
            index + self.gap_size
        } else {
            index
        };
        return self.ring_phys(ring);
    }

    #[inline(always)]
    fn relocate(&mut self, from: usize, to: usize) {
        let value = self.slots[from].take();
        self.slots[to] = value;
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }
        return self.slots[self.phys(index)].as_ref();
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.size {
            return None;
        }
        let slot = self.phys(index);
        return self.slots[slot].as_mut();
    }

    pub fn first(&self) -> Option<&T> {
        return self.get(0);
    }

    pub fn last(&self) -> Option<&T> {
        return match self.size {
            0 => None,
            size => self.get(size - 1),
        };
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        if index >= self.size {
            return Err(Error::IndexOutOfRange { index, len: self.size });
        }
        let slot = self.phys(index);
        return self.slots[slot]
            .replace(value)
            .ok_or(Error::InvalidInternalState("empty slot inside live range"));
    }

    // =========================================================================
    // Capacity
    // =========================================================================

    /// Makes room for at least `capacity` elements without further
    /// reallocation.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        self.grow(capacity);
    }

    fn grow(&mut self, min_capacity: usize) {
        let old = self.capacity();
        if min_capacity <= old {
            return;
        }
        let grown = if old == 0 { DEFAULT_CAPACITY } else { old * 3 / 2 + 1 };
        let capacity = grown.max(min_capacity);
        debug!(from = old, to = capacity, size = self.size, "growing gap sequence");
        self.rebuild(capacity);
    }

    /// Moves every element into a fresh buffer of `capacity` slots, starting
    /// at slot 0 and without a gap.
    fn rebuild(&mut self, capacity: usize) {
        let mut slots = empty_slots(capacity);
        for index in 0..self.size {
            let slot = self.phys(index);
            slots[index] = self.slots[slot].take();
        }
        self.slots = slots;
        self.start = 0;
        self.gap_size = 0;
        self.gap_index = 0;
    }

    /// Lays the elements out as a plain prefix of the buffer: start at slot
    /// 0, no gap. Capacity is kept. Calling it twice is the same as once.
    pub fn normalize(&mut self) {
        if self.start == 0 && self.gap_size == 0 {
            return;
        }
        trace!(start = self.start, gap_size = self.gap_size, "normalizing");
        self.rebuild(self.capacity());
    }

    /// Shrinks the buffer to exactly `len()` slots.
    pub fn trim_to_size(&mut self) {
        if self.capacity() == self.size && self.gap_size == 0 {
            return;
        }
        self.rebuild(self.size);
    }

    /// Drops every element, keeping the allocation.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.start = 0;
        self.size = 0;
        self.gap_size = 0;
        self.gap_index = 0;
    }

    // =========================================================================
    // Gap management
    // =========================================================================

    /// Turns all free space into a gap in front of `index`, moving whichever
    /// side of `index` is shorter. Requires no gap and `0 < index < size`.
    fn open_gap(&mut self, index: usize, free: usize) {
        let capacity = self.capacity();
        if index <= self.size - index {
            trace!(index, free, "opening gap: moving head back");
            for k in 0..index {
                let from = self.ring_phys(k);
                let to = (self.start + capacity - free + k) % capacity;
                self.relocate(from, to);
            }
            self.start = (self.start + capacity - free) % capacity;
        } else {
            trace!(index, free, "opening gap: moving tail forward");
            for k in (index..self.size).rev() {
                let from = self.ring_phys(k);
                let to = (self.start + k + free) % capacity;
                self.relocate(from, to);
            }
        }
        self.gap_index = index;
        self.gap_size = free;
    }

    /// Moves the existing gap in front of logical position `index`
    /// (`index <= size`), shifting the elements in between.
    pub(super) fn move_gap(&mut self, index: usize) {
        if index < self.gap_index {
            for k in (index..self.gap_index).rev() {
                let from = self.ring_phys(k);
                let to = self.ring_phys(k + self.gap_size);
                self.relocate(from, to);
            }
        } else {
            for k in self.gap_index..index {
                let from = self.ring_phys(k + self.gap_size);
                let to = self.ring_phys(k);
                self.relocate(from, to);
            }
        }
        self.gap_index = index;
    }

    /// Folds a gap sitting at either end of the live range back into the
    /// free region. Returns whether a gap was folded.
    pub(super) fn settle(&mut self) -> bool {
        if self.gap_size == 0 {
            self.gap_index = 0;
            return false;
        }
        if self.size == 0 {
            self.start = 0;
        } else if self.gap_index == 0 {
            self.start = self.ring_phys(self.gap_size);
        } else if self.gap_index < self.size {
            return false;
        }
        self.gap_size = 0;
        self.gap_index = 0;
        return true;
    }

    /// Claims the last slot of the gap for a new element at `gap_index`.
    fn take_gap_slot(&mut self) -> usize {
        let slot = self.ring_phys(self.gap_index + self.gap_size - 1);
        self.gap_size -= 1;
        if self.gap_size == 0 {
            self.gap_index = 0;
        }
        return slot;
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Inserts `value` so that it ends up at logical position `index`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.size {
            return Err(Error::IndexOutOfRange { index, len: self.size });
        }
        self.insert_unchecked(index, value);
        return Ok(());
    }

    pub fn push_back(&mut self, value: T) {
        self.insert_unchecked(self.size, value);
    }

    pub fn push_front(&mut self, value: T) {
        self.insert_unchecked(0, value);
    }

    pub(super) fn insert_unchecked(&mut self, index: usize, value: T) {
        debug_assert!(index <= self.size);
        if self.size == self.capacity() {
            self.grow(self.size + 1);
        }
        let free = self.free();

        let slot;
        if index == self.size && free > 0 {
            trace!(index, "insert: append");
            slot = self.ring_phys(self.ring_len());
        } else if index == 0 && free > 0 {
            trace!(index, "insert: prepend");
            self.start = if self.start == 0 { self.capacity() - 1 } else { self.start - 1 };
            if self.gap_size > 0 {
                self.gap_index += 1;
            }
            slot = self.start;
        } else if self.gap_size > 0 && index == self.gap_index {
            trace!(index, gap_size = self.gap_size, "insert: fill gap");
            slot = self.take_gap_slot();
        } else if self.gap_size == 0 {
            self.open_gap(index, free);
            slot = self.take_gap_slot();
        } else {
            trace!(index, gap_index = self.gap_index, "insert: move gap");
            self.move_gap(index);
            if self.settle() {
                // The gap reached an end and became free space there.
                self.insert_unchecked(index, value);
                return;
            }
            slot = self.take_gap_slot();
        }

        self.slots[slot] = Some(value);
        self.size += 1;
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes and returns the element at `index`.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.size {
            return Err(Error::IndexOutOfRange { index, len: self.size });
        }
        return self
            .remove_unchecked(index)
            .ok_or(Error::InvalidInternalState("empty slot inside live range"));
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        return self.remove_unchecked(0);
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        return self.remove_unchecked(self.size - 1);
    }

    pub(super) fn remove_unchecked(&mut self, index: usize) -> Option<T> {
        debug_assert!(index < self.size);
        let value;
        if index + 1 == self.size {
            trace!(index, "remove: last");
            let slot = self.phys(index);
            value = self.slots[slot].take();
        } else if index == 0 {
            trace!(index, "remove: first");
            value = self.slots[self.start].take();
            self.start = self.wrap(self.start + 1);
            if self.gap_size > 0 {
                self.gap_index -= 1;
            }
        } else if self.gap_size == 0 {
            trace!(index, "remove: open gap");
            let slot = self.phys(index);
            value = self.slots[slot].take();
            self.gap_index = index;
            self.gap_size = 1;
        } else {
            if index > self.gap_index {
                trace!(index, gap_index = self.gap_index, "remove: move gap forward");
                self.move_gap(index);
            } else if index + 1 < self.gap_index {
                trace!(index, gap_index = self.gap_index, "remove: move gap back");
                self.move_gap(index + 1);
            }
            if index == self.gap_index {
                // Element right after the gap.
                let slot = self.ring_phys(index + self.gap_size);
                value = self.slots[slot].take();
            } else {
                // Element right before the gap.
                let slot = self.ring_phys(index);
                value = self.slots[slot].take();
                self.gap_index = index;
            }
            self.gap_size += 1;
        }
        self.size -= 1;
        self.settle();
        return value;
    }

    /// Removes `len` elements starting at `index`.
    pub fn remove_range(&mut self, index: usize, len: usize) -> Result<()> {
        self.check_range(index, len)?;
        self.drain_range(index, len, |_| {});
        return Ok(());
    }

    /// Removes `index..index + len`, handing every removed element to `sink`
    /// in order. The removed range becomes part of the gap.
    pub(super) fn drain_range(&mut self, index: usize, len: usize, mut sink: impl FnMut(T)) {
        if len == 0 {
            return;
        }
        trace!(index, len, "remove range");
        if self.gap_size == 0 {
            self.gap_index = index;
        } else {
            self.move_gap(index);
        }
        for k in index..index + len {
            let slot = self.ring_phys(k + self.gap_size);
            if let Some(value) = self.slots[slot].take() {
                sink(value);
            }
        }
        self.gap_size += len;
        self.size -= len;
        self.settle();
    }

    pub(super) fn check_range(&self, index: usize, len: usize) -> Result<()> {
        return match index.checked_add(len) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(Error::InvalidRange { index, len, size: self.size }),
        };
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Verifies the layout invariants: the gap is strictly inside the live
    /// range, live and gap slots fit the buffer, and exactly the live slots
    /// are occupied.
    pub fn check_invariants(&self) -> Result<()> {
        let capacity = self.capacity();
        if self.ring_len() > capacity {
            return Err(Error::InvalidInternalState("live range exceeds capacity"));
        }
        if capacity == 0 {
            return if self.start == 0 && self.size == 0 {
                Ok(())
            } else {
                Err(Error::InvalidInternalState("unallocated sequence with elements"))
            };
        }
        if self.start >= capacity {
            return Err(Error::InvalidInternalState("start outside buffer"));
        }
        if self.gap_size > 0 && (self.gap_index == 0 || self.gap_index >= self.size) {
            return Err(Error::InvalidInternalState("gap at an end of the live range"));
        }
        if self.gap_size == 0 && self.gap_index != 0 {
            return Err(Error::InvalidInternalState("stale gap index"));
        }
        for ring in 0..capacity {
            let in_gap = self.gap_size > 0
                && ring >= self.gap_index
                && ring < self.gap_index + self.gap_size;
            let live = ring < self.ring_len() && !in_gap;
            if self.slots[self.ring_phys(ring)].is_some() != live {
                return Err(Error::InvalidInternalState("slot occupancy disagrees with layout"));
            }
        }
        return Ok(());
    }
}
