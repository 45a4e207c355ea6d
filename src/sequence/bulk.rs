//! Range operations, searching, sorting and predicate-driven edits.
//!
//! Everything here works on logical positions through the gap-aware
//! translation in `gap.rs`, so none of it needs the buffer normalized except
//! sorting, which hands a contiguous slice to the standard library sort.

use std::cmp::Ordering;

use crate::error::Error;
use crate::error::Result;
use super::gap::GapSequence;

impl<T> GapSequence<T> {
    // =========================================================================
    // Element moves
    // =========================================================================

    /// Swaps the elements at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        for index in [a, b] {
            if index >= self.size {
                return Err(Error::IndexOutOfRange { index, len: self.size });
            }
        }
        self.swap_unchecked(a, b);
        return Ok(());
    }

    #[inline(always)]
    fn swap_unchecked(&mut self, a: usize, b: usize) {
        let (a, b) = (self.phys(a), self.phys(b));
        self.slots.swap(a, b);
    }

    /// Reverses the order of `index..index + len`.
    pub fn reverse_range(&mut self, index: usize, len: usize) -> Result<()> {
        self.check_range(index, len)?;
        self.reverse_unchecked(index, len);
        return Ok(());
    }

    pub fn reverse(&mut self) {
        self.reverse_unchecked(0, self.size);
    }

    fn reverse_unchecked(&mut self, index: usize, len: usize) {
        if len < 2 {
            return;
        }
        let (mut lo, mut hi) = (index, index + len - 1);
        while lo < hi {
            self.swap_unchecked(lo, hi);
            lo += 1;
            hi -= 1;
        }
    }

    /// Rotates `index..index + len` by `distance` positions towards the end.
    /// Negative distances rotate towards the start.
    ///
    /// ```
    /// use gapkey::GapSequence;
    ///
    /// let mut seq: GapSequence<i32> = (0..5).collect();
    /// seq.rotate(0, 5, 2).unwrap();
    /// assert_eq!(seq.to_vec(), vec![3, 4, 0, 1, 2]);
    /// ```
    pub fn rotate(&mut self, index: usize, len: usize, distance: isize) -> Result<()> {
        self.check_range(index, len)?;
        if len == 0 {
            return Ok(());
        }
        let shift = distance.rem_euclid(len as isize) as usize;
        if shift == 0 {
            return Ok(());
        }
        // Three reversals: whole range, then the two halves.
        self.reverse_unchecked(index, len);
        self.reverse_unchecked(index, shift);
        self.reverse_unchecked(index + shift, len - shift);
        return Ok(());
    }

    /// Swaps the contents of two disjoint ranges of equal length.
    pub fn swap_ranges(&mut self, a: usize, b: usize, len: usize) -> Result<()> {
        self.check_range(a, len)?;
        self.check_range(b, len)?;
        if len > 0 && a < b + len && b < a + len {
            return Err(Error::OverlappingRanges);
        }
        for k in 0..len {
            self.swap_unchecked(a + k, b + k);
        }
        return Ok(());
    }

    /// Moves `src..src + len` so that it starts at `dst` of the resulting
    /// sequence, shifting the elements in between to fill the hole.
    /// `dst + len` must not exceed `len()`.
    pub fn drag(&mut self, src: usize, dst: usize, len: usize) -> Result<()> {
        self.check_range(src, len)?;
        self.check_range(dst, len)?;
        if src < dst {
            return self.rotate(src, len + (dst - src), (dst - src) as isize);
        }
        if dst < src {
            return self.rotate(dst, len + (src - dst), -((src - dst) as isize));
        }
        return Ok(());
    }

    // =========================================================================
    // Value-level range operations
    // =========================================================================

    /// Overwrites `index..index + len` with clones of `value`.
    pub fn fill(&mut self, index: usize, len: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.check_range(index, len)?;
        for k in index..index + len {
            let slot = self.phys(k);
            self.slots[slot] = Some(value.clone());
        }
        return Ok(());
    }

    /// Copies `src..src + len` over `dst..dst + len`. Overlapping ranges
    /// behave as if the source were copied to a temporary first.
    pub fn copy_range(&mut self, src: usize, dst: usize, len: usize) -> Result<()>
    where
        T: Clone,
    {
        self.check_range(src, len)?;
        self.check_range(dst, len)?;
        if src < dst {
            for k in (0..len).rev() {
                self.copy_one(src + k, dst + k);
            }
        } else if src > dst {
            for k in 0..len {
                self.copy_one(src + k, dst + k);
            }
        }
        return Ok(());
    }

    fn copy_one(&mut self, from: usize, to: usize)
    where
        T: Clone,
    {
        let value = self.slots[self.phys(from)].clone();
        let slot = self.phys(to);
        self.slots[slot] = value;
    }

    /// Moves `src..src + len` over `dst..dst + len`. Source positions not
    /// overwritten by the move are reset to `T::default()`.
    pub fn move_range(&mut self, src: usize, dst: usize, len: usize) -> Result<()>
    where
        T: Default,
    {
        self.check_range(src, len)?;
        self.check_range(dst, len)?;
        if src < dst {
            for k in (0..len).rev() {
                self.move_one(src + k, dst + k);
            }
        } else if src > dst {
            for k in 0..len {
                self.move_one(src + k, dst + k);
            }
        }
        return Ok(());
    }

    fn move_one(&mut self, from: usize, to: usize)
    where
        T: Default,
    {
        let from = self.phys(from);
        let value = self.slots[from].replace(T::default());
        let slot = self.phys(to);
        self.slots[slot] = value;
    }

    /// Replaces the contents with `len` clones of `value`.
    pub fn init(&mut self, len: usize, value: T)
    where
        T: Clone,
    {
        self.clear();
        self.ensure_capacity(len);
        for _ in 0..len {
            self.push_back(value.clone());
        }
    }

    /// Truncates or pads with clones of `value` to exactly `len` elements.
    pub fn resize(&mut self, len: usize, value: T)
    where
        T: Clone,
    {
        if len < self.size {
            self.drain_range(len, self.size - len, drop);
            return;
        }
        self.ensure_capacity(len);
        while self.size < len {
            self.push_back(value.clone());
        }
    }

    /// Overwrites consecutive elements starting at `index`.
    pub fn set_all(&mut self, index: usize, values: impl IntoIterator<Item = T>) -> Result<()> {
        let values: Vec<T> = values.into_iter().collect();
        self.check_range(index, values.len())?;
        for (k, value) in values.into_iter().enumerate() {
            let slot = self.phys(index + k);
            self.slots[slot] = Some(value);
        }
        return Ok(());
    }

    /// Inserts every value at `index`, keeping their order.
    pub fn insert_all(&mut self, index: usize, values: impl IntoIterator<Item = T>) -> Result<()> {
        if index > self.size {
            return Err(Error::IndexOutOfRange { index, len: self.size });
        }
        let values: Vec<T> = values.into_iter().collect();
        self.ensure_capacity(self.size + values.len());
        // Inserting back to front keeps hitting the same gap slot.
        for value in values.into_iter().rev() {
            self.insert_unchecked(index, value);
        }
        return Ok(());
    }

    /// Clones `index..index + len` into a new sequence.
    pub fn get_range(&self, index: usize, len: usize) -> Result<GapSequence<T>>
    where
        T: Clone,
    {
        self.check_range(index, len)?;
        let mut out = GapSequence::with_capacity(len);
        for k in index..index + len {
            if let Some(value) = self.get(k) {
                out.push_back(value.clone());
            }
        }
        return Ok(out);
    }

    /// Removes `index..index + len` and returns it as a new sequence.
    pub fn extract(&mut self, index: usize, len: usize) -> Result<GapSequence<T>> {
        self.check_range(index, len)?;
        let mut out = GapSequence::with_capacity(len);
        self.drain_range(index, len, |value| out.push_back(value));
        return Ok(out);
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Keeps the elements for which `keep` returns true, in order.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.compact(|value| keep(value), drop);
    }

    /// Removes the elements matching `pred`, returning how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.size;
        self.compact(|value| !pred(value), drop);
        return before - self.size;
    }

    /// Removes the elements matching `pred` and returns them in order.
    pub fn extract_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> GapSequence<T> {
        let mut out = GapSequence::new();
        self.compact(|value| !pred(value), |value| out.push_back(value));
        return out;
    }

    /// Single pass: kept elements slide down over removed ones, then the
    /// emptied tail is dropped from the live range.
    fn compact(&mut self, mut keep: impl FnMut(&T) -> bool, mut removed: impl FnMut(T)) {
        let mut write = 0;
        for read in 0..self.size {
            let from = self.phys(read);
            let kept = match &self.slots[from] {
                Some(value) => keep(value),
                None => false,
            };
            if kept {
                if read != write {
                    let to = self.phys(write);
                    let value = self.slots[from].take();
                    self.slots[to] = value;
                }
                write += 1;
            } else if let Some(value) = self.slots[from].take() {
                removed(value);
            }
        }
        self.drain_range(write, self.size - write, drop);
    }

    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return (0..self.size).find(|&i| self.get(i) == Some(value));
    }

    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return (0..self.size).rev().find(|&i| self.get(i) == Some(value));
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        return self.index_of(value).is_some();
    }

    // =========================================================================
    // Sorting and searching
    // =========================================================================

    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Stable sort of the whole sequence.
    pub fn sort_by(&mut self, cmp: impl FnMut(&T, &T) -> Ordering) {
        self.sort_unchecked(0, self.size, cmp);
    }

    /// Stable sort of `index..index + len`.
    pub fn sort_range_by(
        &mut self,
        index: usize,
        len: usize,
        cmp: impl FnMut(&T, &T) -> Ordering,
    ) -> Result<()> {
        self.check_range(index, len)?;
        self.sort_unchecked(index, len, cmp);
        return Ok(());
    }

    fn sort_unchecked(&mut self, index: usize, len: usize, mut cmp: impl FnMut(&T, &T) -> Ordering) {
        if len < 2 {
            return;
        }
        self.normalize();
        self.slots[index..index + len].sort_by(|a, b| match (a, b) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => Ordering::Equal,
        });
    }

    /// Binary search over a sequence sorted by `T::cmp`, with slice
    /// semantics: `Ok(pos)` of some match or `Err(insertion point)`.
    pub fn binary_search(&self, value: &T) -> std::result::Result<usize, usize>
    where
        T: Ord,
    {
        return self.binary_search_by(|probe| probe.cmp(value));
    }

    pub fn binary_search_by(
        &self,
        f: impl FnMut(&T) -> Ordering,
    ) -> std::result::Result<usize, usize> {
        return self.search_unchecked(0, self.size, f);
    }

    /// Like [`binary_search_by`](Self::binary_search_by) restricted to
    /// `index..index + len`; positions are absolute.
    pub fn binary_search_range_by(
        &self,
        index: usize,
        len: usize,
        f: impl FnMut(&T) -> Ordering,
    ) -> Result<std::result::Result<usize, usize>> {
        self.check_range(index, len)?;
        return Ok(self.search_unchecked(index, len, f));
    }

    fn search_unchecked(
        &self,
        index: usize,
        len: usize,
        mut f: impl FnMut(&T) -> Ordering,
    ) -> std::result::Result<usize, usize> {
        let (mut lo, mut hi) = (index, index + len);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let order = match self.get(mid) {
                Some(probe) => f(probe),
                None => Ordering::Greater,
            };
            match order {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        return Err(lo);
    }

    /// First position in `index..index + len` for which `pred` is false,
    /// given that `pred` holds for a prefix of the range.
    pub fn partition_point_range(&self, index: usize, len: usize, mut pred: impl FnMut(&T) -> bool) -> usize {
        let (mut lo, mut hi) = (index, (index + len).min(self.size));
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let holds = match self.get(mid) {
                Some(probe) => pred(probe),
                None => false,
            };
            if holds {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        return lo;
    }

    pub fn partition_point(&self, pred: impl FnMut(&T) -> bool) -> usize {
        return self.partition_point_range(0, self.size, pred);
    }
}
