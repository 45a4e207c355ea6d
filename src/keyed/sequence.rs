//! A gap sequence whose elements are also filed in key indexes.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::error::Error;
use crate::error::Result;
use crate::sequence::GapSequence;
use crate::sequence::Sequence;
use super::config::Key;
use super::config::KeyedConfig;
use super::coordinator::Coordinator;
use super::map_view::KeyedAccess;
use super::map_view::MapView;
use super::store::Slot;

/// A positional list with secondary key indexes.
///
/// The list holds slot handles into the coordinator's store, so an element
/// exists once however many indexes see it. When an index is configured with
/// `order_by`, the list is kept in that index's key order: positions are
/// computed on add, and explicit positions are checked against their
/// neighbours.
///
/// Every mutation is all-or-nothing. A failed call leaves the list and all
/// of its indexes exactly as they were.
pub struct KeyedSequence<E> {
    keys: Coordinator<E>,
    list: GapSequence<Slot>,
}

impl<E: 'static> KeyedSequence<E> {
    /// Builds the list and adds the configured initial content in order.
    pub fn with_config(config: KeyedConfig<E>) -> Result<KeyedSequence<E>> {
        let capacity = config.initial_capacity;
        let (keys, content) = Coordinator::build(config, true)?;
        let mut out = KeyedSequence { keys, list: GapSequence::with_capacity(capacity) };
        for elem in content {
            out.add(elem)?;
        }
        return Ok(out);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.list.len();
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.list.is_empty();
    }

    /// Whether positions are dictated by an ordering key.
    pub fn is_sorted(&self) -> bool {
        return self.keys.is_sorted_list();
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        return self.list.get(index).and_then(|slot| self.keys.get(*slot));
    }

    pub fn first(&self) -> Option<&E> {
        return self.get(0);
    }

    pub fn last(&self) -> Option<&E> {
        return self.len().checked_sub(1).and_then(|last| self.get(last));
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &E> + ExactSizeIterator + '_ {
        return self.list.iter().map(move |slot| &self.keys.store[*slot]);
    }

    pub fn to_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        return self.iter().cloned().collect();
    }

    fn slot_at(&self, index: usize) -> Result<Slot> {
        return self
            .list
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange { index, len: self.list.len() });
    }

    // =========================================================================
    // Order checks for key-sorted lists
    // =========================================================================

    /// Where `elem` goes in a key-sorted list: after every element with an
    /// equal key. Fails if the key is present and may not repeat.
    fn sorted_position(&self, elem: &E) -> Result<usize> {
        let at = self.list.partition_point(|slot| {
            self.keys.compare_order(&self.keys.store[*slot], elem) != Some(Ordering::Greater)
        });
        if at > 0 && !self.keys.order_duplicates_allowed(elem) {
            let equal = self
                .get(at - 1)
                .is_some_and(|prev| self.keys.compare_order(prev, elem) == Some(Ordering::Equal));
            if equal {
                return Err(self.keys.order_duplicate_error());
            }
        }
        return Ok(at);
    }

    /// Checks that `elem` fits between positions `prev` and `next` of a
    /// key-sorted list. `index` is the position reported on failure.
    fn check_fits(&self, prev: Option<usize>, next: Option<usize>, index: usize, elem: &E) -> Result<()> {
        let unique = !self.keys.order_duplicates_allowed(elem);
        if let Some(prev) = prev.and_then(|pos| self.get(pos)) {
            match self.keys.compare_order(prev, elem) {
                Some(Ordering::Greater) => return Err(Error::InvalidSortedIndex { index }),
                Some(Ordering::Equal) if unique => return Err(self.keys.order_duplicate_error()),
                _ => {}
            }
        }
        if let Some(next) = next.and_then(|pos| self.get(pos)) {
            match self.keys.compare_order(elem, next) {
                Some(Ordering::Greater) => return Err(Error::InvalidSortedIndex { index }),
                Some(Ordering::Equal) if unique => return Err(self.keys.order_duplicate_error()),
                _ => {}
            }
        }
        return Ok(());
    }

    /// Position of `slot` in the list.
    fn position_of(&self, slot: Slot) -> Option<usize> {
        let elem = self.keys.get(slot)?;
        if self.is_sorted() {
            let lo = self.list.partition_point(|other| {
                self.keys.compare_order(&self.keys.store[*other], elem) == Some(Ordering::Less)
            });
            return (lo..self.list.len())
                .take_while(|pos| {
                    self.get(*pos)
                        .is_some_and(|other| self.keys.compare_order(other, elem) == Some(Ordering::Equal))
                })
                .find(|pos| self.list.get(*pos) == Some(&slot));
        }
        return self.list.index_of(&slot);
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Inserts at `pos`, or where the ordering key puts it, or at the end.
    ///
    /// A full moving window drops its first element before the new one is
    /// placed and linked. If placing or linking fails, the dropped element is
    /// filed again at position 0.
    fn insert_at(&mut self, pos: Option<usize>, elem: E) -> Result<bool> {
        let len = self.list.len();
        if let Some(index) = pos {
            if index > len {
                return Err(Error::IndexOutOfRange { index, len });
            }
        }
        self.keys.admit(&elem)?;

        let mut pos = pos;
        let mut dropped = None;
        if self.keys.is_full() {
            let max = self.keys.max_size().unwrap_or(0);
            if !self.keys.moving_window() {
                return Err(Error::MaxSizeReached { max });
            }
            // the new element would be the one evicted
            if pos == Some(0) || self.list.is_empty() {
                return Ok(false);
            }
            let first = self.slot_at(0)?;
            self.keys.release(first)?;
            self.keys.unlink(first)?;
            self.list.pop_front();
            pos = pos.map(|index| index - 1);
            dropped = Some(first);
        }

        let slot = match self.place_and_link(pos, elem) {
            Ok(placed) => placed,
            Err(err) => {
                if let Some(first) = dropped {
                    self.keys.relink(first)?;
                    self.list.insert(0, first)?;
                }
                return Err(err);
            }
        };
        if let Some(first) = dropped {
            self.keys.evict(first)?;
            debug!(len = self.list.len(), "moving window evicted first element");
        }
        self.keys.inserted(slot);
        return Ok(true);
    }

    /// Finds the position for `elem`, links it and puts it in the list.
    fn place_and_link(&mut self, pos: Option<usize>, elem: E) -> Result<Slot> {
        let at = match pos {
            Some(index) if self.is_sorted() => {
                self.check_fits(index.checked_sub(1), Some(index), index, &elem)?;
                index
            }
            Some(index) => index,
            None if self.is_sorted() => self.sorted_position(&elem)?,
            None => self.list.len(),
        };
        let slot = self.keys.link(elem)?;
        if let Err(err) = self.list.insert(at, slot) {
            self.keys.unlink(slot)?;
            self.keys.store.remove(slot);
            return Err(err);
        }
        return Ok(slot);
    }

    /// Appends `elem`, or adds it at its key position in a sorted list.
    ///
    /// In a full moving window the first element is evicted to make room.
    pub fn add(&mut self, elem: E) -> Result<()> {
        self.insert_at(None, elem)?;
        return Ok(());
    }

    /// Like [`add`](Self::add), reporting failure as `false`.
    pub fn try_add(&mut self, elem: E) -> bool {
        return self.insert_at(None, elem).unwrap_or(false);
    }

    /// Inserts at an explicit position. Returns `false` if a full moving
    /// window would evict the element straight away.
    pub fn insert(&mut self, index: usize, elem: E) -> Result<bool> {
        return self.insert_at(Some(index), elem);
    }

    /// Adds every element, stopping at the first failure.
    pub fn add_all(&mut self, elems: impl IntoIterator<Item = E>) -> Result<()> {
        for elem in elems {
            self.add(elem)?;
        }
        return Ok(());
    }

    // =========================================================================
    // Replace
    // =========================================================================

    /// Replaces the element at `index`, returning the old one. In a sorted
    /// list the new element must fit at the same position.
    pub fn set(&mut self, index: usize, elem: E) -> Result<E> {
        let old = self.slot_at(index)?;
        self.keys.admit(&elem)?;
        if self.is_sorted() {
            self.check_fits(index.checked_sub(1), Some(index + 1), index, &elem)?;
        }
        self.keys.release(old)?;
        self.keys.unlink(old)?;
        let slot = match self.keys.link(elem) {
            Ok(slot) => slot,
            Err(err) => {
                self.keys.relink(old)?;
                return Err(err);
            }
        };
        self.list.set(index, slot)?;
        let replaced = self.keys.evict(old)?;
        self.keys.inserted(slot);
        return Ok(replaced);
    }

    /// Applies `f` to a copy of the element at `index` and stores the result
    /// with [`set`](Self::set). Returns the previous value.
    pub fn modify(&mut self, index: usize, f: impl FnOnce(&mut E)) -> Result<E>
    where
        E: Clone,
    {
        let mut next = self.get(index).cloned().ok_or(Error::IndexOutOfRange { index, len: self.len() })?;
        f(&mut next);
        return self.set(index, next);
    }

    /// Replaces the element equal to `elem`, or adds it. Returns the
    /// replaced element.
    pub fn put(&mut self, elem: E) -> Result<Option<E>>
    where
        E: PartialEq,
    {
        return match self.index_of(&elem) {
            Some(index) => self.set(index, elem).map(Some),
            None => self.add(elem).map(|_| None),
        };
    }

    // =========================================================================
    // Remove
    // =========================================================================

    pub fn remove(&mut self, index: usize) -> Result<E> {
        let slot = self.slot_at(index)?;
        let elem = self.keys.detach(slot)?;
        self.list.remove(index)?;
        return Ok(elem);
    }

    /// Removes the first element equal to `elem`.
    pub fn remove_elem(&mut self, elem: &E) -> Result<Option<E>>
    where
        E: PartialEq,
    {
        let Some(index) = self.index_of(elem) else {
            return Ok(None);
        };
        return self.remove(index).map(Some);
    }

    /// Removes `len` elements starting at `index`. Every delete hook runs
    /// before anything is removed, so a veto leaves the list untouched.
    pub fn remove_range(&mut self, index: usize, len: usize) -> Result<Vec<E>> {
        let slots = self.list.get_range(index, len)?;
        for slot in slots.iter() {
            self.keys.release(*slot)?;
            if !self.keys.is_linked(*slot) {
                return Err(Error::InvalidInternalState("element missing from an index"));
            }
        }
        for slot in slots.iter() {
            self.keys.unlink(*slot)?;
        }
        self.list.remove_range(index, len)?;
        let mut out = Vec::with_capacity(len);
        for slot in slots {
            out.push(self.keys.evict(slot)?);
        }
        return Ok(out);
    }

    /// Removes everything, running the delete hooks first.
    pub fn clear(&mut self) -> Result<()> {
        self.remove_range(0, self.len())?;
        return Ok(());
    }

    // =========================================================================
    // Re-keying after in-place mutation
    // =========================================================================

    /// Takes the element at `index` out of the list, lets `rekey` update the
    /// indexes, and puts it back where its order key now belongs. On failure
    /// the element returns to `index` and the indexes keep their old keys.
    fn reposition(&mut self, index: usize, rekey: impl FnOnce(&mut Coordinator<E>, Slot) -> Result<()>) -> Result<usize> {
        let slot = self.slot_at(index)?;
        if !self.is_sorted() {
            rekey(&mut self.keys, slot)?;
            return Ok(index);
        }
        self.list.remove(index)?;
        let elem = &self.keys.store[slot];
        let target = if self.check_fits(index.checked_sub(1), Some(index), index, elem).is_ok() {
            Ok(index)
        } else {
            self.sorted_position(elem)
        };
        let target = match target.and_then(|target| rekey(&mut self.keys, slot).map(|_| target)) {
            Ok(target) => target,
            Err(err) => {
                self.list.insert(index, slot)?;
                return Err(err);
            }
        };
        self.list.insert(target, slot)?;
        if target != index {
            debug!(from = index, to = target, "repositioned invalidated element");
        }
        return Ok(target);
    }

    /// Re-files the element at `index` after its key fields were changed in
    /// place, for example through a `Cell`. Returns its new position.
    pub fn invalidate(&mut self, index: usize) -> Result<usize> {
        return self.reposition(index, |keys, slot| keys.rekey(slot));
    }

    /// Like [`invalidate`](Self::invalidate), for one index whose previous
    /// key for the element is known.
    pub fn invalidate_key<K: Key>(&mut self, key_index: usize, index: usize, old: Option<&K>) -> Result<usize> {
        return self.reposition(index, |keys, slot| keys.move_key(key_index, slot, old));
    }

    // =========================================================================
    // Order and search
    // =========================================================================

    /// Sorts the list. Unavailable when a key defines the order.
    pub fn sort_by(&mut self, mut cmp: impl FnMut(&E, &E) -> Ordering) -> Result<()> {
        if self.is_sorted() {
            return Err(Error::Unsupported("sorting a key-ordered list"));
        }
        let store = &self.keys.store;
        self.list.sort_by(|a, b| cmp(&store[*a], &store[*b]));
        return Ok(());
    }

    /// Binary search with slice semantics. The list must be ordered
    /// consistently with `f`.
    pub fn binary_search_by(&self, mut f: impl FnMut(&E) -> Ordering) -> std::result::Result<usize, usize> {
        return self.list.binary_search_by(|slot| f(&self.keys.store[*slot]));
    }

    /// Position of the first element equal to `elem`.
    pub fn index_of(&self, elem: &E) -> Option<usize>
    where
        E: PartialEq,
    {
        if self.is_sorted() {
            let lo = self.list.partition_point(|slot| {
                self.keys.compare_order(&self.keys.store[*slot], elem) == Some(Ordering::Less)
            });
            return (lo..self.list.len())
                .take_while(|pos| {
                    self.get(*pos)
                        .is_some_and(|other| self.keys.compare_order(other, elem) == Some(Ordering::Equal))
                })
                .find(|pos| self.get(*pos) == Some(elem));
        }
        return self.iter().position(|other| other == elem);
    }

    pub fn contains(&self, elem: &E) -> bool
    where
        E: PartialEq,
    {
        return match self.keys.find_all(elem, Some(&self.list)) {
            Some(found) => !found.is_empty(),
            None => self.index_of(elem).is_some(),
        };
    }

    /// Position of the first element filed under `key` in index `key_index`.
    pub fn index_of_key<K: Key>(&self, key_index: usize, key: Option<&K>) -> Result<Option<usize>> {
        let index = self.keys.key_index::<K>(key_index)?;
        let view = self.keys.view(Some(&self.list));
        if self.keys.order() == Some(key_index) && self.is_sorted() {
            return Ok(index.first_position(key, view));
        }
        return Ok(index.lookup(key, view).and_then(|slot| self.position_of(slot)));
    }

    /// Elements with keys in `from..to`. Needs a sorted index.
    pub fn range_by_key<K: Key>(&self, key_index: usize, from: &K, to: &K) -> Result<Vec<&E>> {
        let index = self.keys.key_index::<K>(key_index)?;
        let slots = index.range(from, to, self.keys.view(Some(&self.list)))?;
        return Ok(slots.into_iter().filter_map(|slot| self.keys.get(slot)).collect());
    }

    pub fn map_view<K: Key>(&mut self, key_index: usize) -> Result<MapView<'_, KeyedSequence<E>, K>> {
        return MapView::new(self, key_index);
    }

    // =========================================================================
    // Whole list
    // =========================================================================

    /// Independent copy with the same configuration and content.
    pub fn copy(&self) -> KeyedSequence<E>
    where
        E: Clone,
    {
        return KeyedSequence { keys: self.keys.copy(), list: self.list.clone() };
    }

    /// Empty list with the same configuration.
    pub fn crop(&self) -> KeyedSequence<E> {
        return KeyedSequence { keys: self.keys.crop(), list: GapSequence::new() };
    }

    /// Verifies the list against every index.
    pub fn check_consistency(&self) -> Result<()> {
        return self.keys.check_consistency(Some(&self.list));
    }

    /// Removes the slots in `found` from the list, in any order.
    fn remove_slots(&mut self, found: Vec<Slot>) -> Result<Vec<E>> {
        for slot in &found {
            self.keys.release(*slot)?;
        }
        let mut out = Vec::with_capacity(found.len());
        for slot in found {
            let index = self
                .position_of(slot)
                .ok_or(Error::InvalidInternalState("indexed element missing from list"))?;
            self.keys.unlink(slot)?;
            self.list.remove(index)?;
            out.push(self.keys.evict(slot)?);
        }
        return Ok(out);
    }
}

impl<E: 'static> KeyedAccess for KeyedSequence<E> {
    type Elem = E;

    fn len(&self) -> usize {
        return self.list.len();
    }

    fn get_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<Option<&E>> {
        let slot = self.keys.key_index::<K>(index)?.lookup(key, self.keys.view(Some(&self.list)));
        return Ok(slot.and_then(|slot| self.keys.get(slot)));
    }

    fn get_all_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<Vec<&E>> {
        let slots = self.keys.key_index::<K>(index)?.lookup_all(key, self.keys.view(Some(&self.list)));
        return Ok(slots.into_iter().filter_map(|slot| self.keys.get(slot)).collect());
    }

    fn count_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<usize> {
        return Ok(self.keys.key_index::<K>(index)?.count(key, self.keys.view(Some(&self.list))));
    }

    fn distinct_keys<K: Key>(&self, index: usize) -> Result<Vec<Option<K>>> {
        return Ok(self.keys.key_index::<K>(index)?.distinct_keys(self.keys.view(Some(&self.list))));
    }

    fn remove_by_key<K: Key>(&mut self, index: usize, key: Option<&K>) -> Result<Option<E>> {
        let slot = self.keys.key_index::<K>(index)?.lookup(key, self.keys.view(Some(&self.list)));
        let Some(slot) = slot else {
            return Ok(None);
        };
        return Ok(self.remove_slots(vec![slot])?.pop());
    }

    fn remove_all_by_key<K: Key>(&mut self, index: usize, key: Option<&K>) -> Result<Vec<E>> {
        let slots = self.keys.key_index::<K>(index)?.lookup_all(key, self.keys.view(Some(&self.list)));
        return self.remove_slots(slots);
    }

    fn put_by_key<K: Key>(&mut self, index: usize, elem: E) -> Result<Option<E>> {
        let keys = self.keys.key_index::<K>(index)?;
        let key = keys.key_of(&elem);
        let found = keys.lookup(key.as_ref(), self.keys.view(Some(&self.list)));
        let Some(slot) = found else {
            self.add(elem)?;
            return Ok(None);
        };
        let at = self
            .position_of(slot)
            .ok_or(Error::InvalidInternalState("indexed element missing from list"))?;
        return self.set(at, elem).map(Some);
    }
}

impl<E: 'static> Sequence<E> for KeyedSequence<E> {
    fn len(&self) -> usize {
        return self.list.len();
    }

    fn get(&self, index: usize) -> Option<&E> {
        return KeyedSequence::get(self, index);
    }

    fn set(&mut self, index: usize, value: E) -> Result<E> {
        return KeyedSequence::set(self, index, value);
    }

    fn insert(&mut self, index: usize, value: E) -> Result<()> {
        KeyedSequence::insert(self, index, value)?;
        return Ok(());
    }

    fn remove(&mut self, index: usize) -> Result<E> {
        return KeyedSequence::remove(self, index);
    }

    fn clear(&mut self) -> Result<()> {
        return KeyedSequence::clear(self);
    }

    fn push(&mut self, value: E) -> Result<()> {
        return self.add(value);
    }
}

impl<E: fmt::Debug + 'static> fmt::Debug for KeyedSequence<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_list().entries(self.iter()).finish();
    }
}
