//! Keyed elements without positions.

use std::fmt;

use tracing::debug;

use crate::error::Error;
use crate::error::Result;
use super::config::Key;
use super::config::KeyedConfig;
use super::coordinator::Coordinator;
use super::map_view::KeyedAccess;
use super::map_view::MapView;
use super::store::Slot;

/// A set or multiset of elements reachable through key indexes.
///
/// Iteration follows the order index: the `order_by` index if one is
/// configured, otherwise the first configured index. At least one index is
/// required.
pub struct KeyedCollection<E> {
    keys: Coordinator<E>,
}

impl<E: 'static> KeyedCollection<E> {
    pub fn with_config(config: KeyedConfig<E>) -> Result<KeyedCollection<E>> {
        let (keys, content) = Coordinator::build(config, false)?;
        let mut out = KeyedCollection { keys };
        for elem in content {
            out.add(elem)?;
        }
        return Ok(out);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.keys.len();
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.keys.len() == 0;
    }

    /// Elements in the order of the order index.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        return self.keys.ordered_slots().into_iter().filter_map(move |slot| self.keys.get(slot));
    }

    pub fn to_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        return self.iter().cloned().collect();
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Adds `elem`. A collection has no positions and so no oldest element
    /// to drop: once `max_size` is reached every add fails, moving window or
    /// not.
    pub fn add(&mut self, elem: E) -> Result<()> {
        self.keys.admit(&elem)?;
        if self.keys.is_full() {
            let max = self.keys.max_size().unwrap_or(0);
            debug!(max, moving_window = self.keys.moving_window(), "collection full");
            return Err(Error::MaxSizeReached { max });
        }
        let slot = self.keys.link(elem)?;
        self.keys.inserted(slot);
        return Ok(());
    }

    /// Like [`add`](Self::add), reporting failure as `false`.
    pub fn try_add(&mut self, elem: E) -> bool {
        return self.add(elem).is_ok();
    }

    pub fn add_all(&mut self, elems: impl IntoIterator<Item = E>) -> Result<()> {
        for elem in elems {
            self.add(elem)?;
        }
        return Ok(());
    }

    /// Replaces the element equal to `elem`, or adds it.
    pub fn put(&mut self, elem: E) -> Result<Option<E>>
    where
        E: PartialEq,
    {
        let found = self.find(&elem).first().copied();
        return match found {
            Some(slot) => self.replace(slot, elem).map(Some),
            None => self.add(elem).map(|_| None),
        };
    }

    /// Swaps the element in `slot` for `elem` in every index at once.
    fn replace(&mut self, slot: Slot, elem: E) -> Result<E> {
        self.keys.admit(&elem)?;
        self.keys.release(slot)?;
        self.keys.unlink(slot)?;
        let fresh = match self.keys.link(elem) {
            Ok(fresh) => fresh,
            Err(err) => {
                self.keys.relink(slot)?;
                return Err(err);
            }
        };
        let old = self.keys.evict(slot)?;
        self.keys.inserted(fresh);
        return Ok(old);
    }

    // =========================================================================
    // Element lookups
    // =========================================================================

    fn find(&self, elem: &E) -> Vec<Slot>
    where
        E: PartialEq,
    {
        return self.keys.find_all(elem, None).unwrap_or_default();
    }

    /// The stored element equal to `elem`.
    pub fn get(&self, elem: &E) -> Option<&E>
    where
        E: PartialEq,
    {
        return self.find(elem).first().and_then(|slot| self.keys.get(*slot));
    }

    pub fn get_all(&self, elem: &E) -> Vec<&E>
    where
        E: PartialEq,
    {
        return self.find(elem).into_iter().filter_map(|slot| self.keys.get(slot)).collect();
    }

    pub fn count(&self, elem: &E) -> usize
    where
        E: PartialEq,
    {
        return self.find(elem).len();
    }

    pub fn contains(&self, elem: &E) -> bool
    where
        E: PartialEq,
    {
        return !self.find(elem).is_empty();
    }

    /// Each element once; equal elements are collapsed.
    pub fn distinct(&self) -> Vec<&E>
    where
        E: PartialEq,
    {
        let mut out: Vec<&E> = Vec::new();
        for elem in self.iter() {
            if !out.contains(&elem) {
                out.push(elem);
            }
        }
        return out;
    }

    // =========================================================================
    // Remove
    // =========================================================================

    /// Removes one element equal to `elem`.
    pub fn remove(&mut self, elem: &E) -> Result<Option<E>>
    where
        E: PartialEq,
    {
        let Some(slot) = self.find(elem).first().copied() else {
            return Ok(None);
        };
        return self.keys.detach(slot).map(Some);
    }

    /// Removes every element equal to `elem`.
    pub fn remove_all(&mut self, elem: &E) -> Result<Vec<E>>
    where
        E: PartialEq,
    {
        let found = self.find(elem);
        return self.remove_slots(found);
    }

    /// Removes the slots in `found`. Every delete hook runs before anything
    /// is removed.
    fn remove_slots(&mut self, found: Vec<Slot>) -> Result<Vec<E>> {
        for slot in &found {
            self.keys.release(*slot)?;
            if !self.keys.is_linked(*slot) {
                return Err(Error::InvalidInternalState("element missing from an index"));
            }
        }
        let mut out = Vec::with_capacity(found.len());
        for slot in found {
            self.keys.unlink(slot)?;
            out.push(self.keys.evict(slot)?);
        }
        return Ok(out);
    }

    pub fn clear(&mut self) -> Result<()> {
        let all = self.keys.ordered_slots();
        self.remove_slots(all)?;
        return Ok(());
    }

    // =========================================================================
    // Re-keying after in-place mutation
    // =========================================================================

    /// Re-files every stored element equal to `elem` after its key fields
    /// were changed in place. Scans the whole collection, since the stale
    /// keys cannot be used to find it.
    pub fn invalidate(&mut self, elem: &E) -> Result<usize>
    where
        E: PartialEq,
    {
        let found: Vec<Slot> = self.keys.store.iter().filter(|(_, other)| *other == elem).map(|(slot, _)| slot).collect();
        for slot in &found {
            self.keys.rekey(*slot)?;
        }
        return Ok(found.len());
    }

    /// Re-files the elements equal to `elem` that index `key_index` still has
    /// under `old`.
    pub fn invalidate_key<K: Key>(&mut self, key_index: usize, old: Option<&K>, elem: &E) -> Result<usize>
    where
        E: PartialEq,
    {
        let found: Vec<Slot> = self
            .keys
            .key_index::<K>(key_index)?
            .lookup_all(old, self.keys.view(None))
            .into_iter()
            .filter(|slot| self.keys.get(*slot) == Some(elem))
            .collect();
        for slot in &found {
            self.keys.move_key(key_index, *slot, old)?;
        }
        return Ok(found.len());
    }

    /// Applies `f` to a copy of the first element filed under `key` and
    /// replaces it atomically. Returns the previous value.
    pub fn modify<K: Key>(&mut self, key_index: usize, key: Option<&K>, f: impl FnOnce(&mut E)) -> Result<Option<E>>
    where
        E: Clone,
    {
        let found = self.keys.key_index::<K>(key_index)?.lookup(key, self.keys.view(None));
        let Some(slot) = found else {
            return Ok(None);
        };
        let mut next = self.keys.get(slot).cloned().ok_or(Error::InvalidInternalState("dangling slot"))?;
        f(&mut next);
        return self.replace(slot, next).map(Some);
    }

    // =========================================================================
    // Range lookups and views
    // =========================================================================

    /// Elements with keys in `from..to`. Needs a sorted index.
    pub fn range_by_key<K: Key>(&self, key_index: usize, from: &K, to: &K) -> Result<Vec<&E>> {
        let slots = self.keys.key_index::<K>(key_index)?.range(from, to, self.keys.view(None))?;
        return Ok(slots.into_iter().filter_map(|slot| self.keys.get(slot)).collect());
    }

    pub fn map_view<K: Key>(&mut self, key_index: usize) -> Result<MapView<'_, KeyedCollection<E>, K>> {
        return MapView::new(self, key_index);
    }

    pub fn copy(&self) -> KeyedCollection<E>
    where
        E: Clone,
    {
        return KeyedCollection { keys: self.keys.copy() };
    }

    pub fn crop(&self) -> KeyedCollection<E> {
        return KeyedCollection { keys: self.keys.crop() };
    }

    pub fn check_consistency(&self) -> Result<()> {
        return self.keys.check_consistency(None);
    }
}

impl<E: 'static> KeyedAccess for KeyedCollection<E> {
    type Elem = E;

    fn len(&self) -> usize {
        return self.keys.len();
    }

    fn get_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<Option<&E>> {
        let slot = self.keys.key_index::<K>(index)?.lookup(key, self.keys.view(None));
        return Ok(slot.and_then(|slot| self.keys.get(slot)));
    }

    fn get_all_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<Vec<&E>> {
        let slots = self.keys.key_index::<K>(index)?.lookup_all(key, self.keys.view(None));
        return Ok(slots.into_iter().filter_map(|slot| self.keys.get(slot)).collect());
    }

    fn count_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<usize> {
        return Ok(self.keys.key_index::<K>(index)?.count(key, self.keys.view(None)));
    }

    fn distinct_keys<K: Key>(&self, index: usize) -> Result<Vec<Option<K>>> {
        return Ok(self.keys.key_index::<K>(index)?.distinct_keys(self.keys.view(None)));
    }

    fn remove_by_key<K: Key>(&mut self, index: usize, key: Option<&K>) -> Result<Option<E>> {
        let found = self.keys.key_index::<K>(index)?.lookup(key, self.keys.view(None));
        let Some(slot) = found else {
            return Ok(None);
        };
        return self.keys.detach(slot).map(Some);
    }

    fn remove_all_by_key<K: Key>(&mut self, index: usize, key: Option<&K>) -> Result<Vec<E>> {
        let found = self.keys.key_index::<K>(index)?.lookup_all(key, self.keys.view(None));
        return self.remove_slots(found);
    }

    fn put_by_key<K: Key>(&mut self, index: usize, elem: E) -> Result<Option<E>> {
        let keys = self.keys.key_index::<K>(index)?;
        let found = keys.lookup(keys.key_of(&elem).as_ref(), self.keys.view(None));
        return match found {
            Some(slot) => self.replace(slot, elem).map(Some),
            None => self.add(elem).map(|_| None),
        };
    }
}

impl<E: fmt::Debug + 'static> fmt::Debug for KeyedCollection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_set().entries(self.iter()).finish();
    }
}
