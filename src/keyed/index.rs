//! One secondary index over the elements of a keyed collection.
//!
//! An index maps keys to element slots in one of three ways:
//! - hash grouped: key → one slot, or a short list of slots for duplicates
//! - sorted: a gap sequence of `(key, slot)` pairs in comparator order, ties
//!   in insertion order
//! - projection: the index defines the order of a keyed list and stores
//!   nothing; lookups binary search the list itself
//!
//! Indexes are stored type-erased behind [`ErasedIndex`] so that indexes over
//! different key types share one collection. Typed lookups downcast back to
//! [`KeyIndex`].
//!
//! Operations (n elements, d duplicates of the key):
//! - add/remove, hash: O(1 + d)
//! - add/remove, sorted: O(log n + d) plus the gap sequence insert
//! - lookup, sorted or projection: O(log n)
//! - rekey after a mutation: O(n), the stale key has to be found first

use std::any::Any;
use std::cmp::Ordering;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::Error;
use crate::error::Result;
use crate::sequence::GapSequence;
use super::config::KeyConfig;
use super::config::Placement;
use super::store::Slot;
use super::store::Store;

/// What lookups need besides the index itself.
pub(crate) struct View<'a, E> {
    pub(crate) store: &'a Store<E>,
    /// The positional list, for list-backed collections.
    pub(crate) list: Option<&'a GapSequence<Slot>>,
}

impl<E> Clone for View<'_, E> {
    fn clone(&self) -> Self {
        return *self;
    }
}

impl<E> Copy for View<'_, E> {}

type Bucket = SmallVec<[Slot; 1]>;

enum Storage<K> {
    Hash { groups: FxHashMap<K, Bucket>, nulls: Bucket },
    Sorted(GapSequence<(Option<K>, Slot)>),
    Projection,
}

impl<K: Clone> Clone for Storage<K> {
    fn clone(&self) -> Storage<K> {
        return match self {
            Storage::Hash { groups, nulls } => Storage::Hash { groups: groups.clone(), nulls: nulls.clone() },
            Storage::Sorted(entries) => Storage::Sorted(entries.clone()),
            Storage::Projection => Storage::Projection,
        };
    }
}

impl<K> Storage<K> {
    fn emptied(&self) -> Storage<K> {
        return match self {
            Storage::Hash { .. } => Storage::Hash { groups: FxHashMap::default(), nulls: Bucket::new() },
            Storage::Sorted(_) => Storage::Sorted(GapSequence::new()),
            Storage::Projection => Storage::Projection,
        };
    }
}

pub(crate) struct KeyIndex<E, K> {
    position: usize,
    config: KeyConfig<E, K>,
    storage: Storage<K>,
}

impl<E, K: Clone> Clone for KeyIndex<E, K> {
    fn clone(&self) -> KeyIndex<E, K> {
        return KeyIndex {
            position: self.position,
            config: self.config.clone(),
            storage: self.storage.clone(),
        };
    }
}

/// First position in `lo..hi` where `pred` stops holding.
fn partition_point(mut lo: usize, mut hi: usize, mut pred: impl FnMut(usize) -> bool) -> usize {
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    return lo;
}

/// Where a new `key` goes in sorted `entries`: after all equal keys. Also
/// reports whether an equal key exists. Appends and prepends are decided by
/// comparing against the ends only.
fn insertion_point<E, K>(
    config: &KeyConfig<E, K>,
    entries: &GapSequence<(Option<K>, Slot)>,
    key: Option<&K>,
) -> (usize, bool) {
    let len = entries.len();
    let Some((last, _)) = entries.last() else {
        return (0, false);
    };
    match config.compare(key, last.as_ref()) {
        Ordering::Greater => return (len, false),
        Ordering::Equal => return (len, true),
        Ordering::Less => {}
    }
    if let Some((first, _)) = entries.first() {
        if config.compare(key, first.as_ref()) == Ordering::Less {
            return (0, false);
        }
    }
    let upper = entries.partition_point(|(k, _)| config.compare(k.as_ref(), key) != Ordering::Greater);
    let equal = upper > 0
        && entries
            .get(upper - 1)
            .is_some_and(|(k, _)| config.compare(k.as_ref(), key) == Ordering::Equal);
    return (upper, equal);
}

impl<E, K> KeyIndex<E, K>
where
    K: Hash + Eq + Clone,
{
    pub(crate) fn new(config: KeyConfig<E, K>, placement: Placement) -> KeyIndex<E, K> {
        let storage = if placement.projection {
            Storage::Projection
        } else if config.comparator.is_some() {
            Storage::Sorted(GapSequence::new())
        } else {
            Storage::Hash { groups: FxHashMap::default(), nulls: Bucket::new() }
        };
        return KeyIndex { position: placement.position, config, storage };
    }

    #[inline]
    pub(crate) fn key_of(&self, elem: &E) -> Option<K> {
        return self.config.key_of(elem);
    }

    fn check_null(&self, key: Option<&K>) -> Result<()> {
        if key.is_none() && !self.config.allow_null {
            return Err(Error::NullKey { index: self.position });
        }
        return Ok(());
    }

    fn same_key(&self, a: Option<&K>, b: Option<&K>) -> bool {
        return match self.storage {
            Storage::Hash { .. } => a == b,
            _ => self.config.compare(a, b) == Ordering::Equal,
        };
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Adds `slot` under `key`, enforcing the null and duplicate policies.
    fn insert_slot(&mut self, key: Option<K>, slot: Slot) -> Result<()> {
        self.check_null(key.as_ref())?;
        let allow_duplicates = self.config.duplicates_allowed(key.as_ref());
        let position = self.position;
        match &mut self.storage {
            Storage::Hash { groups, nulls } => {
                let bucket = match key {
                    Some(key) => groups.entry(key).or_default(),
                    None => nulls,
                };
                if !bucket.is_empty() && !allow_duplicates {
                    return Err(Error::DuplicateKey { index: position });
                }
                bucket.push(slot);
            }
            Storage::Sorted(entries) => {
                let (at, equal) = insertion_point(&self.config, entries, key.as_ref());
                if equal && !allow_duplicates {
                    return Err(Error::DuplicateKey { index: position });
                }
                entries.insert(at, (key, slot))?;
            }
            Storage::Projection => {}
        }
        return Ok(());
    }

    /// Adds `slot` under `key` without any policy check. Used to put back a
    /// key that was valid before.
    fn restore_slot(&mut self, key: Option<K>, slot: Slot) {
        match &mut self.storage {
            Storage::Hash { groups, nulls } => match key {
                Some(key) => groups.entry(key).or_default().push(slot),
                None => nulls.push(slot),
            },
            Storage::Sorted(entries) => {
                let (at, _) = insertion_point(&self.config, entries, key.as_ref());
                let _ = entries.insert(at, (key, slot));
            }
            Storage::Projection => {}
        }
    }

    /// Removes `slot` from under `key`. Returns false if it was not there.
    fn remove_slot(&mut self, key: Option<&K>, slot: Slot) -> bool {
        match &mut self.storage {
            Storage::Hash { groups, nulls } => {
                let Some(key) = key else {
                    let Some(at) = nulls.iter().position(|s| *s == slot) else {
                        return false;
                    };
                    nulls.remove(at);
                    return true;
                };
                let Some(bucket) = groups.get_mut(key) else {
                    return false;
                };
                let Some(at) = bucket.iter().position(|s| *s == slot) else {
                    return false;
                };
                bucket.remove(at);
                if bucket.is_empty() {
                    groups.remove(key);
                }
                return true;
            }
            Storage::Sorted(entries) => {
                let lo = entries.partition_point(|(k, _)| self.config.compare(k.as_ref(), key) == Ordering::Less);
                let mut at = lo;
                while let Some((k, s)) = entries.get(at) {
                    if self.config.compare(k.as_ref(), key) != Ordering::Equal {
                        break;
                    }
                    if *s == slot {
                        return entries.remove(at).is_ok();
                    }
                    at += 1;
                }
                return false;
            }
            Storage::Projection => return true,
        }
    }

    /// The key `slot` is currently filed under. O(n).
    fn find_key(&self, slot: Slot) -> Option<Option<K>> {
        return match &self.storage {
            Storage::Hash { groups, nulls } => {
                if nulls.contains(&slot) {
                    return Some(None);
                }
                groups
                    .iter()
                    .find(|(_, bucket)| bucket.contains(&slot))
                    .map(|(key, _)| Some(key.clone()))
            }
            Storage::Sorted(entries) => entries.iter().find(|(_, s)| *s == slot).map(|(key, _)| key.clone()),
            Storage::Projection => None,
        };
    }

    /// Re-files `slot` from `old` to the key its element has now.
    pub(crate) fn move_key(&mut self, slot: Slot, old: Option<&K>, elem: &E) -> Result<()> {
        if let Storage::Projection = self.storage {
            return Ok(());
        }
        if !self.remove_slot(old, slot) {
            return Err(Error::InvalidInternalState("element not found under its old key"));
        }
        let fresh = self.key_of(elem);
        if let Err(err) = self.insert_slot(fresh, slot) {
            self.restore_slot(old.cloned(), slot);
            return Err(err);
        }
        return Ok(());
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Number of positions in a sorted or projection index.
    fn ordered_len(&self, view: View<'_, E>) -> usize {
        return match &self.storage {
            Storage::Sorted(entries) => entries.len(),
            Storage::Projection => view.list.map_or(0, |list| list.len()),
            Storage::Hash { .. } => 0,
        };
    }

    fn slot_at(&self, pos: usize, view: View<'_, E>) -> Option<Slot> {
        return match &self.storage {
            Storage::Sorted(entries) => entries.get(pos).map(|(_, slot)| *slot),
            Storage::Projection => view.list.and_then(|list| list.get(pos)).copied(),
            Storage::Hash { .. } => None,
        };
    }

    fn key_at(&self, pos: usize, view: View<'_, E>) -> Option<K> {
        return match &self.storage {
            Storage::Sorted(entries) => entries.get(pos).and_then(|(key, _)| key.clone()),
            _ => self.slot_at(pos, view).and_then(|slot| view.store.get(slot)).and_then(|elem| self.key_of(elem)),
        };
    }

    fn compare_at(&self, pos: usize, key: Option<&K>, view: View<'_, E>) -> Ordering {
        return self.config.compare(self.key_at(pos, view).as_ref(), key);
    }

    /// Positions `lo..hi` holding keys equal to `key`.
    fn equal_range(&self, key: Option<&K>, view: View<'_, E>) -> (usize, usize) {
        let len = self.ordered_len(view);
        let lo = partition_point(0, len, |pos| self.compare_at(pos, key, view) == Ordering::Less);
        let hi = partition_point(lo, len, |pos| self.compare_at(pos, key, view) != Ordering::Greater);
        return (lo, hi);
    }

    fn bucket(&self, key: Option<&K>) -> Option<&Bucket> {
        let Storage::Hash { groups, nulls } = &self.storage else {
            return None;
        };
        return match key {
            Some(key) => groups.get(key),
            None => Some(nulls),
        };
    }

    /// Every slot filed under `key`, in insertion order (list order for a
    /// projection).
    pub(crate) fn lookup_all(&self, key: Option<&K>, view: View<'_, E>) -> Vec<Slot> {
        if let Storage::Hash { .. } = self.storage {
            return self.bucket(key).map_or_else(Vec::new, |bucket| bucket.to_vec());
        }
        let (lo, hi) = self.equal_range(key, view);
        return (lo..hi).filter_map(|pos| self.slot_at(pos, view)).collect();
    }

    pub(crate) fn lookup(&self, key: Option<&K>, view: View<'_, E>) -> Option<Slot> {
        if let Storage::Hash { .. } = self.storage {
            return self.bucket(key).and_then(|bucket| bucket.first().copied());
        }
        let (lo, hi) = self.equal_range(key, view);
        if lo == hi {
            return None;
        }
        return self.slot_at(lo, view);
    }

    pub(crate) fn count(&self, key: Option<&K>, view: View<'_, E>) -> usize {
        if let Storage::Hash { .. } = self.storage {
            return self.bucket(key).map_or(0, |bucket| bucket.len());
        }
        let (lo, hi) = self.equal_range(key, view);
        return hi - lo;
    }

    /// Position of the first element with `key` in a projection index.
    pub(crate) fn first_position(&self, key: Option<&K>, view: View<'_, E>) -> Option<usize> {
        if let Storage::Projection = self.storage {
            let (lo, hi) = self.equal_range(key, view);
            return if lo < hi { Some(lo) } else { None };
        }
        return None;
    }

    /// Each key once: sorted order for ordered indexes, nulls first and then
    /// hash order otherwise.
    pub(crate) fn distinct_keys(&self, view: View<'_, E>) -> Vec<Option<K>> {
        if let Storage::Hash { groups, nulls } = &self.storage {
            let mut keys = Vec::with_capacity(groups.len() + 1);
            if !nulls.is_empty() {
                keys.push(None);
            }
            keys.extend(groups.keys().cloned().map(Some));
            return keys;
        }
        let mut keys: Vec<Option<K>> = Vec::new();
        for pos in 0..self.ordered_len(view) {
            let key = self.key_at(pos, view);
            let repeated = keys
                .last()
                .is_some_and(|last| self.config.compare(last.as_ref(), key.as_ref()) == Ordering::Equal);
            if !repeated {
                keys.push(key);
            }
        }
        return keys;
    }

    /// Slots with keys in `from..to`, in key order.
    pub(crate) fn range(&self, from: &K, to: &K, view: View<'_, E>) -> Result<Vec<Slot>> {
        if let Storage::Hash { .. } = self.storage {
            return Err(Error::Unsupported("range lookup on a hash index"));
        }
        let len = self.ordered_len(view);
        let lo = partition_point(0, len, |pos| self.compare_at(pos, Some(from), view) == Ordering::Less);
        let hi = partition_point(lo, len, |pos| self.compare_at(pos, Some(to), view) == Ordering::Less);
        return Ok((lo..hi).filter_map(|pos| self.slot_at(pos, view)).collect());
    }
}

/// Object-safe face of a [`KeyIndex`], used by the coordinator.
pub(crate) trait ErasedIndex<E> {
    fn is_projection(&self) -> bool;

    /// Files a new element. Fails without side effects.
    fn add(&mut self, slot: Slot, elem: &E) -> Result<()>;

    /// Unfiles an element under its current key.
    fn remove(&mut self, slot: Slot, elem: &E) -> bool;

    /// Whether `slot` is filed under the element's current key.
    fn contains(&self, slot: Slot, elem: &E) -> bool;

    /// Slots filed under the same key as `elem`.
    fn matching(&self, elem: &E, view: View<'_, E>) -> Vec<Slot>;

    /// Re-files an element whose key may have changed. Returns the stale
    /// key, boxed, when the element moved, so the move can be undone.
    fn rekey(&mut self, slot: Slot, elem: &E) -> Result<Option<Box<dyn Any>>>;

    /// Undoes a successful `rekey`.
    fn unrekey(&mut self, slot: Slot, elem: &E, stale: Box<dyn Any>);

    /// Number of filed slots; `None` for a projection.
    fn entry_count(&self) -> Option<usize>;

    /// Every filed slot in index order. Empty for a projection.
    fn slots(&self) -> Vec<Slot>;

    /// Compares two elements by this index's keys.
    fn compare_elems(&self, a: &E, b: &E) -> Ordering;

    /// Whether another element with the same key as `elem` may be added.
    fn duplicates_allowed(&self, elem: &E) -> bool;

    fn has_null_key(&self, elem: &E) -> bool;

    fn boxed_copy(&self) -> Box<dyn ErasedIndex<E>>;

    /// Same configuration, no entries.
    fn boxed_crop(&self) -> Box<dyn ErasedIndex<E>>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E, K> ErasedIndex<E> for KeyIndex<E, K>
where
    E: 'static,
    K: Hash + Eq + Clone + 'static,
{
    fn is_projection(&self) -> bool {
        return matches!(self.storage, Storage::Projection);
    }

    fn add(&mut self, slot: Slot, elem: &E) -> Result<()> {
        let key = self.key_of(elem);
        return self.insert_slot(key, slot);
    }

    fn remove(&mut self, slot: Slot, elem: &E) -> bool {
        let key = self.key_of(elem);
        return self.remove_slot(key.as_ref(), slot);
    }

    fn contains(&self, slot: Slot, elem: &E) -> bool {
        let key = self.key_of(elem);
        return match &self.storage {
            Storage::Hash { .. } => self.bucket(key.as_ref()).is_some_and(|bucket| bucket.contains(&slot)),
            Storage::Sorted(entries) => {
                let lo = entries.partition_point(|(k, _)| self.config.compare(k.as_ref(), key.as_ref()) == Ordering::Less);
                entries
                    .iter()
                    .skip(lo)
                    .take_while(|(k, _)| self.config.compare(k.as_ref(), key.as_ref()) == Ordering::Equal)
                    .any(|(_, s)| *s == slot)
            }
            Storage::Projection => true,
        };
    }

    fn matching(&self, elem: &E, view: View<'_, E>) -> Vec<Slot> {
        let key = self.key_of(elem);
        return self.lookup_all(key.as_ref(), view);
    }

    fn rekey(&mut self, slot: Slot, elem: &E) -> Result<Option<Box<dyn Any>>> {
        if let Storage::Projection = self.storage {
            return Ok(None);
        }
        let fresh = self.key_of(elem);
        let Some(stale) = self.find_key(slot) else {
            return Err(Error::InvalidInternalState("element missing from index"));
        };
        if self.same_key(stale.as_ref(), fresh.as_ref()) {
            return Ok(None);
        }
        self.remove_slot(stale.as_ref(), slot);
        if let Err(err) = self.insert_slot(fresh, slot) {
            self.restore_slot(stale, slot);
            return Err(err);
        }
        return Ok(Some(Box::new(stale)));
    }

    fn unrekey(&mut self, slot: Slot, elem: &E, stale: Box<dyn Any>) {
        let Ok(stale) = stale.downcast::<Option<K>>() else {
            return;
        };
        let fresh = self.key_of(elem);
        self.remove_slot(fresh.as_ref(), slot);
        self.restore_slot(*stale, slot);
    }

    fn entry_count(&self) -> Option<usize> {
        return match &self.storage {
            Storage::Hash { groups, nulls } => Some(nulls.len() + groups.values().map(|b| b.len()).sum::<usize>()),
            Storage::Sorted(entries) => Some(entries.len()),
            Storage::Projection => None,
        };
    }

    fn slots(&self) -> Vec<Slot> {
        return match &self.storage {
            Storage::Hash { groups, nulls } => {
                nulls.iter().chain(groups.values().flatten()).copied().collect()
            }
            Storage::Sorted(entries) => entries.iter().map(|(_, slot)| *slot).collect(),
            Storage::Projection => Vec::new(),
        };
    }

    fn compare_elems(&self, a: &E, b: &E) -> Ordering {
        return self.config.compare(self.key_of(a).as_ref(), self.key_of(b).as_ref());
    }

    fn duplicates_allowed(&self, elem: &E) -> bool {
        return self.config.duplicates_allowed(self.key_of(elem).as_ref());
    }

    fn has_null_key(&self, elem: &E) -> bool {
        return self.key_of(elem).is_none();
    }

    fn boxed_copy(&self) -> Box<dyn ErasedIndex<E>> {
        return Box::new(self.clone());
    }

    fn boxed_crop(&self) -> Box<dyn ErasedIndex<E>> {
        return Box::new(KeyIndex {
            position: self.position,
            config: self.config.clone(),
            storage: self.storage.emptied(),
        });
    }

    fn as_any(&self) -> &dyn Any {
        return self;
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        return self;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    fn placement(projection: bool) -> Placement {
        return Placement { position: 1, projection, allow_null: None };
    }

    fn name_of(row: &Row) -> Option<&'static str> {
        return if row.name.is_empty() { None } else { Some(row.name) };
    }

    fn name_key() -> KeyConfig<Row, &'static str> {
        return KeyConfig::new(name_of);
    }

    fn fill(index: &mut KeyIndex<Row, &'static str>, store: &mut Store<Row>, rows: &[(u32, &'static str)]) -> Vec<Slot> {
        let mut slots = Vec::new();
        for &(id, name) in rows {
            let slot = store.insert(Row { id, name });
            index.add(slot, &store[slot]).unwrap();
            slots.push(slot);
        }
        return slots;
    }

    #[test]
    fn hash_groups_duplicates_in_order() {
        let mut store = Store::with_capacity(4);
        let mut index = KeyIndex::new(name_key(), placement(false));
        let slots = fill(&mut index, &mut store, &[(1, "a"), (2, "b"), (3, "a")]);
        let view = View { store: &store, list: None };
        assert_eq!(index.lookup_all(Some(&"a"), view), vec![slots[0], slots[2]]);
        assert_eq!(index.count(Some(&"b"), view), 1);
        assert_eq!(index.lookup(Some(&"z"), view), None);
        assert_eq!(index.entry_count(), Some(3));

        assert!(index.remove(slots[0], &store[slots[0]]));
        assert!(!index.remove(slots[0], &store[slots[0]]));
        assert_eq!(index.lookup(Some(&"a"), view), Some(slots[2]));
    }

    #[test]
    fn unique_rejects_without_side_effects() {
        let mut store = Store::with_capacity(2);
        let mut index = KeyIndex::new(KeyConfig::unique(name_of), placement(false));
        fill(&mut index, &mut store, &[(1, "a"), (2, ""), (3, "")]);
        let slot = store.insert(Row { id: 4, name: "a" });
        assert_eq!(index.add(slot, &store[slot]), Err(Error::DuplicateKey { index: 1 }));
        assert_eq!(index.entry_count(), Some(3));
    }

    #[test]
    fn sorted_keeps_order_and_ranges() {
        let mut store = Store::with_capacity(8);
        let mut index = KeyIndex::new(name_key().sorted(), placement(false));
        let slots = fill(&mut index, &mut store, &[(1, "m"), (2, "c"), (3, "x"), (4, "c"), (5, "")]);
        let view = View { store: &store, list: None };
        // nulls first, equal keys in insertion order
        assert_eq!(index.slots(), vec![slots[4], slots[1], slots[3], slots[0], slots[2]]);
        assert_eq!(index.distinct_keys(view), vec![None, Some("c"), Some("m"), Some("x")]);
        assert_eq!(index.range(&"c", &"n", view).unwrap(), vec![slots[1], slots[3], slots[0]]);
        assert_eq!(index.count(Some(&"c"), view), 2);
        assert!(index.remove(slots[3], &store[slots[3]]));
        assert_eq!(index.lookup_all(Some(&"c"), view), vec![slots[1]]);
    }

    #[test]
    fn rekey_and_undo() {
        let mut store = Store::with_capacity(4);
        let mut index = KeyIndex::new(KeyConfig::unique(name_of), placement(false));
        let slots = fill(&mut index, &mut store, &[(1, "a"), (2, "b")]);

        store.replace(slots[0], Row { id: 1, name: "c" });
        let stale = index.rekey(slots[0], &store[slots[0]]).unwrap().unwrap();
        let view = View { store: &store, list: None };
        assert_eq!(index.lookup(Some(&"c"), view), Some(slots[0]));
        assert_eq!(index.lookup(Some(&"a"), view), None);

        index.unrekey(slots[0], &store[slots[0]], stale);
        let view = View { store: &store, list: None };
        assert_eq!(index.lookup(Some(&"a"), view), Some(slots[0]));

        // moving onto an existing key fails and keeps the stale key
        store.replace(slots[0], Row { id: 1, name: "b" });
        assert_eq!(index.rekey(slots[0], &store[slots[0]]).unwrap_err(), Error::DuplicateKey { index: 1 });
        let view = View { store: &store, list: None };
        assert_eq!(index.lookup(Some(&"a"), view), Some(slots[0]));
    }

    #[test]
    fn projection_reads_the_list() {
        let mut store = Store::with_capacity(4);
        let mut list = GapSequence::new();
        for (id, name) in [(1, "a"), (2, "b"), (3, "b"), (4, "d")] {
            list.push_back(store.insert(Row { id, name }));
        }
        let index = KeyIndex::new(name_key().sorted(), placement(true));
        let view = View { store: &store, list: Some(&list) };
        assert_eq!(index.first_position(Some(&"b"), view), Some(1));
        assert_eq!(index.count(Some(&"b"), view), 2);
        assert_eq!(index.first_position(Some(&"c"), view), None);
        assert_eq!(index.distinct_keys(view).len(), 3);
        assert_eq!(index.entry_count(), None);
    }
}
