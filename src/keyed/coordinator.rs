//! Keeps every index of a keyed collection in step with its elements.
//!
//! The coordinator owns the element store and the type-erased indexes. All
//! multi-index mutations are all-or-nothing: when one index rejects an
//! element, the indexes that already accepted it are unwound in reverse and
//! the error is returned with the collection untouched.

use std::any::Any;
use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::Error;
use crate::error::Result;
use crate::sequence::GapSequence;
use super::config::Hook;
use super::config::Key;
use super::config::KeyedConfig;
use super::config::Observer;
use super::config::Placement;
use super::config::Predicate;
use super::index::ErasedIndex;
use super::index::KeyIndex;
use super::index::View;
use super::store::Slot;
use super::store::Store;

/// Element-level rules that are not tied to one index.
pub(crate) struct Policy<E> {
    allow_null: bool,
    constraint: Option<Predicate<E>>,
    before_insert: Option<Hook<E>>,
    after_insert: Option<Observer<E>>,
    before_delete: Option<Hook<E>>,
    after_delete: Option<Observer<E>>,
    max_size: Option<usize>,
    moving_window: bool,
}

impl<E> Clone for Policy<E> {
    fn clone(&self) -> Policy<E> {
        return Policy {
            allow_null: self.allow_null,
            constraint: self.constraint.clone(),
            before_insert: self.before_insert.clone(),
            after_insert: self.after_insert.clone(),
            before_delete: self.before_delete.clone(),
            after_delete: self.after_delete.clone(),
            max_size: self.max_size,
            moving_window: self.moving_window,
        };
    }
}

type Indexes<E> = Vec<Option<Box<dyn ErasedIndex<E>>>>;

pub(crate) struct Coordinator<E> {
    pub(crate) store: Store<E>,
    indexes: Indexes<E>,
    /// The index whose order is the collection's iteration order.
    order: Option<usize>,
    policy: Policy<E>,
}

fn typed<E: 'static, K: 'static>(indexes: &Indexes<E>, index: usize) -> Result<&KeyIndex<E, K>> {
    let erased = indexes
        .get(index)
        .and_then(|entry| entry.as_deref())
        .ok_or(Error::InvalidKeyIndex { index })?;
    return erased
        .as_any()
        .downcast_ref::<KeyIndex<E, K>>()
        .ok_or(Error::KeyTypeMismatch { index });
}

fn typed_mut<E: 'static, K: 'static>(indexes: &mut Indexes<E>, index: usize) -> Result<&mut KeyIndex<E, K>> {
    let erased = indexes
        .get_mut(index)
        .and_then(|entry| entry.as_deref_mut())
        .ok_or(Error::InvalidKeyIndex { index })?;
    return erased
        .as_any_mut()
        .downcast_mut::<KeyIndex<E, K>>()
        .ok_or(Error::KeyTypeMismatch { index });
}

impl<E: 'static> Coordinator<E> {
    /// Validates `config` and builds the empty coordinator. The initial
    /// content is handed back for the owner to add through its own path.
    pub(crate) fn build(config: KeyedConfig<E>, list_backed: bool) -> Result<(Coordinator<E>, Vec<E>)> {
        if config.moving_window && config.max_size.is_none() {
            return Err(Error::InvalidConfig("moving window without max size"));
        }
        let mut builders = Vec::with_capacity(config.keys.len() + 1);
        builders.push(config.element_key);
        builders.extend(config.keys.into_iter().map(Some));

        let mut order = None;
        for (position, builder) in builders.iter().enumerate() {
            let Some(builder) = builder else {
                continue;
            };
            if let Some(problem) = builder.problem {
                return Err(Error::InvalidConfig(problem));
            }
            if builder.order_by {
                if order.is_some() {
                    return Err(Error::InvalidConfig("more than one index defines order"));
                }
                if list_backed && !builder.sorted {
                    return Err(Error::InvalidConfig("order index of a list must be sorted"));
                }
                order = Some(position);
            }
        }
        if !list_backed && order.is_none() {
            order = builders.iter().position(|builder| builder.is_some());
            if order.is_none() {
                return Err(Error::InvalidConfig("collection without any index"));
            }
        }

        let indexes = builders
            .into_iter()
            .enumerate()
            .map(|(position, builder)| {
                builder.map(|builder| {
                    let placement = Placement {
                        position,
                        projection: list_backed && builder.order_by,
                        allow_null: if position == 0 && !config.allow_null { Some(false) } else { None },
                    };
                    (builder.build)(placement)
                })
            })
            .collect();

        let coordinator = Coordinator {
            store: Store::with_capacity(config.initial_capacity),
            indexes,
            order,
            policy: Policy {
                allow_null: config.allow_null,
                constraint: config.constraint,
                before_insert: config.before_insert,
                after_insert: config.after_insert,
                before_delete: config.before_delete,
                after_delete: config.after_delete,
                max_size: config.max_size,
                moving_window: config.moving_window,
            },
        };
        return Ok((coordinator, config.content));
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        return self.store.len();
    }

    #[inline(always)]
    pub(crate) fn max_size(&self) -> Option<usize> {
        return self.policy.max_size;
    }

    #[inline(always)]
    pub(crate) fn moving_window(&self) -> bool {
        return self.policy.moving_window;
    }

    pub(crate) fn is_full(&self) -> bool {
        return self.policy.max_size.is_some_and(|max| self.len() >= max);
    }

    pub(crate) fn view<'a>(&'a self, list: Option<&'a GapSequence<Slot>>) -> View<'a, E> {
        return View { store: &self.store, list };
    }

    #[inline]
    pub(crate) fn get(&self, slot: Slot) -> Option<&E> {
        return self.store.get(slot);
    }

    fn order_index(&self) -> Option<&dyn ErasedIndex<E>> {
        let position = self.order?;
        return self.indexes.get(position)?.as_deref();
    }

    /// The list order is defined by a key, so positions are not free.
    pub(crate) fn is_sorted_list(&self) -> bool {
        return self.order_index().is_some_and(|index| index.is_projection());
    }

    /// Compares two elements by the order index, if the list is key sorted.
    pub(crate) fn compare_order(&self, a: &E, b: &E) -> Option<Ordering> {
        let index = self.order_index().filter(|index| index.is_projection())?;
        return Some(index.compare_elems(a, b));
    }

    pub(crate) fn order_duplicates_allowed(&self, elem: &E) -> bool {
        return self.order_index().is_none_or(|index| index.duplicates_allowed(elem));
    }

    #[inline(always)]
    pub(crate) fn order(&self) -> Option<usize> {
        return self.order;
    }

    /// Error reported for an equal neighbour in a key-sorted list.
    pub(crate) fn order_duplicate_error(&self) -> Error {
        return Error::DuplicateKey { index: self.order.unwrap_or(0) };
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Runs the hook and element-level checks.
    pub(crate) fn admit(&self, elem: &E) -> Result<()> {
        if let Some(hook) = &self.policy.before_insert {
            hook(elem)?;
        }
        let is_null = self.indexes.first().and_then(|entry| entry.as_deref()).is_some_and(|index| index.has_null_key(elem));
        if is_null && !self.policy.allow_null {
            return Err(Error::NullElement);
        }
        if let Some(constraint) = &self.policy.constraint {
            if !constraint(elem) {
                return Err(Error::ConstraintViolation);
            }
        }
        return Ok(());
    }

    /// Stores `elem` and files it in every index, or in none.
    pub(crate) fn link(&mut self, elem: E) -> Result<Slot> {
        let slot = self.store.insert(elem);
        let elem = &self.store[slot];
        for at in 0..self.indexes.len() {
            let Some(index) = self.indexes[at].as_mut() else {
                continue;
            };
            if let Err(err) = index.add(slot, elem) {
                debug!(index = at, %err, "rolling back partial insert");
                for index in self.indexes[..at].iter_mut().flatten() {
                    index.remove(slot, elem);
                }
                self.store.remove(slot);
                return Err(err);
            }
        }
        return Ok(slot);
    }

    pub(crate) fn inserted(&self, slot: Slot) {
        if let (Some(observer), Some(elem)) = (&self.policy.after_insert, self.store.get(slot)) {
            observer(elem);
        }
    }

    // =========================================================================
    // Remove
    // =========================================================================

    /// Runs the before-delete hook for the element in `slot`.
    pub(crate) fn release(&self, slot: Slot) -> Result<()> {
        let elem = self.store.get(slot).ok_or(Error::InvalidInternalState("dangling slot"))?;
        if let Some(hook) = &self.policy.before_delete {
            hook(elem)?;
        }
        return Ok(());
    }

    /// Whether every index has `slot` filed under its element's current key.
    pub(crate) fn is_linked(&self, slot: Slot) -> bool {
        let Some(elem) = self.store.get(slot) else {
            return false;
        };
        return self.indexes.iter().flatten().all(|index| index.contains(slot, elem));
    }

    /// Unfiles `slot` from every index. Fails without side effects if any
    /// index does not know the element under its current key.
    pub(crate) fn unlink(&mut self, slot: Slot) -> Result<()> {
        if !self.is_linked(slot) {
            return Err(Error::InvalidInternalState("element missing from an index"));
        }
        let elem = self.store.get(slot).ok_or(Error::InvalidInternalState("dangling slot"))?;
        for index in self.indexes.iter_mut().flatten() {
            index.remove(slot, elem);
        }
        return Ok(());
    }

    /// Removes an unlinked element from the store and notifies the observer.
    pub(crate) fn evict(&mut self, slot: Slot) -> Result<E> {
        let elem = self.store.remove(slot).ok_or(Error::InvalidInternalState("dangling slot"))?;
        if let Some(observer) = &self.policy.after_delete {
            observer(&elem);
        }
        return Ok(elem);
    }

    /// Hook, unlink and evict in one step.
    pub(crate) fn detach(&mut self, slot: Slot) -> Result<E> {
        self.release(slot)?;
        self.unlink(slot)?;
        return self.evict(slot);
    }

    /// Files an unlinked element again, without hooks.
    pub(crate) fn relink(&mut self, slot: Slot) -> Result<()> {
        let elem = self.store.get(slot).ok_or(Error::InvalidInternalState("dangling slot"))?;
        for at in 0..self.indexes.len() {
            let Some(index) = self.indexes[at].as_mut() else {
                continue;
            };
            if let Err(err) = index.add(slot, elem) {
                for index in self.indexes[..at].iter_mut().flatten() {
                    index.remove(slot, elem);
                }
                return Err(err);
            }
        }
        return Ok(());
    }

    // =========================================================================
    // Rekey
    // =========================================================================

    /// Re-files the element in `slot` in every index whose key for it has
    /// changed. On failure every index keeps the key it had before.
    pub(crate) fn rekey(&mut self, slot: Slot) -> Result<()> {
        let elem = self.store.get(slot).ok_or(Error::InvalidInternalState("dangling slot"))?;
        let mut moved: Vec<(usize, Box<dyn Any>)> = Vec::new();
        for at in 0..self.indexes.len() {
            let Some(index) = self.indexes[at].as_mut() else {
                continue;
            };
            match index.rekey(slot, elem) {
                Ok(Some(stale)) => moved.push((at, stale)),
                Ok(None) => {}
                Err(err) => {
                    debug!(index = at, undone = moved.len(), %err, "rolling back rekey");
                    for (at, stale) in moved.into_iter().rev() {
                        if let Some(index) = self.indexes[at].as_mut() {
                            index.unrekey(slot, elem, stale);
                        }
                    }
                    return Err(err);
                }
            }
        }
        return Ok(());
    }

    /// Moves the element in `slot` from `old` to its current key in one index.
    pub(crate) fn move_key<K: Key>(&mut self, index: usize, slot: Slot, old: Option<&K>) -> Result<()> {
        let elem = self.store.get(slot).ok_or(Error::InvalidInternalState("dangling slot"))?;
        return typed_mut::<E, K>(&mut self.indexes, index)?.move_key(slot, old, elem);
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub(crate) fn key_index<K: 'static>(&self, index: usize) -> Result<&KeyIndex<E, K>> {
        return typed(&self.indexes, index);
    }

    /// Slots holding an element equal to `elem`, found through the first
    /// configured index. `None` when there is no index to search.
    pub(crate) fn find_all(&self, elem: &E, list: Option<&GapSequence<Slot>>) -> Option<Vec<Slot>>
    where
        E: PartialEq,
    {
        let index = self.indexes.iter().flatten().next()?;
        let candidates = index.matching(elem, self.view(list));
        return Some(candidates.into_iter().filter(|slot| self.store.get(*slot) == Some(elem)).collect());
    }

    /// Slots in the order index's order. Empty for a projection.
    pub(crate) fn ordered_slots(&self) -> Vec<Slot> {
        return self.order_index().map_or_else(Vec::new, |index| index.slots());
    }

    // =========================================================================
    // Whole collection
    // =========================================================================

    /// Independent copy sharing only the configuration closures.
    pub(crate) fn copy(&self) -> Coordinator<E>
    where
        E: Clone,
    {
        return Coordinator {
            store: self.store.clone(),
            indexes: self.indexes.iter().map(|entry| entry.as_ref().map(|index| index.boxed_copy())).collect(),
            order: self.order,
            policy: self.policy.clone(),
        };
    }

    /// Same configuration, no elements.
    pub(crate) fn crop(&self) -> Coordinator<E> {
        return Coordinator {
            store: Store::with_capacity(0),
            indexes: self.indexes.iter().map(|entry| entry.as_ref().map(|index| index.boxed_crop())).collect(),
            order: self.order,
            policy: self.policy.clone(),
        };
    }

    /// Verifies that every element is filed in every index, that no index
    /// holds anything else, and that a list-backed collection lists each
    /// element exactly once, in key order when it is key sorted.
    pub(crate) fn check_consistency(&self, list: Option<&GapSequence<Slot>>) -> Result<()> {
        let len = self.store.len();
        for (slot, elem) in self.store.iter() {
            if !self.indexes.iter().flatten().all(|index| index.contains(slot, elem)) {
                return Err(Error::InvalidInternalState("element missing from an index"));
            }
        }
        for index in self.indexes.iter().flatten() {
            if index.entry_count().is_some_and(|count| count != len) {
                return Err(Error::InvalidInternalState("index size differs from collection size"));
            }
        }
        let Some(list) = list else {
            return Ok(());
        };
        if list.len() != len {
            return Err(Error::InvalidInternalState("list size differs from collection size"));
        }
        let mut seen = FxHashSet::default();
        for slot in list.iter() {
            if self.store.get(*slot).is_none() || !seen.insert(*slot) {
                return Err(Error::InvalidInternalState("list entry dangling or repeated"));
            }
        }
        for at in 1..list.len() {
            let (Some(prev), Some(next)) = (list.get(at - 1), list.get(at)) else {
                continue;
            };
            let (prev, next) = (&self.store[*prev], &self.store[*next]);
            match self.compare_order(prev, next) {
                Some(Ordering::Greater) => return Err(Error::InvalidInternalState("sorted list out of order")),
                Some(Ordering::Equal) if !self.order_duplicates_allowed(next) => {
                    return Err(Error::InvalidInternalState("duplicate key in sorted list"));
                }
                _ => {}
            }
        }
        return Ok(());
    }
}
