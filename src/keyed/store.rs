//! Slot arena owning the elements of a keyed collection.
//!
//! Indexes and the positional list refer to elements by [`Slot`], so every
//! element is stored exactly once no matter how many indexes see it. Freed
//! slots are recycled through a free list.

use std::ops::Index;

/// Handle to an element stored in a [`Store`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Slot(u32);

#[derive(Clone)]
pub(crate) struct Store<E> {
    entries: Vec<Option<E>>,
    free_list: Vec<Slot>,
    len: usize,
}

impl<E> Store<E> {
    pub(crate) fn with_capacity(capacity: usize) -> Store<E> {
        return Store { entries: Vec::with_capacity(capacity), free_list: Vec::new(), len: 0 };
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        return self.len;
    }

    pub(crate) fn insert(&mut self, elem: E) -> Slot {
        self.len += 1;
        if let Some(slot) = self.free_list.pop() {
            self.entries[slot.0 as usize] = Some(elem);
            return slot;
        }
        let slot = Slot(self.entries.len() as u32);
        self.entries.push(Some(elem));
        return slot;
    }

    pub(crate) fn remove(&mut self, slot: Slot) -> Option<E> {
        let elem = self.entries.get_mut(slot.0 as usize)?.take()?;
        self.len -= 1;
        self.free_list.push(slot);
        return Some(elem);
    }

    #[inline(always)]
    pub(crate) fn get(&self, slot: Slot) -> Option<&E> {
        return self.entries.get(slot.0 as usize)?.as_ref();
    }

    /// Swaps in a new element for `slot`, returning the old one. Lets tests
    /// mutate an element behind the indexes' back.
    #[cfg(test)]
    pub(crate) fn replace(&mut self, slot: Slot, elem: E) -> Option<E> {
        return self.entries.get_mut(slot.0 as usize)?.replace(elem);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Slot, &E)> + '_ {
        return self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_ref().map(|elem| (Slot(i as u32), elem)));
    }
}

impl<E> Index<Slot> for Store<E> {
    type Output = E;

    fn index(&self, slot: Slot) -> &E {
        match self.get(slot) {
            Some(elem) => return elem,
            None => panic!("dangling slot {:?}", slot),
        }
    }
}
