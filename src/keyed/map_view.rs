//! Map-shaped access to one index of a keyed collection.

use std::marker::PhantomData;

use crate::error::Result;
use super::config::Key;

/// Key-addressed operations shared by [`KeyedSequence`](super::KeyedSequence)
/// and [`KeyedCollection`](super::KeyedCollection).
///
/// `index` selects the index (0 is the element key) and `K` must be the key
/// type that index was configured with, otherwise the call fails with
/// [`Error::KeyTypeMismatch`](crate::Error::KeyTypeMismatch).
pub trait KeyedAccess {
    type Elem;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    /// The first element filed under `key`.
    fn get_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<Option<&Self::Elem>>;

    /// Every element filed under `key`, in index order.
    fn get_all_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<Vec<&Self::Elem>>;

    fn count_by_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<usize>;

    fn contains_key<K: Key>(&self, index: usize, key: Option<&K>) -> Result<bool> {
        return Ok(self.count_by_key(index, key)? > 0);
    }

    /// Each key once.
    fn distinct_keys<K: Key>(&self, index: usize) -> Result<Vec<Option<K>>>;

    /// Removes the first element filed under `key`.
    fn remove_by_key<K: Key>(&mut self, index: usize, key: Option<&K>) -> Result<Option<Self::Elem>>;

    /// Removes every element filed under `key`.
    fn remove_all_by_key<K: Key>(&mut self, index: usize, key: Option<&K>) -> Result<Vec<Self::Elem>>;

    /// Adds `elem`, replacing the element with the same key in `index` if
    /// there is one. Returns the replaced element.
    fn put_by_key<K: Key>(&mut self, index: usize, elem: Self::Elem) -> Result<Option<Self::Elem>>;
}

/// A map projection over one index, borrowed from its collection.
///
/// ```
/// use gapkey::{KeyConfig, KeyedConfig, KeyedSequence};
///
/// let config = KeyedConfig::new().with_key(KeyConfig::unique(|s: &(u32, &'static str)| Some(s.0)));
/// let mut list = KeyedSequence::with_config(config).unwrap();
/// list.add((1, "one")).unwrap();
///
/// let mut by_id = list.map_view::<u32>(1).unwrap();
/// assert_eq!(by_id.get(&1).unwrap(), Some(&(1, "one")));
/// assert_eq!(by_id.put((1, "uno")).unwrap(), Some((1, "one")));
/// assert_eq!(by_id.len(), 1);
/// ```
pub struct MapView<'a, C, K> {
    owner: &'a mut C,
    index: usize,
    key: PhantomData<K>,
}

impl<'a, C: KeyedAccess, K: Key> MapView<'a, C, K> {
    /// Checks that `index` exists and has key type `K`.
    pub(crate) fn new(owner: &'a mut C, index: usize) -> Result<MapView<'a, C, K>> {
        owner.count_by_key::<K>(index, None)?;
        return Ok(MapView { owner, index, key: PhantomData });
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        return self.index;
    }

    /// Number of elements, not distinct keys.
    pub fn len(&self) -> usize {
        return self.owner.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.owner.is_empty();
    }

    pub fn get(&self, key: &K) -> Result<Option<&C::Elem>> {
        return self.owner.get_by_key(self.index, Some(key));
    }

    pub fn get_null(&self) -> Result<Option<&C::Elem>> {
        return self.owner.get_by_key::<K>(self.index, None);
    }

    pub fn get_all(&self, key: &K) -> Result<Vec<&C::Elem>> {
        return self.owner.get_all_by_key(self.index, Some(key));
    }

    pub fn contains_key(&self, key: &K) -> Result<bool> {
        return self.owner.contains_key(self.index, Some(key));
    }

    pub fn count(&self, key: &K) -> Result<usize> {
        return self.owner.count_by_key(self.index, Some(key));
    }

    /// Distinct keys; `None` stands for the null key.
    pub fn keys(&self) -> Result<Vec<Option<K>>> {
        return self.owner.distinct_keys(self.index);
    }

    pub fn remove(&mut self, key: &K) -> Result<Option<C::Elem>> {
        return self.owner.remove_by_key(self.index, Some(key));
    }

    pub fn remove_all(&mut self, key: &K) -> Result<Vec<C::Elem>> {
        return self.owner.remove_all_by_key(self.index, Some(key));
    }

    pub fn put(&mut self, elem: C::Elem) -> Result<Option<C::Elem>> {
        return self.owner.put_by_key::<K>(self.index, elem);
    }
}
