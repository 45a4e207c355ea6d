//! Configuration of keyed collections and their indexes.
//!
//! A collection is described by one [`KeyedConfig`] holding plain named
//! fields. Each index is described by a [`KeyConfig`] and type-erased into an
//! [`IndexBuilder`] when added, so indexes over different key types can live
//! side by side. Everything is validated once, when the collection is built.

use std::cmp::Ordering;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::Result;
use super::index::ErasedIndex;
use super::index::KeyIndex;

/// Maps an element to its key. `None` is the null key.
pub type Extractor<E, K> = Rc<dyn Fn(&E) -> Option<K>>;
/// Orders keys. Called with `None` only by indexes whose comparator handles
/// null keys itself.
pub type Comparator<K> = Rc<dyn Fn(Option<&K>, Option<&K>) -> Ordering>;
/// Bounds every key type has to meet.
pub trait Key: Hash + Eq + Clone + 'static {}

impl<T: Hash + Eq + Clone + 'static> Key for T {}

/// Element constraint.
pub type Predicate<E> = Rc<dyn Fn(&E) -> bool>;
/// Runs before a mutation; returning an error vetoes it.
pub type Hook<E> = Rc<dyn Fn(&E) -> Result<()>>;
/// Runs after a mutation succeeded.
pub type Observer<E> = Rc<dyn Fn(&E)>;

/// One secondary index.
///
/// Defaults match a plain multimap: null keys and duplicates allowed, hash
/// grouped, not defining order.
pub struct KeyConfig<E, K> {
    pub extractor: Extractor<E, K>,
    /// This index defines the iteration order of its collection.
    pub order_by: bool,
    pub allow_null: bool,
    pub allow_duplicates: bool,
    /// Null keys may repeat even when other keys may not.
    pub allow_duplicate_nulls: bool,
    /// Keep keys in comparator order instead of hash groups.
    pub sorted: bool,
    pub comparator: Option<Comparator<K>>,
    pub comparator_handles_null: bool,
    /// Where null keys sort when the comparator does not handle them.
    pub nulls_first: bool,
}

impl<E, K> Clone for KeyConfig<E, K> {
    fn clone(&self) -> KeyConfig<E, K> {
        return KeyConfig {
            extractor: self.extractor.clone(),
            order_by: self.order_by,
            allow_null: self.allow_null,
            allow_duplicates: self.allow_duplicates,
            allow_duplicate_nulls: self.allow_duplicate_nulls,
            sorted: self.sorted,
            comparator: self.comparator.clone(),
            comparator_handles_null: self.comparator_handles_null,
            nulls_first: self.nulls_first,
        };
    }
}

impl<E, K> KeyConfig<E, K> {
    /// Multimap index: nulls and duplicates allowed.
    pub fn new(extractor: impl Fn(&E) -> Option<K> + 'static) -> KeyConfig<E, K> {
        return KeyConfig {
            extractor: Rc::new(extractor),
            order_by: false,
            allow_null: true,
            allow_duplicates: true,
            allow_duplicate_nulls: true,
            sorted: false,
            comparator: None,
            comparator_handles_null: false,
            nulls_first: true,
        };
    }

    pub fn multi(extractor: impl Fn(&E) -> Option<K> + 'static) -> KeyConfig<E, K> {
        return KeyConfig::new(extractor);
    }

    /// Unique non-null keys; any number of elements may have a null key.
    pub fn unique(extractor: impl Fn(&E) -> Option<K> + 'static) -> KeyConfig<E, K> {
        let mut config = KeyConfig::new(extractor);
        config.allow_duplicates = false;
        return config;
    }

    /// Unique keys, null keys rejected.
    pub fn primary(extractor: impl Fn(&E) -> Option<K> + 'static) -> KeyConfig<E, K> {
        let mut config = KeyConfig::unique(extractor);
        config.allow_null = false;
        config.allow_duplicate_nulls = false;
        return config;
    }

    /// Keeps keys in their natural order.
    pub fn sorted(self) -> KeyConfig<E, K>
    where
        K: Ord + 'static,
    {
        return self.sorted_by(K::cmp);
    }

    /// Keeps keys ordered by `cmp`; null keys are placed by `nulls_first`.
    pub fn sorted_by(mut self, cmp: impl Fn(&K, &K) -> Ordering + 'static) -> KeyConfig<E, K> {
        self.sorted = true;
        self.comparator_handles_null = false;
        self.comparator = Some(Rc::new(move |a: Option<&K>, b: Option<&K>| match (a, b) {
            (Some(a), Some(b)) => cmp(a, b),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        }));
        return self;
    }

    /// Keeps keys ordered by a comparator that also places null keys.
    pub fn sorted_by_nullable(
        mut self,
        cmp: impl Fn(Option<&K>, Option<&K>) -> Ordering + 'static,
    ) -> KeyConfig<E, K> {
        self.sorted = true;
        self.comparator_handles_null = true;
        self.comparator = Some(Rc::new(cmp));
        return self;
    }

    pub fn order_by(mut self) -> KeyConfig<E, K> {
        self.order_by = true;
        return self;
    }

    pub fn nulls_first(mut self, first: bool) -> KeyConfig<E, K> {
        self.nulls_first = first;
        return self;
    }

    #[inline]
    pub(crate) fn key_of(&self, elem: &E) -> Option<K> {
        return (self.extractor)(elem);
    }

    /// Total order over nullable keys.
    pub(crate) fn compare(&self, a: Option<&K>, b: Option<&K>) -> Ordering {
        let Some(cmp) = &self.comparator else {
            return Ordering::Equal;
        };
        if self.comparator_handles_null {
            return cmp(a, b);
        }
        return match (a, b) {
            (Some(_), Some(_)) => cmp(a, b),
            (None, None) => Ordering::Equal,
            (None, Some(_)) if self.nulls_first => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) if self.nulls_first => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        };
    }

    pub(crate) fn duplicates_allowed(&self, key: Option<&K>) -> bool {
        return self.allow_duplicates || (key.is_none() && self.allow_duplicate_nulls);
    }
}

impl<E: Clone> KeyConfig<E, E> {
    /// The element itself as its key.
    pub fn element() -> KeyConfig<E, E> {
        return KeyConfig::new(|elem: &E| Some(elem.clone()));
    }
}

/// How a built index is placed inside its collection.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Placement {
    /// Position of the index, reported in errors.
    pub(crate) position: usize,
    /// The index defines list order and reads keys from the list.
    pub(crate) projection: bool,
    /// Overrides `allow_null` for the element index.
    pub(crate) allow_null: Option<bool>,
}

/// A type-erased [`KeyConfig`], ready to be built into an index.
pub struct IndexBuilder<E> {
    pub(crate) order_by: bool,
    pub(crate) sorted: bool,
    pub(crate) problem: Option<&'static str>,
    pub(crate) build: Box<dyn FnOnce(Placement) -> Box<dyn ErasedIndex<E>>>,
}

impl<E: 'static, K: Key> From<KeyConfig<E, K>> for IndexBuilder<E> {
    fn from(config: KeyConfig<E, K>) -> IndexBuilder<E> {
        let problem = if config.sorted && config.comparator.is_none() {
            Some("sorted index without comparator")
        } else {
            None
        };
        return IndexBuilder {
            order_by: config.order_by,
            sorted: config.comparator.is_some(),
            problem,
            build: Box::new(move |placement: Placement| -> Box<dyn ErasedIndex<E>> {
                let mut config = config;
                if let Some(allow_null) = placement.allow_null {
                    config.allow_null = allow_null;
                }
                return Box::new(KeyIndex::new(config, placement));
            }),
        };
    }
}

/// A keyed collection.
///
/// Index 0 is the element key, the element itself used as its own key; it
/// also decides what a null element is. Indexes 1.. are added with
/// [`with_key`](KeyedConfig::with_key).
pub struct KeyedConfig<E> {
    /// Elements whose element key is null are accepted.
    pub allow_null: bool,
    pub constraint: Option<Predicate<E>>,
    pub before_insert: Option<Hook<E>>,
    pub after_insert: Option<Observer<E>>,
    pub before_delete: Option<Hook<E>>,
    pub after_delete: Option<Observer<E>>,
    /// Initial elements, added in order when the collection is built.
    pub content: Vec<E>,
    pub initial_capacity: usize,
    pub max_size: Option<usize>,
    /// When full, appending evicts the first element instead of failing.
    pub moving_window: bool,
    pub element_key: Option<IndexBuilder<E>>,
    pub keys: Vec<IndexBuilder<E>>,
}

impl<E> Default for KeyedConfig<E> {
    fn default() -> KeyedConfig<E> {
        return KeyedConfig {
            allow_null: true,
            constraint: None,
            before_insert: None,
            after_insert: None,
            before_delete: None,
            after_delete: None,
            content: Vec::new(),
            initial_capacity: 0,
            max_size: None,
            moving_window: false,
            element_key: None,
            keys: Vec::new(),
        };
    }
}

impl<E: 'static> KeyedConfig<E> {
    pub fn new() -> KeyedConfig<E> {
        return KeyedConfig::default();
    }

    /// Sets index 0.
    pub fn with_element_key(mut self, config: KeyConfig<E, E>) -> KeyedConfig<E>
    where
        E: Hash + Eq + Clone,
    {
        self.element_key = Some(config.into());
        return self;
    }

    /// Appends the next index, numbered from 1.
    pub fn with_key<K: Key>(mut self, config: KeyConfig<E, K>) -> KeyedConfig<E> {
        self.keys.push(config.into());
        return self;
    }

    pub fn with_constraint(mut self, constraint: impl Fn(&E) -> bool + 'static) -> KeyedConfig<E> {
        self.constraint = Some(Rc::new(constraint));
        return self;
    }

    pub fn with_max_size(mut self, max_size: usize, moving_window: bool) -> KeyedConfig<E> {
        self.max_size = Some(max_size);
        self.moving_window = moving_window;
        return self;
    }
}
