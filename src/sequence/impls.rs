use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Index;
use std::ops::IndexMut;

use super::gap::empty_slots;
use super::gap::GapSequence;

impl<T> Default for GapSequence<T> {
    fn default() -> GapSequence<T> {
        return GapSequence::new();
    }
}

/// Clones into a normalized buffer sized to fit, without the gap.
impl<T: Clone> Clone for GapSequence<T> {
    fn clone(&self) -> GapSequence<T> {
        let mut slots = empty_slots(self.len());
        for (slot, value) in slots.iter_mut().zip(self.iter()) {
            *slot = Some(value.clone());
        }
        return GapSequence { slots, start: 0, size: self.len(), gap_size: 0, gap_index: 0 };
    }
}

impl<T: fmt::Debug> fmt::Debug for GapSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_list().entries(self.iter()).finish();
    }
}

impl<T: PartialEq> PartialEq for GapSequence<T> {
    fn eq(&self, other: &GapSequence<T>) -> bool {
        return self.len() == other.len() && self.iter().eq(other.iter());
    }
}

impl<T: Eq> Eq for GapSequence<T> {}

impl<T: Hash> Hash for GapSequence<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<T> Index<usize> for GapSequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => return value,
            None => panic!("index {index} out of range for length {}", self.len()),
        }
    }
}

impl<T> IndexMut<usize> for GapSequence<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(value) => return value,
            None => panic!("index {index} out of range for length {len}"),
        }
    }
}

impl<T> From<Vec<T>> for GapSequence<T> {
    fn from(values: Vec<T>) -> GapSequence<T> {
        let size = values.len();
        let slots = values.into_iter().map(Some).collect();
        return GapSequence { slots, start: 0, size, gap_size: 0, gap_index: 0 };
    }
}

impl<T> FromIterator<T> for GapSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> GapSequence<T> {
        return GapSequence::from(iter.into_iter().collect::<Vec<T>>());
    }
}

impl<T> Extend<T> for GapSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(self.len() + iter.size_hint().0);
        for value in iter {
            self.push_back(value);
        }
    }
}
