//! The `Sequence` trait and a read-only view.

use crate::error::Error;
use crate::error::Result;
use super::gap::GapSequence;
use super::iter::Iter;

/// Positional access shared by sequences and views of them.
pub trait Sequence<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    fn get(&self, index: usize) -> Option<&T>;

    fn set(&mut self, index: usize, value: T) -> Result<T>;

    fn insert(&mut self, index: usize, value: T) -> Result<()>;

    fn remove(&mut self, index: usize) -> Result<T>;

    fn clear(&mut self) -> Result<()>;

    fn push(&mut self, value: T) -> Result<()> {
        let len = self.len();
        return self.insert(len, value);
    }

    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        return (0..self.len()).filter_map(|i| self.get(i).cloned()).collect();
    }
}

impl<T> Sequence<T> for GapSequence<T> {
    fn len(&self) -> usize {
        return GapSequence::len(self);
    }

    fn get(&self, index: usize) -> Option<&T> {
        return GapSequence::get(self, index);
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        return GapSequence::set(self, index, value);
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        return GapSequence::insert(self, index, value);
    }

    fn remove(&mut self, index: usize) -> Result<T> {
        return GapSequence::remove(self, index);
    }

    fn clear(&mut self) -> Result<()> {
        GapSequence::clear(self);
        return Ok(());
    }
}

/// Read-through view that refuses every mutation.
pub struct ReadOnly<'a, T> {
    inner: &'a GapSequence<T>,
}

impl<'a, T> ReadOnly<'a, T> {
    pub fn iter(&self) -> Iter<'a, T> {
        return self.inner.iter();
    }
}

impl<T> GapSequence<T> {
    pub fn read_only(&self) -> ReadOnly<'_, T> {
        return ReadOnly { inner: self };
    }
}

impl<T> Sequence<T> for ReadOnly<'_, T> {
    fn len(&self) -> usize {
        return self.inner.len();
    }

    fn get(&self, index: usize) -> Option<&T> {
        return self.inner.get(index);
    }

    fn set(&mut self, _index: usize, _value: T) -> Result<T> {
        return Err(Error::Unsupported("read-only sequence"));
    }

    fn insert(&mut self, _index: usize, _value: T) -> Result<()> {
        return Err(Error::Unsupported("read-only sequence"));
    }

    fn remove(&mut self, _index: usize) -> Result<T> {
        return Err(Error::Unsupported("read-only sequence"));
    }

    fn clear(&mut self) -> Result<()> {
        return Err(Error::Unsupported("read-only sequence"));
    }
}
