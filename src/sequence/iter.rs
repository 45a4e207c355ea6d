//! Iterators and the editing cursor.

use std::iter::FusedIterator;
use std::ops::Range;
use std::slice;

use smallvec::SmallVec;

use crate::error::Error;
use crate::error::Result;
use super::gap::GapSequence;

/// Borrowing iterator in logical order.
pub struct Iter<'a, T> {
    seq: &'a GapSequence<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let item = self.seq.get(self.front);
        self.front += 1;
        return item;
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        return (len, Some(len));
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        return self.seq.get(self.back);
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator in logical order.
///
/// Walks the at most four physical runs that make up the live range: the
/// part before the gap and the part after it, each possibly split by the end
/// of the buffer.
pub struct IterMut<'a, T> {
    /// Runs in reverse logical order, so the next run is popped off the end.
    runs: SmallVec<[slice::IterMut<'a, Option<T>>; 4]>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        loop {
            let run = self.runs.last_mut()?;
            match run.next() {
                Some(slot) => return slot.as_mut(),
                None => {
                    self.runs.pop();
                }
            }
        }
    }
}

/// Owning iterator, produced by `into_iter()`.
pub struct IntoIter<T> {
    seq: GapSequence<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        return self.seq.pop_front();
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.seq.len(), Some(self.seq.len()));
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        return self.seq.pop_back();
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

/// Forward cursor that can remove the element it last returned or insert
/// in front of the next one, without invalidating its position.
pub struct CursorMut<'a, T> {
    seq: &'a mut GapSequence<T>,
    next: usize,
    current: Option<usize>,
}

impl<'a, T> CursorMut<'a, T> {
    /// Advances and returns the next element.
    pub fn next(&mut self) -> Option<&mut T> {
        if self.next >= self.seq.len() {
            self.current = None;
            return None;
        }
        let index = self.next;
        self.current = Some(index);
        self.next += 1;
        return self.seq.get_mut(index);
    }

    /// Logical position of the element returned by the last `next`.
    pub fn index(&self) -> Option<usize> {
        return self.current;
    }

    /// Removes the element returned by the last `next`.
    pub fn remove(&mut self) -> Result<T> {
        let index = self.current.take().ok_or(Error::Unsupported("cursor has no current element"))?;
        let value = self.seq.remove(index)?;
        if self.next > index {
            self.next -= 1;
        }
        return Ok(value);
    }

    /// Inserts in front of the element the next `next` would return. The new
    /// element is skipped by the cursor.
    pub fn insert(&mut self, value: T) {
        self.seq.insert_unchecked(self.next, value);
        self.next += 1;
        self.current = None;
    }
}

/// Backward cursor. `prev` walks from the last element to the first and
/// `remove` deletes the element it last returned.
pub struct CursorBackMut<'a, T> {
    seq: &'a mut GapSequence<T>,
    /// One past the logical position `prev` returns next.
    back: usize,
    current: Option<usize>,
}

impl<'a, T> CursorBackMut<'a, T> {
    /// Steps back and returns the previous element.
    pub fn prev(&mut self) -> Option<&mut T> {
        if self.back == 0 {
            self.current = None;
            return None;
        }
        self.back -= 1;
        self.current = Some(self.back);
        return self.seq.get_mut(self.back);
    }

    /// Logical position of the element returned by the last `prev`.
    pub fn index(&self) -> Option<usize> {
        return self.current;
    }

    /// Removes the element returned by the last `prev`. Everything still
    /// ahead of the cursor lies before it, so `back` stays put.
    pub fn remove(&mut self) -> Result<T> {
        let index = self.current.take().ok_or(Error::Unsupported("cursor has no current element"))?;
        return self.seq.remove(index);
    }
}

impl<T> GapSequence<T> {
    pub fn iter(&self) -> Iter<'_, T> {
        return Iter { seq: self, front: 0, back: self.len() };
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let runs = self.runs();
        let mut pieces = split_runs(&mut self.slots, &runs);
        pieces.reverse();
        return IterMut { runs: pieces.into_iter().map(|piece| piece.iter_mut()).collect() };
    }

    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        return CursorMut { seq: self, next: 0, current: None };
    }

    pub fn cursor_back_mut(&mut self) -> CursorBackMut<'_, T> {
        let back = self.len();
        return CursorBackMut { seq: self, back, current: None };
    }

    /// Clones the elements into a `Vec` in logical order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        return self.iter().cloned().collect();
    }

    /// Physical ranges holding the live elements, in logical order.
    fn runs(&self) -> SmallVec<[Range<usize>; 4]> {
        let mut runs = SmallVec::new();
        let capacity = self.capacity();
        let (head, tail) = if self.gap_size == 0 {
            (0..self.size, self.size..self.size)
        } else {
            (0..self.gap_index, self.gap_index + self.gap_size..self.size + self.gap_size)
        };
        for ring in [head, tail] {
            if ring.is_empty() {
                continue;
            }
            let from = self.ring_phys(ring.start);
            let len = ring.len();
            if from + len <= capacity {
                runs.push(from..from + len);
            } else {
                runs.push(from..capacity);
                runs.push(0..len - (capacity - from));
            }
        }
        return runs;
    }
}

/// Splits `slots` into disjoint mutable pieces, one per range, returned in
/// the order of `ranges`. The ranges must not overlap.
fn split_runs<'a, T>(slots: &'a mut [Option<T>], ranges: &[Range<usize>]) -> SmallVec<[&'a mut [Option<T>]; 4]> {
    let mut order: SmallVec<[usize; 4]> = (0..ranges.len()).collect();
    order.sort_by_key(|&i| ranges[i].start);

    let mut pieces: SmallVec<[(usize, &'a mut [Option<T>]); 4]> = SmallVec::new();
    let mut rest = slots;
    let mut offset = 0;
    for i in order {
        let range = &ranges[i];
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(range.start - offset);
        let (piece, tail) = tail.split_at_mut(range.len());
        pieces.push((i, piece));
        rest = tail;
        offset = range.end;
    }
    pieces.sort_by_key(|(i, _)| *i);
    return pieces.into_iter().map(|(_, piece)| piece).collect();
}

impl<T> IntoIterator for GapSequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        return IntoIter { seq: self };
    }
}

impl<'a, T> IntoIterator for &'a GapSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

impl<'a, T> IntoIterator for &'a mut GapSequence<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        return self.iter_mut();
    }
}

#[cfg(test)]
mod tests {
    use crate::sequence::GapSequence;

    fn wrapped_with_gap() -> GapSequence<i32> {
        let mut seq = GapSequence::with_capacity(8);
        for v in (0..6).rev() {
            seq.push_front(v);
        }
        seq.insert(3, 99).unwrap();
        seq.remove(3).unwrap();
        return seq;
    }

    #[test]
    fn iterates_in_logical_order() {
        let seq = wrapped_with_gap();
        assert!(seq.layout().gap_size > 0);
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(seq.iter().rev().copied().collect::<Vec<_>>(), vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(seq.iter().len(), 6);
    }

    #[test]
    fn iter_mut_visits_every_run() {
        let mut seq = wrapped_with_gap();
        for v in seq.iter_mut() {
            *v *= 10;
        }
        assert_eq!(seq.to_vec(), vec![0, 10, 20, 30, 40, 50]);
        seq.check_invariants().unwrap();
    }

    #[test]
    fn into_iter_drains() {
        let seq = wrapped_with_gap();
        let back: Vec<i32> = seq.into_iter().rev().collect();
        assert_eq!(back, vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn cursor_removes_current() {
        let mut seq: GapSequence<i32> = (0..6).collect();
        let mut cursor = seq.cursor_mut();
        while let Some(v) = cursor.next() {
            if *v % 2 == 0 {
                cursor.remove().unwrap();
            }
        }
        assert!(cursor.remove().is_err());
        assert_eq!(seq.to_vec(), vec![1, 3, 5]);
    }

    #[test]
    fn cursor_inserts_ahead() {
        let mut seq: GapSequence<i32> = (0..3).collect();
        let mut cursor = seq.cursor_mut();
        cursor.next();
        cursor.insert(10);
        assert_eq!(cursor.next().copied(), Some(1));
        assert_eq!(cursor.index(), Some(2));
        assert_eq!(seq.to_vec(), vec![0, 10, 1, 2]);
    }

    #[test]
    fn back_cursor_removes_across_wrap_and_gap() {
        let mut seq = wrapped_with_gap();
        assert!(seq.layout().gap_size > 0);
        let mut seen = Vec::new();
        let mut cursor = seq.cursor_back_mut();
        while let Some(v) = cursor.prev() {
            seen.push(*v);
            if *v % 3 == 0 {
                let index = cursor.index().unwrap();
                assert_eq!(cursor.remove().unwrap(), index as i32);
                assert!(cursor.remove().is_err());
            }
        }
        assert_eq!(cursor.index(), None);
        assert_eq!(seen, vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(seq.to_vec(), vec![1, 2, 4, 5]);
        seq.check_invariants().unwrap();
    }

    #[test]
    fn back_cursor_edits_in_place() {
        let mut seq: GapSequence<i32> = (0..4).collect();
        let mut cursor = seq.cursor_back_mut();
        *cursor.prev().unwrap() += 100;
        assert_eq!(cursor.index(), Some(3));
        cursor.prev();
        cursor.remove().unwrap();
        assert_eq!(cursor.prev().copied(), Some(1));
        assert_eq!(seq.to_vec(), vec![0, 1, 103]);
    }
}
