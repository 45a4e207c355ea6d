//! Property-based tests: the gap sequence against `Vec` as a model.

use proptest::prelude::*;
use gapkey::GapSequence;

// =============================================================================
// Test helpers
// =============================================================================

/// One positional edit. Positions are fractions of the current length so
/// that every generated op applies.
#[derive(Clone, Debug)]
enum Op {
    Insert { pos_pct: f64, value: i32 },
    Remove { pos_pct: f64 },
    RemoveRange { pos_pct: f64, len_pct: f64 },
    PushFront(i32),
    PopBack,
    Rotate { distance: isize },
    Set { pos_pct: f64, value: i32 },
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0.0..=1.0f64, any::<i32>()).prop_map(|(pos_pct, value)| Op::Insert { pos_pct, value }),
        3 => (0.0..=1.0f64).prop_map(|pos_pct| Op::Remove { pos_pct }),
        1 => (0.0..=1.0f64, 0.0..=0.5f64).prop_map(|(pos_pct, len_pct)| Op::RemoveRange { pos_pct, len_pct }),
        1 => any::<i32>().prop_map(Op::PushFront),
        1 => Just(Op::PopBack),
        1 => (-20isize..20).prop_map(|distance| Op::Rotate { distance }),
        1 => (0.0..=1.0f64, any::<i32>()).prop_map(|(pos_pct, value)| Op::Set { pos_pct, value }),
    ]
}

fn pick(len: usize, pct: f64) -> usize {
    return ((pct * len as f64) as usize).min(len);
}

fn apply(seq: &mut GapSequence<i32>, model: &mut Vec<i32>, op: &Op) {
    let len = model.len();
    match op {
        Op::Insert { pos_pct, value } => {
            let pos = pick(len, *pos_pct);
            seq.insert(pos, *value).unwrap();
            model.insert(pos, *value);
        }
        Op::Remove { pos_pct } => {
            if len == 0 {
                assert!(seq.remove(0).is_err());
                return;
            }
            let pos = pick(len - 1, *pos_pct);
            assert_eq!(seq.remove(pos).unwrap(), model.remove(pos));
        }
        Op::RemoveRange { pos_pct, len_pct } => {
            let pos = pick(len, *pos_pct);
            let count = pick(len - pos, *len_pct);
            seq.remove_range(pos, count).unwrap();
            model.drain(pos..pos + count);
        }
        Op::PushFront(value) => {
            seq.push_front(*value);
            model.insert(0, *value);
        }
        Op::PopBack => {
            assert_eq!(seq.pop_back(), model.pop());
        }
        Op::Rotate { distance } => {
            seq.rotate(0, len, *distance).unwrap();
            if len > 0 {
                let shift = distance.rem_euclid(len as isize) as usize;
                model.rotate_right(shift);
            }
        }
        Op::Set { pos_pct, value } => {
            if len == 0 {
                return;
            }
            let pos = pick(len - 1, *pos_pct);
            assert_eq!(seq.set(pos, *value).unwrap(), std::mem::replace(&mut model[pos], *value));
        }
    }
}

// =============================================================================
// Model properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every op sequence leaves the same contents as `Vec` and a sound layout.
    #[test]
    fn matches_vec_model(
        capacity in 0usize..12,
        ops in prop::collection::vec(arbitrary_op(), 1..120),
    ) {
        let mut seq = GapSequence::with_capacity(capacity);
        let mut model = Vec::new();
        for op in &ops {
            apply(&mut seq, &mut model, op);
            prop_assert!(seq.check_invariants().is_ok(), "after {:?}: {:?}", op, seq.layout());
            prop_assert_eq!(seq.len(), model.len());
        }
        prop_assert_eq!(seq.to_vec(), model.clone());
        prop_assert_eq!(seq.iter().rev().copied().collect::<Vec<_>>(), model.iter().rev().copied().collect::<Vec<_>>());
    }

    /// The gap never touches either end of the live range.
    #[test]
    fn gap_stays_interior(ops in prop::collection::vec(arbitrary_op(), 1..80)) {
        let mut seq = GapSequence::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(&mut seq, &mut model, op);
            let layout = seq.layout();
            if layout.gap_size > 0 {
                prop_assert!(layout.gap_index > 0 && layout.gap_index < layout.size);
            }
        }
    }

    /// Normalizing twice leaves the same physical layout as once.
    #[test]
    fn normalize_idempotent(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        let mut seq = GapSequence::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(&mut seq, &mut model, op);
        }
        seq.normalize();
        let once = seq.layout();
        prop_assert!(once.is_normalized());
        seq.normalize();
        prop_assert_eq!(seq.layout(), once);
        prop_assert_eq!(seq.to_vec(), model);
    }

    /// Mutating a clone never shows through to the original.
    #[test]
    fn clone_independent(
        ops in prop::collection::vec(arbitrary_op(), 1..40),
        more in prop::collection::vec(arbitrary_op(), 1..40),
    ) {
        let mut seq = GapSequence::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(&mut seq, &mut model, op);
        }
        let snapshot = model.clone();
        let mut copy = seq.clone();
        let mut copy_model = model.clone();
        for op in &more {
            apply(&mut copy, &mut copy_model, op);
        }
        prop_assert_eq!(seq.to_vec(), snapshot);
        prop_assert_eq!(copy.to_vec(), copy_model);
    }

    /// Sorting and searching agree with the slice versions.
    #[test]
    fn sort_then_search(values in prop::collection::vec(-50i32..50, 0..60), probe in -60i32..60) {
        let mut seq: GapSequence<i32> = GapSequence::new();
        for v in &values {
            seq.push_front(*v);
        }
        if seq.len() > 2 {
            seq.insert(1, 0).unwrap();
            seq.remove(1).unwrap();
        }
        seq.sort();
        let mut sorted = values.clone();
        sorted.sort();
        prop_assert_eq!(seq.to_vec(), sorted.clone());
        match (seq.binary_search(&probe), sorted.binary_search(&probe)) {
            (Ok(a), Ok(b)) => prop_assert_eq!(sorted[a], sorted[b]),
            (a, b) => prop_assert_eq!(a, b),
        }
    }
}
