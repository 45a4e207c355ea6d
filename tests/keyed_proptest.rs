//! Property-based tests: keyed sequences against a plain `Vec` model.
//!
//! Elements are `(id, group)` pairs. `id` is unique, `group` is a sorted
//! multimap key. Every op either succeeds on both sides or is rejected and
//! leaves the keyed list untouched.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use gapkey::Error;
use gapkey::KeyConfig;
use gapkey::KeyedAccess;
use gapkey::KeyedCollection;
use gapkey::KeyedConfig;
use gapkey::KeyedSequence;

type Pair = (u8, u8);

// =============================================================================
// Test helpers
// =============================================================================

#[derive(Clone, Debug)]
enum Op {
    Add(Pair),
    Insert { pos_pct: f64, elem: Pair },
    Remove { pos_pct: f64 },
    Set { pos_pct: f64, elem: Pair },
    RemoveGroup(u8),
    PutById(Pair),
}

fn pair() -> impl Strategy<Value = Pair> {
    return (0u8..24, 0u8..6);
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => pair().prop_map(Op::Add),
        2 => (0.0..=1.0f64, pair()).prop_map(|(pos_pct, elem)| Op::Insert { pos_pct, elem }),
        2 => (0.0..=1.0f64).prop_map(|pos_pct| Op::Remove { pos_pct }),
        2 => (0.0..=1.0f64, pair()).prop_map(|(pos_pct, elem)| Op::Set { pos_pct, elem }),
        1 => (0u8..6).prop_map(Op::RemoveGroup),
        1 => pair().prop_map(Op::PutById),
    ]
}

fn config(ordered: bool) -> KeyedConfig<Pair> {
    let mut group = KeyConfig::new(|p: &Pair| Some(p.1)).sorted();
    group.order_by = ordered;
    return KeyedConfig::new()
        .with_key(KeyConfig::primary(|p: &Pair| Some(p.0)))
        .with_key(group);
}

fn pick(len: usize, pct: f64) -> usize {
    return ((pct * len as f64) as usize).min(len);
}

fn has_id(model: &[Pair], id: u8, skip: Option<usize>) -> bool {
    return model.iter().enumerate().any(|(at, p)| p.0 == id && Some(at) != skip);
}

/// Where a group-ordered list puts a new element: after its equal keys.
fn sorted_slot(model: &[Pair], elem: Pair) -> usize {
    return model.partition_point(|p| p.1 <= elem.1);
}

fn fits(model: &[Pair], at: usize, elem: Pair, replacing: bool) -> bool {
    let before = at.checked_sub(1).map(|i| model[i]);
    let after = if replacing { model.get(at + 1) } else { model.get(at) };
    return before.is_none_or(|p| p.1 <= elem.1) && after.is_none_or(|p| elem.1 <= p.1);
}

fn apply(list: &mut KeyedSequence<Pair>, model: &mut Vec<Pair>, ordered: bool, op: &Op) {
    let len = model.len();
    match op {
        Op::Add(elem) => {
            let result = list.add(*elem);
            if has_id(model, elem.0, None) {
                assert_eq!(result, Err(Error::DuplicateKey { index: 1 }));
                return;
            }
            result.unwrap();
            let at = if ordered { sorted_slot(model, *elem) } else { len };
            model.insert(at, *elem);
        }
        Op::Insert { pos_pct, elem } => {
            let at = pick(len, *pos_pct);
            let result = list.insert(at, *elem);
            if has_id(model, elem.0, None) {
                assert!(result.is_err());
                return;
            }
            if ordered && !fits(model, at, *elem, false) {
                assert_eq!(result, Err(Error::InvalidSortedIndex { index: at }));
                return;
            }
            assert_eq!(result, Ok(true));
            model.insert(at, *elem);
        }
        Op::Remove { pos_pct } => {
            if len == 0 {
                assert!(list.remove(0).is_err());
                return;
            }
            let at = pick(len - 1, *pos_pct);
            assert_eq!(list.remove(at).unwrap(), model.remove(at));
        }
        Op::Set { pos_pct, elem } => {
            if len == 0 {
                return;
            }
            let at = pick(len - 1, *pos_pct);
            let result = list.set(at, *elem);
            let clash = has_id(model, elem.0, Some(at));
            if clash || (ordered && !fits(model, at, *elem, true)) {
                assert!(result.is_err());
                return;
            }
            assert_eq!(result.unwrap(), std::mem::replace(&mut model[at], *elem));
        }
        Op::RemoveGroup(group) => {
            let removed = list.remove_all_by_key(2, Some(group)).unwrap();
            let before = model.len();
            model.retain(|p| p.1 != *group);
            assert_eq!(removed.len(), before - model.len());
            assert!(removed.iter().all(|p| p.1 == *group));
        }
        Op::PutById(elem) => {
            let found = model.iter().position(|p| p.0 == elem.0);
            let result = list.put_by_key::<u8>(1, *elem);
            match found {
                Some(at) if !ordered || fits(model, at, *elem, true) => {
                    assert_eq!(result.unwrap(), Some(std::mem::replace(&mut model[at], *elem)));
                }
                Some(_) => assert!(result.is_err()),
                None => {
                    assert_eq!(result.unwrap(), None);
                    let at = if ordered { sorted_slot(model, *elem) } else { len };
                    model.insert(at, *elem);
                }
            }
        }
    }
}

// =============================================================================
// Elements mutated in place
// =============================================================================

/// An element whose keys live in shared cells, so they can change while the
/// element sits in the list.
#[derive(Clone, Debug)]
struct Tagged {
    id: u8,
    group: Rc<Cell<u8>>,
    code: Rc<Cell<Option<u8>>>,
}

/// `(id, group, code)` as currently seen through the cells.
type Snapshot = (u8, u8, Option<u8>);

#[derive(Clone, Debug)]
enum CellOp {
    Add { group: u8, code: Option<u8> },
    Remove { pos_pct: f64 },
    /// Changes the group cell, then re-files through `invalidate` or, with
    /// `by_key`, through `invalidate_key` on the group index.
    Regroup { pos_pct: f64, group: u8, by_key: bool },
    /// Changes the unique code cell, then re-files through `invalidate`.
    Recode { pos_pct: f64, code: Option<u8> },
}

fn arbitrary_cell_op() -> impl Strategy<Value = CellOp> {
    let code = prop::option::of(0u8..8);
    prop_oneof![
        3 => (0u8..6, code.clone()).prop_map(|(group, code)| CellOp::Add { group, code }),
        1 => (0.0..=1.0f64).prop_map(|pos_pct| CellOp::Remove { pos_pct }),
        3 => (0.0..=1.0f64, 0u8..6, any::<bool>())
            .prop_map(|(pos_pct, group, by_key)| CellOp::Regroup { pos_pct, group, by_key }),
        2 => (0.0..=1.0f64, code).prop_map(|(pos_pct, code)| CellOp::Recode { pos_pct, code }),
    ]
}

/// id: primary, group: sorted multimap, code: unique with nulls.
fn cell_config(ordered: bool) -> KeyedConfig<Tagged> {
    let mut group = KeyConfig::new(|t: &Tagged| Some(t.group.get())).sorted();
    group.order_by = ordered;
    return KeyedConfig::new()
        .with_key(KeyConfig::primary(|t: &Tagged| Some(t.id)))
        .with_key(group)
        .with_key(KeyConfig::unique(|t: &Tagged| t.code.get()));
}

fn snapshot(list: &KeyedSequence<Tagged>) -> Vec<Snapshot> {
    return list.iter().map(|t| (t.id, t.group.get(), t.code.get())).collect();
}

fn code_taken(model: &[Snapshot], code: Option<u8>, skip: Option<usize>) -> bool {
    return code.is_some() && model.iter().enumerate().any(|(at, s)| s.2 == code && Some(at) != skip);
}

/// Where an element regrouped at `at` ends up: in place if it still fits
/// between its neighbours, else after the elements of its new group.
fn regrouped_slot(model: &[Snapshot], at: usize, group: u8) -> usize {
    let before = at.checked_sub(1).map(|i| model[i].1);
    let after = model.get(at).map(|s| s.1);
    if before.is_none_or(|g| g <= group) && after.is_none_or(|g| group <= g) {
        return at;
    }
    return model.partition_point(|s| s.1 <= group);
}

fn apply_cell(list: &mut KeyedSequence<Tagged>, model: &mut Vec<Snapshot>, ordered: bool, next_id: &mut u8, op: &CellOp) {
    let len = model.len();
    match op {
        CellOp::Add { group, code } => {
            let id = *next_id;
            *next_id += 1;
            let elem = Tagged { id, group: Rc::new(Cell::new(*group)), code: Rc::new(Cell::new(*code)) };
            let result = list.add(elem);
            if code_taken(model, *code, None) {
                assert_eq!(result.err(), Some(Error::DuplicateKey { index: 3 }));
                return;
            }
            result.unwrap();
            let at = if ordered { model.partition_point(|s| s.1 <= *group) } else { len };
            model.insert(at, (id, *group, *code));
        }
        CellOp::Remove { pos_pct } => {
            if len == 0 {
                return;
            }
            let at = pick(len - 1, *pos_pct);
            let removed = list.remove(at).unwrap();
            assert_eq!(removed.id, model.remove(at).0);
        }
        CellOp::Regroup { pos_pct, group, by_key } => {
            if len == 0 {
                return;
            }
            let at = pick(len - 1, *pos_pct);
            let elem = list.get(at).unwrap();
            let old = elem.group.replace(*group);
            let moved_to = if *by_key {
                list.invalidate_key::<u8>(2, at, Some(&old)).unwrap()
            } else {
                list.invalidate(at).unwrap()
            };
            let mut entry = model.remove(at);
            entry.1 = *group;
            let target = if ordered { regrouped_slot(model, at, *group) } else { at };
            assert_eq!(moved_to, target);
            model.insert(target, entry);
        }
        CellOp::Recode { pos_pct, code } => {
            if len == 0 {
                return;
            }
            let at = pick(len - 1, *pos_pct);
            let cell = list.get(at).unwrap().code.clone();
            let old = cell.replace(*code);
            let result = list.invalidate(at);
            if code_taken(model, *code, Some(at)) {
                assert_eq!(result, Err(Error::DuplicateKey { index: 3 }));
                // the indexes still hold the old code
                cell.set(old);
                return;
            }
            assert_eq!(result, Ok(at));
            model[at].2 = *code;
        }
    }
}

// =============================================================================
// Model properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Contents, order and every index agree with the model after each op.
    #[test]
    fn matches_vec_model(
        ordered in any::<bool>(),
        ops in prop::collection::vec(arbitrary_op(), 1..100),
    ) {
        let mut list = KeyedSequence::with_config(config(ordered)).unwrap();
        let mut model = Vec::new();
        for op in &ops {
            apply(&mut list, &mut model, ordered, op);
            prop_assert!(list.check_consistency().is_ok(), "after {:?}", op);
            prop_assert_eq!(list.to_vec(), model.clone());
        }
        for group in 0u8..6 {
            let expected = model.iter().filter(|p| p.1 == group).count();
            prop_assert_eq!(list.count_by_key(2, Some(&group)).unwrap(), expected);
        }
        for (at, p) in model.iter().enumerate() {
            prop_assert_eq!(list.get_by_key(1, Some(&p.0)).unwrap(), Some(p));
            prop_assert_eq!(list.index_of_key(1, Some(&p.0)).unwrap(), Some(at));
        }
    }

    /// A copy diverges from its source without affecting it.
    #[test]
    fn copy_independent(
        ordered in any::<bool>(),
        ops in prop::collection::vec(arbitrary_op(), 1..40),
        more in prop::collection::vec(arbitrary_op(), 1..40),
    ) {
        let mut list = KeyedSequence::with_config(config(ordered)).unwrap();
        let mut model = Vec::new();
        for op in &ops {
            apply(&mut list, &mut model, ordered, op);
        }
        let snapshot = model.clone();
        let mut copy = list.copy();
        let mut copy_model = model.clone();
        for op in &more {
            apply(&mut copy, &mut copy_model, ordered, op);
        }
        prop_assert_eq!(list.to_vec(), snapshot);
        prop_assert_eq!(copy.to_vec(), copy_model);
        prop_assert!(list.check_consistency().is_ok());
        prop_assert!(copy.check_consistency().is_ok());
    }

    /// A standalone collection with a unique key behaves like a map.
    #[test]
    fn collection_matches_map(elems in prop::collection::vec(pair(), 0..60)) {
        let config = KeyedConfig::new().with_key(KeyConfig::unique(|p: &Pair| Some(p.0)));
        let mut set = KeyedCollection::with_config(config).unwrap();
        let mut model = std::collections::HashMap::new();
        for elem in &elems {
            let added = set.try_add(*elem);
            prop_assert_eq!(added, !model.contains_key(&elem.0));
            model.entry(elem.0).or_insert(elem.1);
        }
        prop_assert_eq!(set.len(), model.len());
        for (id, group) in &model {
            prop_assert_eq!(set.get_by_key(1, Some(id)).unwrap(), Some(&(*id, *group)));
        }
        prop_assert!(set.check_consistency().is_ok());
    }

    /// Keys changed in place and re-filed with `invalidate` keep every
    /// index consistent and findable.
    #[test]
    fn invalidate_keeps_indexes_consistent(
        ordered in any::<bool>(),
        ops in prop::collection::vec(arbitrary_cell_op(), 1..80),
    ) {
        let mut list = KeyedSequence::with_config(cell_config(ordered)).unwrap();
        let mut model: Vec<Snapshot> = Vec::new();
        let mut next_id = 0u8;
        for op in &ops {
            apply_cell(&mut list, &mut model, ordered, &mut next_id, op);
            prop_assert!(list.check_consistency().is_ok(), "after {:?}", op);
            prop_assert_eq!(snapshot(&list), model.clone());
            for (id, _, code) in &model {
                prop_assert_eq!(list.get_by_key(1, Some(id)).unwrap().map(|t| t.id), Some(*id));
                if code.is_some() {
                    prop_assert_eq!(list.get_by_key(3, code.as_ref()).unwrap().map(|t| t.id), Some(*id));
                }
            }
            for group in 0u8..6 {
                let expected = model.iter().filter(|s| s.1 == group).count();
                prop_assert_eq!(list.count_by_key(2, Some(&group)).unwrap(), expected);
            }
        }
    }
}
