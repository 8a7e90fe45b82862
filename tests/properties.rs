//! Property tests for the ordered collections.
//!
//! Every test drives a map through a random sequence of operations and checks it against a
//! reference model: a `BTreeMap` from each key to its values, in insertion order.

use std::collections::BTreeMap;

use ordered_collections::collections::tree::{
    KeyPolicy, OrderedMultiMap, Position, TreeMap, TreeMultiMap,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::Index;

type Model = BTreeMap<u8, Vec<u16>>;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u16),
    InsertHint(Index, u8, u16),
    Remove(u8),
    EraseAt(Index),
    EraseRange(Index, Index),
    ExtractKey(u8),
    Retain(u8),
    Merge(Vec<(u8, u16)>),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0_u8..24, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (any::<Index>(), 0_u8..24, any::<u16>())
            .prop_map(|(hint, k, v)| Op::InsertHint(hint, k, v)),
        1 => (0_u8..24).prop_map(Op::Remove),
        1 => any::<Index>().prop_map(Op::EraseAt),
        1 => (any::<Index>(), any::<Index>()).prop_map(|(a, b)| Op::EraseRange(a, b)),
        1 => (0_u8..24).prop_map(Op::ExtractKey),
        1 => any::<u8>().prop_map(Op::Retain),
        1 => vec((0_u8..24, any::<u16>()), 0..8).prop_map(Op::Merge),
    ]
}

fn entries() -> impl Strategy<Value = Vec<(u8, u16)>> {
    vec((0_u8..16, any::<u16>()), 0..64)
}

fn flatten(model: &Model) -> Vec<(u8, u16)> {
    model
        .iter()
        .flat_map(|(k, vs)| vs.iter().map(move |v| (*k, *v)))
        .collect()
}

fn collect<P: KeyPolicy>(map: &OrderedMultiMap<u8, u16, P>) -> Vec<(u8, u16)> {
    map.iter().map(|(k, v)| (*k, *v)).collect()
}

fn unflatten(entries: Vec<(u8, u16)>) -> Model {
    let mut model = Model::new();
    for (key, value) in entries {
        model.entry(key).or_default().push(value);
    }
    model
}

/// Keeps the entries whose key, mixed with `salt`, isn't a multiple of three.
fn kept(key: u8, salt: u8) -> bool {
    (key ^ salt) % 3 != 0
}

/// Returns the position `offset` steps after the first entry, which is the end at `map.len()`.
fn nth_position<P: KeyPolicy>(map: &OrderedMultiMap<u8, u16, P>, offset: usize) -> Position {
    let mut position = map.begin();
    for _ in 0..offset {
        position = map.successor(position);
    }
    position
}

/// Inserts into the model the way a map with the same policy would.
fn model_insert(model: &mut Model, duplicates: bool, key: u8, value: u16) {
    if duplicates {
        model.entry(key).or_default().push(value);
    } else {
        model.entry(key).or_insert_with(|| vec![value]);
    }
}

fn sorted(mut entries: Vec<(u8, u16)>) -> Vec<(u8, u16)> {
    entries.sort_unstable();
    entries
}

/// Applies `op` to both the map and the model.
fn apply<P: KeyPolicy>(map: &mut OrderedMultiMap<u8, u16, P>, model: &mut Model, op: &Op) {
    let duplicates = map.allows_duplicates();
    match op {
        &Op::Insert(key, value) => {
            map.insert(key, value);
            model_insert(model, duplicates, key, value);
        },
        &Op::InsertHint(hint, key, value) => {
            let hint = nth_position(map, hint.index(map.len() + 1));
            map.insert_hint(hint, key, value);
            model_insert(model, duplicates, key, value);
        },
        &Op::Remove(key) => {
            map.remove(&key);
            model.remove(&key);
        },
        &Op::EraseAt(index) => {
            if map.is_empty() {
                return;
            }
            let offset = index.index(map.len());
            let position = nth_position(map, offset);
            map.erase(position);

            let mut flat = flatten(model);
            flat.remove(offset);
            *model = unflatten(flat);
        },
        &Op::EraseRange(a, b) => {
            let a = a.index(map.len() + 1);
            let b = b.index(map.len() + 1);
            let (start, end) = (a.min(b), a.max(b));
            let first = nth_position(map, start);
            let last = nth_position(map, end);
            let returned = map.erase_range(first, last);
            assert_eq!(returned, last, "Erase range should return its end.");

            let mut flat = flatten(model);
            flat.drain(start..end);
            *model = unflatten(flat);
        },
        &Op::ExtractKey(key) => {
            map.extract_key(&key);
            if let Some(values) = model.get_mut(&key) {
                values.remove(0);
                if values.is_empty() {
                    model.remove(&key);
                }
            }
        },
        &Op::Retain(salt) => {
            map.retain(|key, _| kept(*key, salt));
            model.retain(|key, _| kept(*key, salt));
        },
        Op::Merge(entries) => {
            let mut other: TreeMultiMap<u8, u16> = entries.iter().copied().collect();
            let incoming = collect(&other);
            map.merge(&mut other);
            for (key, value) in incoming {
                model_insert(model, duplicates, key, value);
            }
        },
    }
}

proptest! {
    #[test]
    fn iteration_is_ordered(ops in vec(op(), 0..200)) {
        let mut multi = TreeMultiMap::new();
        let mut unique = TreeMap::new();
        let mut multi_model = Model::new();
        let mut unique_model = Model::new();

        for op in &ops {
            apply(&mut multi, &mut multi_model, op);
            apply(&mut unique, &mut unique_model, op);
        }

        let keys: Vec<u8> = multi.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        let keys: Vec<u8> = unique.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn unique_keys_stay_unique(ops in vec(op(), 0..200)) {
        let mut map = TreeMap::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut map, &mut model, op);
        }

        let keys: Vec<u8> = map.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(collect(&map), flatten(&model));
    }

    #[test]
    fn equal_keys_keep_insertion_order(ops in vec(op(), 0..200)) {
        let mut map = TreeMultiMap::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut map, &mut model, op);
        }

        prop_assert_eq!(collect(&map), flatten(&model));
        for (key, values) in &model {
            let (lower, upper) = map.equal_range(key);
            let run: Vec<u16> = map.range(lower, upper).map(|(_, v)| *v).collect();
            prop_assert_eq!(&run, values);
        }
    }

    #[test]
    fn extract_then_insert_restores_entries(
        multi in entries(),
        unique in entries(),
        pick in any::<Index>(),
    ) {
        let mut multi: TreeMultiMap<u8, u16> = multi.into_iter().collect();
        let mut unique: TreeMap<u8, u16> = unique.into_iter().collect();

        if !multi.is_empty() {
            let before = sorted(collect(&multi));
            let mut position = multi.begin();
            for _ in 0..pick.index(multi.len()) {
                position = multi.successor(position);
            }
            let node = multi.extract(position);
            prop_assert_eq!(multi.len(), before.len() - 1);
            prop_assert!(multi.insert_node(node).is_inserted());
            prop_assert_eq!(sorted(collect(&multi)), before);
        }

        if !unique.is_empty() {
            let before = collect(&unique);
            let key = before[pick.index(before.len())].0;
            let node = unique.extract_key(&key);
            prop_assert!(node.is_some());
            prop_assert!(!unique.contains(&key));
            if let Some(node) = node {
                prop_assert!(unique.insert_node(node).is_inserted());
            }
            prop_assert_eq!(collect(&unique), before);
        }
    }

    #[test]
    fn merge_partitions_entries(a in entries(), b in entries()) {
        let mut a: TreeMap<u8, u16> = a.into_iter().collect();
        let mut b: TreeMultiMap<u8, u16> = b.into_iter().collect();
        let mut union = collect(&a);
        union.extend(collect(&b));
        let union = sorted(union);

        a.merge(&mut b);

        let mut after = collect(&a);
        after.extend(collect(&b));
        prop_assert_eq!(sorted(after), union);
        prop_assert!(b.keys().all(|k| a.contains(k)), "Only colliding entries may stay behind.");

        let keys: Vec<u8> = a.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn len_matches_iteration(ops in vec(op(), 0..200)) {
        let mut multi = TreeMultiMap::new();
        let mut unique = TreeMap::new();
        let mut multi_model = Model::new();
        let mut unique_model = Model::new();

        for op in &ops {
            apply(&mut multi, &mut multi_model, op);
            apply(&mut unique, &mut unique_model, op);

            prop_assert_eq!(multi.len(), multi.iter().count());
            prop_assert_eq!(multi.len(), multi.iter().rev().count());
            prop_assert_eq!(unique.len(), unique.iter().count());
            prop_assert_eq!(unique.len(), unique.values().count());
        }
    }
}
