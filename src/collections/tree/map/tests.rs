#![cfg(test)]

use std::cmp::Ordering;

use super::*;
use crate::collections::tree::{
    ByLess, Comparator, Descending, KeyPolicy, Position, PositionError,
};
use crate::util::alloc::CountedDrop;
use crate::util::panic::assert_panics;

fn entries<K: Clone, V: Clone, P: KeyPolicy, C>(
    map: &OrderedMultiMap<K, V, P, C>,
) -> Vec<(K, V)> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

#[test]
fn test_unique_insert_and_lookup() {
    let mut map = TreeMap::new();
    assert!(map.insert(1, "a").1, "Inserting a new key should succeed.");
    assert!(map.insert(3, "b").1);
    assert!(map.insert(2, "c").1);
    map.tree.verify();

    assert_eq!(
        entries(&map),
        [(1, "a"), (2, "c"), (3, "b")],
        "Iteration should be ordered by key, not by insertion."
    );
    assert_eq!(map.entry_at(map.find(&2)), (&2, &"c"), "Find should locate an existing key.");
    assert_eq!(map.find(&4), map.end(), "Find should return the end for a missing key.");
    assert_eq!(map.count(&4), 0, "Missing keys should have a count of zero.");
    assert_eq!(map.count(&3), 1);
    assert!(map.contains(&1));
    assert!(!map.contains(&0));

    let (existing, inserted) = map.insert(3, "z");
    assert!(!inserted, "A duplicate key should be rejected by a unique map.");
    assert_eq!(
        map.entry_at(existing),
        (&3, &"b"),
        "A rejected insertion should leave the existing entry untouched."
    );
    assert_eq!(map.len(), 3);
}

#[test]
fn test_multi_preserves_insertion_order() {
    let mut map = TreeMultiMap::new();
    map.insert(2, 'c');
    map.insert(2, 'e');
    map.insert(1, 'a');
    map.tree.verify();

    assert_eq!(
        entries(&map),
        [(1, 'a'), (2, 'c'), (2, 'e')],
        "Equal keys should keep their insertion order."
    );

    let (position, inserted) = map.insert(2, 'b');
    assert!(inserted, "A multi map should always insert.");
    assert_eq!(
        map.successor(position),
        map.end(),
        "New duplicates should go after the existing run."
    );
    assert_eq!(map.count(&2), 3);
    assert_eq!(
        map.iter_from(map.find(&2)).map(|(_, v)| *v).collect::<Vec<_>>(),
        ['c', 'e', 'b'],
        "Find should return the first of a run so forward iteration visits the rest."
    );
}

#[test]
fn test_equal_range() {
    let map: TreeMultiMap<i32, char> =
        [(1, 'a'), (1, 'b'), (2, 'c'), (2, 'd'), (2, 'e'), (3, 'f')].into();

    let (lower, upper) = map.equal_range(&2);
    assert_eq!(map.key_at(lower), &2);
    assert_eq!(map.key_at(upper), &3);
    assert_eq!(
        map.range(lower, upper).map(|(_, v)| *v).collect::<Vec<_>>(),
        ['c', 'd', 'e'],
        "Equal range should span exactly the equal keys."
    );

    let (lower, upper) = map.equal_range(&0);
    assert_eq!(lower, upper, "The range for an absent key should be empty.");
    assert_eq!(lower, map.begin());

    let (lower, upper) = map.equal_range(&7);
    assert_eq!(lower, map.end());
    assert_eq!(upper, map.end());

    assert_eq!(map.lower_bound(&2), map.upper_bound(&1));
    assert_eq!(map.upper_bound(&3), map.end());
}

#[test]
fn test_erase_if() {
    let mut map = TreeMap::from([(1, 'a'), (2, 'b'), (3, 'c'), (4, 'd')]);
    let kept = map.find(&3);

    let removed = map.erase_if(|k, _| k % 2 == 0);
    map.tree.verify();

    assert_eq!(removed, 2, "Erase if should report how many entries it removed.");
    assert_eq!(entries(&map), [(1, 'a'), (3, 'c')]);
    assert_eq!(
        map.entry_at(kept),
        (&3, &'c'),
        "Positions of surviving entries should stay valid."
    );

    assert_eq!(map.erase_if(|_, _| false), 0);
    assert_eq!(map.retain(|_, v| *v != 'a'), 1);
    assert_eq!(entries(&map), [(3, 'c')]);
}

#[test]
fn test_insert_or_assign() {
    let mut map = TreeMap::from([(1, 'x')]);

    let outcome = map.insert_or_assign(1, 'y');
    assert!(outcome.is_assigned(), "An existing key should be assigned.");
    assert_eq!(entries(&map), [(1, 'y')]);

    let outcome = map.insert_or_assign(2, 'z');
    assert!(outcome.is_inserted(), "A missing key should be inserted.");
    assert_eq!(map.entry_at(outcome.position()), (&2, &'z'));
    assert_eq!(entries(&map), [(1, 'y'), (2, 'z')]);

    let outcome = map.insert_or_assign_hint(map.end(), 3, 'w');
    assert!(outcome.is_inserted());
    let outcome = map.insert_or_assign_hint(map.begin(), 3, 'v');
    assert!(outcome.is_assigned(), "A wrong hint should still find the existing key.");
    assert_eq!(map[&3], 'v');
}

#[test]
fn test_try_emplace() {
    let mut map = TreeMap::new();
    let mut calls = 0;

    let (first, inserted) = map.try_emplace("k", || {
        calls += 1;
        String::from("first")
    });
    assert!(inserted);

    let (second, inserted) = map.try_emplace("k", || {
        calls += 1;
        String::from("second")
    });
    assert!(!inserted);
    assert_eq!(first, second, "The existing position should be returned.");
    assert_eq!(calls, 1, "The value shouldn't be constructed for an existing key.");
    assert_eq!(map["k"], "first");

    *map.get_or_insert_with("j", || String::from("new")) += "!";
    *map.get_or_insert_default("k") += "?";
    assert_eq!(
        entries(&map),
        [("j", String::from("new!")), ("k", String::from("first?"))]
    );
}

#[test]
fn test_descending_comparator() {
    let mut map = TreeMap::with_comparator(Descending);
    map.extend([(1, 'a'), (5, 'e'), (3, 'c')]);
    map.tree.verify();

    assert_eq!(
        map.keys().copied().collect::<Vec<_>>(),
        [5, 3, 1],
        "A descending comparator should reverse the order."
    );
    assert_eq!(map.first_key_value(), Some((&5, &'e')));
    assert_eq!(map.key_at(map.lower_bound(&4)), &3);

    let by_less =
        TreeMultiMap::<i32, (), _>::with_comparator(ByLess(|a: &i32, b: &i32| a > b));
    assert_eq!(by_less.key_comparator().compare(&1, &2), Ordering::Greater);

    let mut by_closure = TreeMap::<&str, i32, _>::with_comparator(|a: &&str, b: &&str| {
        a.len().cmp(&b.len())
    });
    by_closure.insert("ccc", 3);
    by_closure.insert("a", 1);
    assert!(!by_closure.insert("b", 2).1, "Keys of equal length should be equivalent.");
    assert_eq!(by_closure.keys().copied().collect::<Vec<_>>(), ["a", "ccc"]);
}

#[test]
fn test_observers() {
    let map = TreeMap::from([(1, 'z'), (2, 'a')]);
    let keys = map.key_comparator();
    assert!(keys.less(&1, &2));
    assert!(keys.equivalent(&2, &2));

    let by_entry = map.entry_comparator();
    assert!(
        by_entry.less((&1, &'z'), (&2, &'a')),
        "Entry comparison should only consider keys."
    );
    assert_eq!(by_entry.compare((&2, &'a'), (&2, &'z')), Ordering::Equal);
}

#[test]
fn test_extract_and_reinsert() {
    let mut map = TreeMap::from([(1, "one"), (2, "two"), (3, "three")]);

    let mut node = map.extract(map.find(&1));
    assert_eq!(map.len(), 2);
    *node.key_mut() = 4;
    assert!(map.insert_node(node).is_inserted(), "The modified key should be insertable.");
    map.tree.verify();
    assert_eq!(entries(&map), [(2, "two"), (3, "three"), (4, "one")]);

    let node = ExtractedNode::new(3, "other");
    match map.insert_node(node) {
        NodeInsert::Occupied { existing, node } => {
            assert_eq!(map.entry_at(existing), (&3, &"three"));
            assert_eq!(
                node.into_entry(),
                (3, "other"),
                "A rejected node should be handed back intact."
            );
        },
        NodeInsert::Inserted(_) => panic!("A duplicate node shouldn't be inserted."),
    }

    assert!(map.extract_key(&7).is_none(), "Extracting a missing key should do nothing.");
    let node = map.extract_key(&2).unwrap();
    assert_eq!(node.value(), &"two");
    let position = map.insert_node_hint(map.begin(), node).position();
    assert_eq!(map.begin(), position, "A correct hint should still place the node properly.");
}

#[test]
fn test_multi_extract_key_takes_one() {
    let mut map = TreeMultiMap::from([(1, 'a'), (1, 'b'), (1, 'c')]);
    let node = map.extract_key(&1).unwrap();
    assert_eq!(node.into_entry(), (1, 'a'));
    assert_eq!(map.count(&1), 2, "Only one entry should be extracted.");

    assert_eq!(map.remove(&1), 2, "Remove should take the whole run.");
    assert!(map.is_empty());
}

#[test]
fn test_merge() {
    let mut a = TreeMap::from([(1, 'a'), (3, 'c')]);
    let mut b = TreeMultiMap::from([(1, 'x'), (2, 'y'), (3, 'z'), (3, 'w'), (4, 'v')]);
    let stays = b.find(&1);

    a.merge(&mut b);
    a.tree.verify();
    b.tree.verify();

    assert_eq!(entries(&a), [(1, 'a'), (2, 'y'), (3, 'c'), (4, 'v')]);
    assert_eq!(
        entries(&b),
        [(1, 'x'), (3, 'z'), (3, 'w')],
        "Entries with colliding keys should remain in the source."
    );
    assert_eq!(
        b.entry_at(stays),
        (&1, &'x'),
        "Positions of entries left behind should stay valid."
    );

    let mut multi = TreeMultiMap::from([(3, 'q')]);
    multi.merge(&mut b);
    assert!(b.is_empty(), "A multi map should accept every entry.");
    assert_eq!(entries(&multi), [(1, 'x'), (3, 'q'), (3, 'z'), (3, 'w')]);

    let mut descending = TreeMap::with_comparator(Descending);
    descending.insert(0, 'd');
    multi.merge(&mut descending);
    assert_eq!(multi.first_key_value(), Some((&0, &'d')));
}

#[test]
fn test_swap() {
    let mut a = TreeMap::from([(1, 'a')]);
    let mut b = TreeMap::from([(2, 'b'), (3, 'c')]);
    let in_a = a.begin();

    a.swap(&mut b);
    assert_eq!(a.len(), 2);
    assert_eq!(entries(&b), [(1, 'a')]);
    assert_eq!(
        b.entry_at(in_a),
        (&1, &'a'),
        "Positions should follow their entries into the other map."
    );

    let moved = std::mem::take(&mut a);
    assert!(a.is_empty(), "A moved-from map should be left empty.");
    assert_eq!(moved.len(), 2);
}

#[test]
fn test_erase_by_position() {
    let mut map: TreeMap<i32, i32> = (0..10).map(|i| (i, i * i)).collect();
    let stable = map.find(&7);

    let next = map.erase(map.find(&4));
    assert_eq!(map.key_at(next), &5, "Erase should return the following position.");
    assert_eq!(map.erase(map.find(&9)), map.end());

    let last = map.erase_range(map.find(&1), map.find(&6));
    map.tree.verify();
    assert_eq!(map.key_at(last), &6, "Erase range should return its end.");
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [0, 6, 7, 8]);
    assert_eq!(map.entry_at(stable), (&7, &49));

    assert_eq!(map.erase_range(map.begin(), map.end()), map.end());
    assert!(map.is_empty());
}

#[test]
fn test_erase_range_checks_before_erasing() {
    let mut map: TreeMap<i32, i32> = (0..8).map(|i| (i, i)).collect();
    let first = map.find(&5);
    let last = map.find(&2);

    assert_panics!(
        { map.erase_range(first, last) },
        "A range ending before its start should panic."
    );
    assert_eq!(map.len(), 8, "A rejected range shouldn't remove anything.");
    map.tree.verify();

    let stale = map.find(&7);
    map.erase(stale);
    assert_panics!({ map.erase_range(map.begin(), stale) }, "A stale end should panic.");
    assert_eq!(map.len(), 7);

    assert_eq!(map.erase_range(first, first), first, "An empty range should erase nothing.");
    assert_eq!(map.len(), 7);
}

#[test]
fn test_stale_positions() {
    let mut map = TreeMap::from([(1, 'a'), (2, 'b')]);
    let position = map.find(&1);
    map.erase(position);
    // Reuses the freed slot.
    map.insert(0, 'z');

    assert!(
        matches!(map.try_entry_at(position), Err(PositionError::Stale { .. })),
        "A position should be detected as stale even after its slot is reused."
    );
    assert_eq!(map.try_erase(map.end()), Err(PositionError::End));
    assert!(map.try_value_at_mut(position).is_err());

    assert_panics!({ map.entry_at(position) }, "Reading a stale position should panic.");
    assert_panics!({ map.erase(Position::END) }, "Erasing the end should panic.");
    assert_panics!({ map.successor(map.end()) }, "The end has no successor.");

    let position = map.begin();
    map.clear();
    assert!(map.try_entry_at(position).unwrap_err().is_stale());

    let mut single = TreeMap::from([(1, 'a')]);
    let original = single.begin();
    for i in 0..100 {
        single.erase(single.begin());
        single.insert(i, 'b');
        assert!(
            single.try_entry_at(original).is_err(),
            "Repeated reuse of one slot shouldn't revive an old position."
        );
    }
}

#[test]
fn test_position_navigation() {
    let mut map = TreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);

    let mut forwards = Vec::new();
    let mut position = map.begin();
    while position != map.end() {
        forwards.push(*map.key_at(position));
        position = map.successor(position);
    }
    assert_eq!(forwards, [1, 2, 3]);

    let mut backwards = Vec::new();
    let mut position = map.predecessor(map.end());
    while !position.is_end() {
        backwards.push(*map.key_at(position));
        position = map.predecessor(position);
    }
    assert_eq!(backwards, [3, 2, 1], "Predecessor should walk back to the end marker.");

    *map.value_at_mut(map.find(&2)) = 'B';
    assert_eq!(map.get(&2), Some(&'B'));
    assert_eq!(map.pop_first(), Some((1, 'a')));
    assert_eq!(map.pop_last(), Some((3, 'c')));
    assert_eq!(map.last_key_value(), Some((&2, &'B')));
}

#[test]
fn test_hinted_insertion() {
    let mut map = TreeMap::new();
    for i in 0..100 {
        let (position, inserted) = map.insert_hint(map.end(), i, i);
        assert!(inserted);
        assert_eq!(map.predecessor(map.end()), position);
    }
    map.tree.verify();

    // Deliberately wrong hints.
    assert!(!map.insert_hint(map.begin(), 50, 0).1, "A wrong hint shouldn't allow duplicates.");
    assert!(map.insert_hint(map.begin(), 150, 150).1);
    assert_eq!(map.last_key_value(), Some((&150, &150)));
    map.tree.verify();

    let mut multi = TreeMultiMap::new();
    multi.insert(1, 'a');
    multi.insert(2, 'b');
    let hint = multi.find(&1);
    multi.emplace_hint(hint, 1, 'c');
    multi.insert_hint(multi.end(), 1, 'd');
    assert_eq!(
        entries(&multi),
        [(1, 'a'), (1, 'c'), (1, 'd'), (2, 'b')],
        "Hints shouldn't affect the order of equal keys."
    );
}

#[test]
fn test_large_balanced_tree() {
    let mut map = TreeMap::new();
    for i in 0..1000_u32 {
        map.insert((i * 7919) % 1000, i);
    }
    let order = map.tree.verify();
    assert_eq!(order.len(), 1000);
    assert!(
        map.tree.nodes[map.tree.root.unwrap()].height <= 15,
        "An AVL tree of 1000 nodes should be shallow."
    );

    let survivor = map.find(&999);
    for i in (0..1000_u32).filter(|i| i % 3 != 0) {
        assert_eq!(map.remove(&i), 1);
    }
    map.tree.verify();
    assert_eq!(map.len(), 334);
    assert_eq!(map.key_at(survivor), &999);
    assert!(map.keys().all(|k| k % 3 == 0));
}

#[test]
fn test_iterators() {
    let mut map = TreeMap::from([(3, 30), (1, 10), (2, 20)]);

    assert_eq!(map.iter().rev().map(|(k, _)| *k).collect::<Vec<_>>(), [3, 2, 1]);
    assert_eq!(map.iter().len(), 3);

    for (k, v) in map.iter_mut() {
        *v += k;
    }
    for v in map.values_mut().rev() {
        *v *= 2;
    }
    assert_eq!(map.values().copied().collect::<Vec<_>>(), [22, 44, 66]);

    let mut both = map.iter();
    assert_eq!(both.next(), Some((&1, &22)));
    assert_eq!(both.next_back(), Some((&3, &66)));
    assert_eq!(both.next(), Some((&2, &44)));
    assert_eq!(both.next_back(), None, "The two ends shouldn't cross.");

    let range: Vec<_> = map.range(map.find(&2), map.end()).map(|(k, _)| *k).collect();
    assert_eq!(range, [2, 3]);
    assert_panics!(
        { map.range(map.find(&3), map.find(&1)).count() },
        "A backwards range should panic."
    );

    let mut other: TreeMap<i32, i32> = TreeMap::new();
    other.extend(map.range(map.begin(), map.find(&3)));
    assert_eq!(other.len(), 2, "Extending from a position range should copy it.");

    assert_eq!(map.clone().into_keys().rev().collect::<Vec<_>>(), [3, 2, 1]);
    assert_eq!(map.into_values().collect::<Vec<_>>(), [22, 44, 66]);
}

#[test]
fn test_comparisons() {
    let a = TreeMap::from([(1, 'a'), (2, 'b')]);
    let b = TreeMap::from([(2, 'b'), (1, 'a')]);
    let c = TreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    let d = TreeMap::from([(1, 'b')]);

    assert_eq!(a, b, "Maps with equal entries should be equal.");
    assert_ne!(a, c);
    assert!(a < c, "A prefix should be ordered first.");
    assert!(a < d, "Comparison should consider values when keys match.");
    assert_eq!(a.cmp(&b), Ordering::Equal);

    let mut hashes = std::collections::HashSet::new();
    hashes.insert(a.clone());
    assert!(hashes.contains(&b), "Equal maps should hash equally.");
}

#[test]
fn test_formatting() {
    let map = TreeMap::from([(2, "b"), (1, "a")]);
    assert_eq!(format!("{map}"), "{1: \"a\", 2: \"b\"}");

    let debug = format!("{map:?}");
    assert!(debug.contains("(1: \"a\")"), "Debug output should render each node.");
    assert!(debug.contains("len: 2"));
}

#[test]
fn test_index_missing_key_panics() {
    let map = TreeMap::from([("a", 1)]);
    assert_eq!(map["a"], 1);
    assert_panics!({ map["b"] }, "Indexing a missing key should panic.");
}

#[test]
fn test_drops_every_entry() {
    let counter = CountedDrop::new();
    let mut map = TreeMultiMap::new();
    for i in 0..10 {
        map.insert(i % 4, counter.clone());
    }
    assert_eq!(counter.take(), 0);

    map.remove(&0);
    assert_eq!(counter.take(), 3, "Removed entries should be dropped.");

    map.erase_if(|k, _| *k == 1);
    assert_eq!(counter.take(), 3);

    let mut iter = map.clone().into_iter();
    assert_eq!(counter.take(), 0);
    drop(iter.next());
    drop(iter);
    assert_eq!(counter.take(), 4, "A partially consumed iterator should drop the rest.");

    map.clear();
    assert_eq!(counter.take(), 4, "Clear should drop every entry.");
    drop(map);
    assert_eq!(counter.take(), 0, "Cleared entries shouldn't be dropped twice.");
}
