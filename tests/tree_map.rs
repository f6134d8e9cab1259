use std::collections::BTreeMap;
use std::ops::Bound;

use avl_navmap::{Comparator, Error, TreeMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys drawn from a range smaller than `TEST_SIZE` so that operations collide.
fn key_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

fn collect_keys<K: Clone, V>(map: &TreeMap<K, V>) -> Vec<K> {
    map.keys().collect::<Result<_, _>>().unwrap()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    Lower(i64),
    Floor(i64),
    Ceiling(i64),
    Higher(i64),
    FirstEntry,
    LastEntry,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => key_strategy().prop_map(MapOp::Lower),
        1 => key_strategy().prop_map(MapOp::Floor),
        1 => key_strategy().prop_map(MapOp::Ceiling),
        1 => key_strategy().prop_map(MapOp::Higher),
        1 => Just(MapOp::FirstEntry),
        1 => Just(MapOp::LastEntry),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

fn entry((k, v): (&i64, &i64)) -> (i64, i64) {
    (*k, *v)
}

// ─── Core operations against BTreeMap ────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both TreeMap and BTreeMap and asserts
    /// identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut avl: TreeMap<i64, i64> = TreeMap::new();
        let mut bt: BTreeMap<i64, i64> = BTreeMap::new();

        for (step, op) in ops.iter().enumerate() {
            match *op {
                MapOp::Insert(k, v) => prop_assert_eq!(avl.insert(k, v), bt.insert(k, v), "insert({}, {})", k, v),
                MapOp::Remove(k) => prop_assert_eq!(avl.remove(&k), bt.remove(&k), "remove({})", k),
                MapOp::Get(k) => prop_assert_eq!(avl.get(&k), bt.get(&k).copied(), "get({})", k),
                MapOp::ContainsKey(k) => prop_assert_eq!(avl.contains_key(&k), bt.contains_key(&k), "contains_key({})", k),
                MapOp::Lower(k) => {
                    let expected = bt.range(..k).next_back().map(entry);
                    prop_assert_eq!(avl.lower_entry(&k), expected, "lower_entry({})", k);
                }
                MapOp::Floor(k) => {
                    let expected = bt.range(..=k).next_back().map(entry);
                    prop_assert_eq!(avl.floor_entry(&k), expected, "floor_entry({})", k);
                }
                MapOp::Ceiling(k) => {
                    let expected = bt.range(k..).next().map(entry);
                    prop_assert_eq!(avl.ceiling_entry(&k), expected, "ceiling_entry({})", k);
                }
                MapOp::Higher(k) => {
                    let expected = bt.range((Bound::Excluded(k), Bound::Unbounded)).next().map(entry);
                    prop_assert_eq!(avl.higher_entry(&k), expected, "higher_entry({})", k);
                }
                MapOp::FirstEntry => {
                    prop_assert_eq!(avl.first_entry(), bt.first_key_value().map(entry));
                    prop_assert_eq!(avl.first_key().ok(), bt.keys().next().copied());
                }
                MapOp::LastEntry => {
                    prop_assert_eq!(avl.last_entry(), bt.last_key_value().map(entry));
                    prop_assert_eq!(avl.last_key().ok(), bt.keys().next_back().copied());
                }
                MapOp::PopFirst => prop_assert_eq!(avl.pop_first(), bt.pop_first(), "pop_first"),
                MapOp::PopLast => prop_assert_eq!(avl.pop_last(), bt.pop_last(), "pop_last"),
            }
            prop_assert_eq!(avl.len(), bt.len(), "len mismatch after {:?}", op);
            if step % 250 == 0 {
                avl.assert_invariants();
            }
        }
        avl.assert_invariants();
        prop_assert_eq!(avl.entries(), bt.into_iter().collect::<Vec<_>>());
    }

    /// Forward and reverse iteration yield the same sequence, mirrored.
    #[test]
    fn iteration_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let avl: TreeMap<i64, i64> = entries.iter().copied().collect();
        let bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let forward: Vec<_> = avl.iter().collect::<Result<_, _>>().unwrap();
        let backward: Vec<_> = avl.iter_rev().collect::<Result<_, _>>().unwrap();
        let expected: Vec<_> = bt.iter().map(entry).collect();
        prop_assert_eq!(&forward, &expected);
        prop_assert_eq!(backward, expected.iter().rev().copied().collect::<Vec<_>>());

        let values: Vec<_> = avl.values().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(values, bt.values().copied().collect::<Vec<_>>());
        prop_assert!(forward.windows(2).all(|w| w[0].0 < w[1].0));
        avl.assert_invariants();
    }

    /// The tree never grows taller than the AVL bound of about 1.44 log2(n + 2).
    #[test]
    fn height_stays_logarithmic(keys in proptest::collection::vec(key_strategy(), 1..TEST_SIZE)) {
        let mut map = TreeMap::new();
        for k in keys {
            map.insert(k, ());
        }
        #[allow(clippy::cast_precision_loss)]
        let bound = 1.4405 * ((map.len() + 2) as f64).log2();
        #[allow(clippy::cast_precision_loss)]
        let height = map.height() as f64;
        prop_assert!(height <= bound, "height {} exceeds {}", height, bound);
    }

    /// Bulk loading and one-by-one insertion produce equal maps.
    #[test]
    fn bulk_load_matches_inserts(mut keys in proptest::collection::vec(key_strategy(), 0..TEST_SIZE)) {
        keys.sort_unstable();
        keys.dedup();
        let bulk = TreeMap::from_sorted(keys.iter().map(|&k| (k, k))).unwrap();
        let mut inserted = TreeMap::new();
        for &k in &keys {
            inserted.insert(k, k);
        }
        bulk.assert_invariants();
        prop_assert_eq!(&bulk, &inserted);
        // Bulk-loaded trees are as short as possible.
        let minimal = usize::BITS - keys.len().leading_zeros();
        prop_assert_eq!(bulk.height(), minimal as usize);
    }

    /// Ranks agree with positions in the sorted key list.
    #[test]
    fn rank_matches_sorted_position(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let avl: TreeMap<i64, i64> = entries.iter().copied().collect();
        let bt: BTreeMap<i64, i64> = entries.into_iter().collect();
        for (rank, (k, v)) in bt.iter().enumerate() {
            prop_assert_eq!(avl.rank_of(k), Some(rank));
            prop_assert_eq!(avl.get_by_rank(rank), Some((*k, *v)));
        }
        prop_assert_eq!(avl.get_by_rank(bt.len()), None);
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn inserts_come_back_sorted() {
    let mut map = TreeMap::new();
    for k in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
        map.insert(k, k * 10);
    }
    assert_eq!(map.keys().collect::<Result<Vec<_>, _>>(), Ok((1..=9).collect::<Vec<_>>()));
    assert!(map.height() <= 4);
    assert_eq!(map.len(), 9);
    map.assert_invariants();
}

#[test]
fn bulk_load_roots_at_the_lower_middle() {
    let map = TreeMap::from_sorted([(1, 'a'), (2, 'b'), (3, 'c'), (4, 'd')]).unwrap();
    // The root (key 2) has one child on the left and a two-node chain on the right.
    assert_eq!(map.height(), 3);
    assert_eq!(map.rank_of(&2), Some(1));
    map.assert_invariants();
}

#[test]
fn head_and_sub_maps_of_one_to_nine() {
    let map: TreeMap<i32, ()> = (1..=9).map(|k| (k, ())).collect();

    let head = map.head_map(5, false);
    assert_eq!(head.keys().collect::<Result<Vec<_>, _>>(), Ok(vec![1, 2, 3, 4]));
    assert_eq!(head.len(), 4);

    let sub = map.sub_map(3, true, 7, false).unwrap();
    assert_eq!(sub.keys().collect::<Result<Vec<_>, _>>(), Ok(vec![3, 4, 5, 6]));
    assert_eq!(sub.len(), 4);
}

#[test]
fn descending_key_set_of_three() {
    let map = TreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    let keys = map.descending_map().key_set();
    assert_eq!(keys.iter().collect::<Result<Vec<_>, _>>(), Ok(vec![3, 2, 1]));
}

#[test]
fn removing_the_middle_of_five() {
    let mut map = TreeMap::from_sorted((1..=5).map(|k| (k, k))).unwrap();
    assert_eq!(map.remove(&3), Some(3));
    assert_eq!(collect_keys(&map), vec![1, 2, 4, 5]);
    map.assert_invariants();
}

#[test]
fn insert_during_iteration_is_detected() {
    let mut map: TreeMap<i64, i64> = (0..10).map(|k| (k, k)).collect();
    let mut iter = map.iter();
    assert_eq!(iter.next(), Some(Ok((0, 0))));
    assert_eq!(iter.next(), Some(Ok((1, 1))));

    map.insert(100, 100);
    assert!(matches!(iter.next(), Some(Err(Error::ConcurrentModification { .. }))));
    assert_eq!(iter.next(), None);
    assert_eq!(collect_keys(&map).len(), 11);
}

// ─── Construction and comparators ────────────────────────────────────────────

#[test]
fn unsorted_bulk_input_is_rejected() {
    let err = TreeMap::from_sorted([(1, ()), (3, ()), (2, ())]).unwrap_err();
    assert_eq!(err, Error::Unsorted { index: 2 });
    assert_eq!(err.to_string(), "entries are not strictly ascending at index 2");
}

#[test]
fn custom_comparator_orders_everything() {
    let by_len = Comparator::new(|a: &String, b: &String| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    let mut map = TreeMap::with_comparator(by_len);
    for word in ["pear", "fig", "banana", "kiwi", "apple"] {
        map.insert(word.to_owned(), word.len());
    }
    assert_eq!(
        map.keys().collect::<Result<Vec<_>, _>>().unwrap(),
        ["fig", "kiwi", "pear", "apple", "banana"]
    );
    assert_eq!(map.ceiling_key(&"zzzz".to_owned()), Some("apple".to_owned()));
    map.assert_invariants();
}

#[test]
fn reversed_comparator_bulk_loads_descending_input() {
    let map = TreeMap::from_sorted_with(Comparator::natural().reversed(), [(3, 'c'), (2, 'b'), (1, 'a')]).unwrap();
    assert_eq!(map.first_key(), Ok(3));
    assert_eq!(map.higher_key(&3), Some(2));
    map.assert_invariants();
}

#[test]
fn comparator_panics_propagate() {
    let mut map = TreeMap::with_comparator(Comparator::new(|a: &i32, b: &i32| {
        assert!(*a != 13 && *b != 13, "unlucky key");
        a.cmp(b)
    }));
    map.insert(1, ());
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| map.insert(13, ())));
    assert!(result.is_err());
}

#[test]
fn clear_resets_everything() {
    let mut map: TreeMap<i64, i64> = (0..100).map(|k| (k, k)).collect();
    let view = map.tail_map(50, true);
    map.clear();
    assert!(map.is_empty());
    assert!(view.is_empty());
    assert_eq!(map.height(), 0);
    assert_eq!(map.first_key(), Err(Error::NoSuchElement));
    map.insert(7, 7);
    assert_eq!(view.len(), 0);
    assert_eq!(collect_keys(&map), vec![7]);
}

#[test]
fn extend_and_capacity() {
    let mut map = TreeMap::with_capacity(4);
    map.extend([(2, 'b'), (1, 'a')]);
    map.reserve(100);
    assert!(map.capacity() >= 102);
    map.shrink_to_fit();
    assert!(map.capacity() >= map.len());
    assert_eq!(map.get_key_value(&1), Some((1, 'a')));
}
