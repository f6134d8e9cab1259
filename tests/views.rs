use std::collections::BTreeMap;
use std::ops::Bound;

use avl_navmap::{Error, KeySet, SubMap, TreeMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::{fixture, rstest};

#[fixture]
fn one_to_nine() -> TreeMap<i32, char> {
    (1..=9).zip('a'..).collect()
}

fn keys_of(view: &SubMap<i32, char>) -> Vec<i32> {
    view.keys().collect::<Result<_, _>>().unwrap()
}

fn set_of(keys: &KeySet<i32, char>) -> Vec<i32> {
    keys.iter().collect::<Result<_, _>>().unwrap()
}

/// Installs a test subscriber so that view and iterator diagnostics show up with
/// `RUST_LOG=avl_navmap=debug`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ─── Range construction ──────────────────────────────────────────────────────

#[rstest]
#[case::closed(3, true, 7, true, vec![3, 4, 5, 6, 7])]
#[case::half_open(3, true, 7, false, vec![3, 4, 5, 6])]
#[case::open(3, false, 7, false, vec![4, 5, 6])]
#[case::left_open(3, false, 7, true, vec![4, 5, 6, 7])]
#[case::single(5, true, 5, true, vec![5])]
#[case::empty_point(5, true, 5, false, vec![])]
#[case::between_keys(20, true, 30, true, vec![])]
#[case::past_both_ends(-5, true, 50, true, (1..=9).collect())]
fn sub_map_bounds(
    one_to_nine: TreeMap<i32, char>,
    #[case] from: i32,
    #[case] from_inclusive: bool,
    #[case] to: i32,
    #[case] to_inclusive: bool,
    #[case] expected: Vec<i32>,
) {
    let view = one_to_nine.sub_map(from, from_inclusive, to, to_inclusive).unwrap();
    assert_eq!(view.len(), expected.len());
    assert_eq!(view.is_empty(), expected.is_empty());
    assert_eq!(keys_of(&view), expected);
    let reversed: Vec<i32> = expected.iter().rev().copied().collect();
    assert_eq!(keys_of(&view.descending_map()), reversed);
}

#[rstest]
#[case::exclusive(5, false, vec![1, 2, 3, 4], vec![6, 7, 8, 9])]
#[case::inclusive(5, true, vec![1, 2, 3, 4, 5], vec![5, 6, 7, 8, 9])]
#[case::below_all(0, true, vec![], (1..=9).collect())]
fn head_and_tail_maps(
    one_to_nine: TreeMap<i32, char>,
    #[case] edge: i32,
    #[case] inclusive: bool,
    #[case] head: Vec<i32>,
    #[case] tail: Vec<i32>,
) {
    assert_eq!(keys_of(&one_to_nine.head_map(edge, inclusive)), head);
    assert_eq!(keys_of(&one_to_nine.tail_map(edge, inclusive)), tail);
}

#[rstest]
fn inverted_range_is_rejected(one_to_nine: TreeMap<i32, char>) {
    assert_eq!(one_to_nine.sub_map(7, true, 3, true).unwrap_err(), Error::InvalidRange);
    assert_eq!(Error::InvalidRange.to_string(), "range start is greater than range end");
}

// ─── Nested and descending views ─────────────────────────────────────────────

#[rstest]
fn nested_views_intersect(one_to_nine: TreeMap<i32, char>) {
    let outer = one_to_nine.sub_map(2, true, 8, true).unwrap();

    // The tighter bound wins on each side.
    let inner = outer.sub_map(0, true, 5, false).unwrap();
    assert_eq!(keys_of(&inner), vec![2, 3, 4]);
    let inner = outer.tail_map(6, false).unwrap();
    assert_eq!(keys_of(&inner), vec![7, 8]);
    let inner = outer.head_map(2, true).unwrap();
    assert_eq!(keys_of(&inner), vec![2]);

    assert_eq!(outer.sub_map(5, true, 3, true).unwrap_err(), Error::InvalidRange);
    assert_eq!(outer.tail_map(9, true).unwrap_err(), Error::InvalidRange);
}

#[rstest]
fn descending_view_takes_bounds_in_its_own_order(one_to_nine: TreeMap<i32, char>) {
    let down = one_to_nine.descending_map();
    assert!(down.is_descending());

    let middle = down.sub_map(7, true, 3, false).unwrap();
    assert_eq!(keys_of(&middle), vec![7, 6, 5, 4]);
    assert_eq!(keys_of(&down.head_map(3, true).unwrap()), vec![9, 8, 7, 6, 5, 4, 3]);
    assert_eq!(keys_of(&down.tail_map(3, false).unwrap()), vec![2, 1]);
    assert_eq!(down.sub_map(3, true, 7, true).unwrap_err(), Error::InvalidRange);

    // Reversing twice restores ascending order over the same range.
    assert_eq!(keys_of(&middle.descending_map()), vec![4, 5, 6, 7]);
    assert_eq!(keys_of(&middle.descending_map().descending_map()), vec![7, 6, 5, 4]);
}

#[rstest]
fn descending_navigation_is_mirrored(one_to_nine: TreeMap<i32, char>) {
    let view = one_to_nine.sub_map(3, true, 7, true).unwrap().descending_map();
    assert_eq!(view.first_key(), Ok(7));
    assert_eq!(view.last_key(), Ok(3));
    assert_eq!(view.first_entry(), Some((7, 'g')));
    assert_eq!(view.lower_key(&5), Some(6));
    assert_eq!(view.floor_key(&5), Some(5));
    assert_eq!(view.ceiling_key(&5), Some(5));
    assert_eq!(view.higher_key(&5), Some(4));
    // Probes outside the range clamp to its ends or find nothing.
    assert_eq!(view.higher_key(&100), Some(7));
    assert_eq!(view.ceiling_key(&8), Some(7));
    assert_eq!(view.lower_key(&0), Some(3));
    assert_eq!(view.higher_key(&3), None);
    assert_eq!(view.lower_key(&7), None);
    assert_eq!(view.higher_entry(&6), Some((5, 'e')));
}

#[rstest]
fn empty_views_have_no_first_key(one_to_nine: TreeMap<i32, char>) {
    let view = one_to_nine.sub_map(20, true, 30, true).unwrap();
    assert_eq!(view.first_key(), Err(Error::NoSuchElement));
    assert_eq!(view.last_key(), Err(Error::NoSuchElement));
    assert_eq!(view.first_entry(), None);
    assert_eq!(view.iter().next(), None);
}

// ─── Mutation through views ──────────────────────────────────────────────────

#[rstest]
fn writes_are_shared_both_ways(mut one_to_nine: TreeMap<i32, char>) {
    init_tracing();
    let mut view = one_to_nine.sub_map(10, true, 20, false).unwrap();
    assert!(view.is_empty());

    assert_eq!(view.insert(15, 'x'), Ok(None));
    assert_eq!(one_to_nine.get(&15), Some('x'));
    one_to_nine.insert(12, 'y');
    assert_eq!(view.get(&12), Some('y'));
    assert_eq!(view.len(), 2);

    assert_eq!(view.insert(20, 'z'), Err(Error::KeyOutOfRange));
    assert_eq!(view.remove(&3), Err(Error::KeyOutOfRange));
    assert_eq!(view.get(&3), None);
    assert!(!view.contains_key(&3));
    assert!(one_to_nine.contains_key(&3));
    assert_eq!(one_to_nine.len(), 11);

    assert_eq!(view.remove(&15), Ok(Some('x')));
    assert_eq!(view.pop_last(), Some((12, 'y')));
    assert!(view.is_empty());
    one_to_nine.assert_invariants();
}

#[rstest]
fn pops_follow_the_view_order(one_to_nine: TreeMap<i32, char>) {
    let mut down = one_to_nine.head_map(4, true).descending_map();
    assert_eq!(down.pop_first(), Some((4, 'd')));
    assert_eq!(down.pop_last(), Some((1, 'a')));
    assert_eq!(down.entries(), vec![(3, 'c'), (2, 'b')]);
    assert_eq!(one_to_nine.len(), 7);
}

#[rstest]
fn clearing_a_view_only_touches_its_range(one_to_nine: TreeMap<i32, char>) {
    let mut view = one_to_nine.sub_map(3, false, 7, false).unwrap();
    view.clear();
    assert!(view.is_empty());
    assert_eq!(keys_of(&one_to_nine.descending_map()), vec![9, 8, 7, 3, 2, 1]);
    one_to_nine.assert_invariants();
}

// ─── Key sets ────────────────────────────────────────────────────────────────

#[rstest]
fn key_sets_delegate_to_their_view(one_to_nine: TreeMap<i32, char>) {
    let keys = one_to_nine.navigable_key_set();
    assert_eq!(keys.len(), 9);
    assert!(keys.contains(&4));
    assert_eq!(keys.first(), Ok(1));
    assert_eq!(keys.last(), Ok(9));

    let middle = keys.sub_set(3, true, 6, true).unwrap();
    assert_eq!(set_of(&middle), vec![3, 4, 5, 6]);
    assert_eq!(set_of(&middle.descending_set()), vec![6, 5, 4, 3]);
    assert_eq!(set_of(&keys.head_set(3, false).unwrap()), vec![1, 2]);
    assert_eq!(set_of(&keys.tail_set(8, true).unwrap()), vec![8, 9]);

    let down = one_to_nine.descending_key_set();
    assert!(down.comparator().is_reversed());
    assert_eq!(down.iter().next(), Some(Ok(9)));
    assert_eq!(down.descending_iter().next(), Some(Ok(1)));
}

#[rstest]
fn key_set_removal_reaches_the_owner(one_to_nine: TreeMap<i32, char>) {
    let mut evens = one_to_nine.key_set();
    let mut iter = evens.iter();
    while let Some(key) = iter.next() {
        if key.unwrap() % 2 == 1 {
            iter.remove().unwrap();
        }
    }
    assert_eq!(set_of(&evens), vec![2, 4, 6, 8]);
    assert_eq!(evens.pop_last(), Some(8));
    evens.clear();
    assert!(one_to_nine.is_empty());
}

// ─── Iteration over views ────────────────────────────────────────────────────

#[rstest]
fn view_iterator_removal_stays_in_range(one_to_nine: TreeMap<i32, char>) {
    let view = one_to_nine.sub_map(2, true, 6, true).unwrap().descending_map();
    let mut iter = view.iter();
    let mut seen = Vec::new();
    while iter.has_next() {
        let (key, value) = iter.advance().unwrap();
        seen.push(key);
        if key != 4 {
            assert_eq!(iter.remove(), Ok((key, value)));
        }
    }
    assert_eq!(seen, vec![6, 5, 4, 3, 2]);
    assert_eq!(iter.advance(), Err(Error::NoSuchElement));
    assert_eq!(one_to_nine.keys().collect::<Result<Vec<_>, _>>(), Ok(vec![1, 4, 7, 8, 9]));
}

#[rstest]
fn view_iterators_fail_fast(mut one_to_nine: TreeMap<i32, char>) {
    init_tracing();
    let view = one_to_nine.tail_map(5, true);
    let mut iter = view.values();
    assert_eq!(iter.next(), Some(Ok('e')));

    // Replacing a value is not structural.
    one_to_nine.insert(6, 'F');
    assert_eq!(iter.next(), Some(Ok('F')));

    // Removing outside the view still changes the shared tree.
    one_to_nine.remove(&1);
    assert!(matches!(iter.next(), Some(Err(Error::ConcurrentModification { .. }))));
    assert_eq!(iter.next(), None);

    // A fresh iterator picks up the new state.
    assert_eq!(view.values().collect::<Result<String, _>>(), Ok("eFghi".to_owned()));
}

// ─── Randomized range checks ─────────────────────────────────────────────────

fn bounds(lo: i64, lo_inclusive: bool, hi: i64, hi_inclusive: bool) -> (Bound<i64>, Bound<i64>) {
    let lo = if lo_inclusive { Bound::Included(lo) } else { Bound::Excluded(lo) };
    let hi = if hi_inclusive { Bound::Included(hi) } else { Bound::Excluded(hi) };
    (lo, hi)
}

/// `BTreeMap::range` panics on `(Excluded(x), Excluded(x))`, which is a valid empty window here.
fn reference_range(bt: &BTreeMap<i64, i64>, range: (Bound<i64>, Bound<i64>)) -> Vec<(i64, i64)> {
    if matches!(range, (Bound::Excluded(a), Bound::Excluded(b)) if a == b) {
        return Vec::new();
    }
    bt.range(range).map(|(k, v)| (*k, *v)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A view's size, contents and navigation agree with `BTreeMap::range`.
    #[test]
    fn view_matches_btreemap_range(
        entries in proptest::collection::vec((-500i64..500, any::<i64>()), 0..1_000),
        a in -520i64..520,
        b in -520i64..520,
        lo_inclusive in any::<bool>(),
        hi_inclusive in any::<bool>(),
        probe in -520i64..520,
    ) {
        let (lo, hi) = (a.min(b), a.max(b));
        let avl: TreeMap<i64, i64> = entries.iter().copied().collect();
        let bt: BTreeMap<i64, i64> = entries.into_iter().collect();
        let expected = reference_range(&bt, bounds(lo, lo_inclusive, hi, hi_inclusive));

        let view = avl.sub_map(lo, lo_inclusive, hi, hi_inclusive).unwrap();
        prop_assert_eq!(view.len(), expected.len());
        prop_assert_eq!(view.entries(), expected.clone());

        let down = view.descending_map();
        let reversed: Vec<_> = expected.iter().rev().copied().collect();
        prop_assert_eq!(down.len(), expected.len());
        prop_assert_eq!(down.iter().collect::<Result<Vec<_>, _>>().unwrap(), reversed);

        let ceiling = expected.iter().find(|(k, _)| *k >= probe).copied();
        let higher = expected.iter().find(|(k, _)| *k > probe).copied();
        let floor = expected.iter().rev().find(|(k, _)| *k <= probe).copied();
        let lower = expected.iter().rev().find(|(k, _)| *k < probe).copied();
        prop_assert_eq!(view.ceiling_entry(&probe), ceiling);
        prop_assert_eq!(view.higher_entry(&probe), higher);
        prop_assert_eq!(view.floor_entry(&probe), floor);
        prop_assert_eq!(view.lower_entry(&probe), lower);
        // The descending view swaps each pair.
        prop_assert_eq!(down.ceiling_entry(&probe), floor);
        prop_assert_eq!(down.higher_entry(&probe), lower);
        prop_assert_eq!(down.floor_entry(&probe), ceiling);
        prop_assert_eq!(down.lower_entry(&probe), higher);
    }

    /// Sizes of head and tail views come from cached subtree sizes, and must agree with
    /// enumeration after arbitrary removals.
    #[test]
    fn head_and_tail_sizes_after_removals(
        keys in proptest::collection::vec(-300i64..300, 0..600),
        removals in proptest::collection::vec(-300i64..300, 0..300),
        split in -310i64..310,
        inclusive in any::<bool>(),
    ) {
        let mut map: TreeMap<i64, ()> = keys.iter().map(|&k| (k, ())).collect();
        let head = map.head_map(split, inclusive);
        let tail = map.tail_map(split, !inclusive);
        for k in &removals {
            map.remove(k);
        }
        let below = map.keys().map_while(Result::ok).filter(|&k| k < split || (inclusive && k == split)).count();
        prop_assert_eq!(head.len(), below);
        prop_assert_eq!(head.len() + tail.len(), map.len());
        prop_assert_eq!(head.keys().count(), below);
        map.assert_invariants();
    }
}
