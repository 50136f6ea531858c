//! Merge Validation Tests
//!
//! Tests verify:
//! - Unsorted sources are reported when sortedness checks are enabled
//! - Size hint mismatches are reported when hint checks are enabled
//! - The first failure stops the merge and surfaces through every output
//! - Nothing is checked by default

use accumerge::{AccumergeError, MatchingKeyPolicy, MergerConfig, SortedMerger};

// =============================================================================
// Helper Functions
// =============================================================================

fn checked_sorted() -> SortedMerger<i32, &'static str> {
    let config = MergerConfig::builder().validate_sorted(true).build();
    SortedMerger::with_config(config).unwrap()
}

fn checked_hints() -> SortedMerger<i32, &'static str> {
    let config = MergerConfig::builder().validate_size_hints(true).build();
    SortedMerger::with_config(config).unwrap()
}

// =============================================================================
// Sortedness Tests
// =============================================================================

#[test]
fn test_unsorted_source_reported() {
    let merger = checked_sorted();
    merger.add_sized(vec![(1, "ok"), (2, "ok")]);
    merger.add_sized(vec![(5, "bad"), (3, "bad")]);

    let mut merge = merger.iter(MatchingKeyPolicy::ChooseLatest);
    let yielded: Vec<_> = merge.by_ref().collect();
    assert!(yielded.len() < 4);
    assert!(merge.error().is_some());

    match merge.finish() {
        Err(AccumergeError::UnsortedSource { age, position }) => {
            assert_eq!(age, 1);
            assert_eq!(position, 1);
        }
        other => panic!("expected UnsortedSource, got {:?}", other),
    }
}

#[test]
fn test_duplicate_key_within_source_is_unsorted() {
    let merger = checked_sorted();
    merger.add_sized(vec![(1, "a"), (1, "b")]);

    let result = merger.iter(MatchingKeyPolicy::DontCare).into_vec();
    assert!(matches!(
        result,
        Err(AccumergeError::UnsortedSource { age: 0, position: 1 })
    ));
}

#[test]
fn test_unsorted_found_while_resolving_collision() {
    // Source 0 loses the collision on key 4 and then steps backwards
    let merger = checked_sorted();
    merger.add_sized(vec![(4, "old"), (2, "old")]);
    merger.add_sized(vec![(4, "new")]);

    let result = merger.iter(MatchingKeyPolicy::ChooseLatest).into_vec();
    assert!(matches!(
        result,
        Err(AccumergeError::UnsortedSource { age: 0, position: 1 })
    ));
}

#[test]
fn test_iteration_stops_after_failure() {
    let merger = checked_sorted();
    merger.add_sized(vec![(1, "x"), (0, "x"), (7, "x")]);

    let mut merge = merger.iter(MatchingKeyPolicy::DontCare);
    assert_eq!(merge.next(), Some((1, "x")));
    assert_eq!(merge.next(), None);
    assert_eq!(merge.next(), None);
    assert_eq!(merge.size_hint(), (0, Some(0)));
    assert!(merge.finish().is_err());
}

#[test]
fn test_size_hint_lower_bound_holds_on_failure() {
    let merger = checked_sorted();
    merger.add_sized(vec![(1, "a"), (0, "a")]);
    merger.add_sized(vec![(5, "b")]);

    let merge = merger.iter(MatchingKeyPolicy::DontCare);
    let (lower, _) = merge.size_hint();
    let yielded = merge.count();
    assert_eq!(yielded, 1);
    assert!(yielded >= lower, "lower bound {} > yielded {}", lower, yielded);
}

#[test]
fn test_size_hint_lower_bound_without_validation() {
    let merger = SortedMerger::new();
    merger.add_sized(vec![(1, "a"), (4, "a")]);
    merger.add_sized(vec![(1, "b"), (2, "b")]);

    let mut merge = merger.iter(MatchingKeyPolicy::ChooseLatest);
    let mut lowers = Vec::new();
    loop {
        lowers.push(merge.size_hint().0);
        if merge.next().is_none() {
            break;
        }
    }

    // Keys 1, 2 and 4 are yielded
    let yielded = lowers.len() - 1;
    assert_eq!(yielded, 3);
    for (step, lower) in lowers.iter().enumerate() {
        assert!(yielded - step >= *lower, "step {}: lower bound {}", step, lower);
    }
}

#[test]
fn test_create_maps_propagate_failure() {
    let merger = checked_sorted();

    merger.add_sized(vec![(3, "z"), (1, "z")]);
    assert!(merger.create_btree_map(MatchingKeyPolicy::DontCare).is_err());

    merger.add_sized(vec![(3, "z"), (1, "z")]);
    assert!(merger.create_skip_map(MatchingKeyPolicy::DontCare).is_err());

    merger.add_sized(vec![(3, "z"), (1, "z")]);
    assert!(merger.create_sorted_map(MatchingKeyPolicy::DontCare).is_err());
}

#[test]
fn test_sorted_sources_pass_validation() {
    let merger = checked_sorted();
    merger.add_sized(vec![(1, "a"), (4, "a")]);
    merger.add_sized(vec![(1, "b"), (2, "b"), (9, "b")]);

    let map = merger.create_btree_map(MatchingKeyPolicy::ChooseEarliest).unwrap();
    assert_eq!(map.len(), 4);
    assert_eq!(map[&1], "a");
}

#[test]
fn test_unsorted_passes_silently_by_default() {
    let merger = SortedMerger::new();
    merger.add_sized(vec![(5, "bad"), (3, "bad")]);

    let result = merger.iter(MatchingKeyPolicy::DontCare).into_vec().unwrap();
    assert_eq!(result.len(), 2);
}

// =============================================================================
// Size Hint Tests
// =============================================================================

#[test]
fn test_overstated_hint_reported() {
    let merger = checked_hints();
    merger.add(vec![(1, "a"), (2, "a")], 3);

    match merger.iter(MatchingKeyPolicy::DontCare).into_vec() {
        Err(AccumergeError::SizeHintMismatch { age, hint, actual }) => {
            assert_eq!((age, hint, actual), (0, 3, 2));
        }
        other => panic!("expected SizeHintMismatch, got {:?}", other),
    }
}

#[test]
fn test_understated_hint_reported() {
    let merger = checked_hints();
    merger.add(vec![(1, "a")], 1);
    merger.add(vec![(2, "b"), (3, "b")], 1);

    let result = merger.iter(MatchingKeyPolicy::DontCare).into_vec();
    assert!(matches!(
        result,
        Err(AccumergeError::SizeHintMismatch { age: 1, hint: 1, actual: 2 })
    ));
}

#[test]
fn test_empty_source_with_nonzero_hint() {
    let merger = checked_hints();
    merger.add(Vec::new(), 4);

    let result = merger.iter(MatchingKeyPolicy::DontCare).into_vec();
    assert!(matches!(
        result,
        Err(AccumergeError::SizeHintMismatch { age: 0, hint: 4, actual: 0 })
    ));
}

#[test]
fn test_collision_skips_count_toward_hint() {
    let merger = checked_hints();
    merger.add_sized(vec![(1, "a"), (2, "a")]);
    merger.add_sized(vec![(1, "b"), (2, "b")]);

    let result = merger.iter(MatchingKeyPolicy::ChooseLatest).into_vec().unwrap();
    assert_eq!(result, vec![(1, "b"), (2, "b")]);
}

#[test]
fn test_exact_hints_pass() {
    let merger = checked_hints();
    merger.add_sized(vec![(1, "a"), (3, "a")]);
    merger.add_sized(vec![(2, "b")]);
    assert_eq!(merger.iter(MatchingKeyPolicy::DontCare).count(), 3);
}

#[test]
fn test_error_display() {
    let err = AccumergeError::SizeHintMismatch {
        age: 2,
        hint: 10,
        actual: 7,
    };
    assert_eq!(
        err.to_string(),
        "Source #2 size hint mismatch: hinted 10, yielded 7"
    );
}
