//! Accumulator Tests
//!
//! Tests verify:
//! - LIFO order of adds, takes and drains
//! - add_if_empty atomicity
//! - Snapshot immutability and repeatability
//! - Concurrent adds lose nothing and duplicate nothing
//! - Deep chains drop without recursion

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use accumerge::accumulator::{Accumulator, ItemRef};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_accumulator_is_empty() {
    let acc: Accumulator<u32> = Accumulator::new();
    assert!(acc.is_empty());
    assert!(acc.peek().is_none());
    assert!(acc.take().is_none());
    assert!(acc.clear_and_iterable().is_empty());
}

#[test]
fn test_drain_is_reverse_of_add_order() {
    let acc = Accumulator::new();
    for i in 0..100 {
        acc.add(i);
    }

    let drained: Vec<i32> = acc.clear_and_iter().collect();
    let expected: Vec<i32> = (0..100).rev().collect();
    assert_eq!(drained, expected);
    assert!(acc.is_empty());
}

#[test]
fn test_take_pops_most_recent() {
    let acc = Accumulator::new();
    acc.add("a");
    acc.add("b");
    acc.add("c");

    assert_eq!(*acc.take().unwrap(), "c");
    assert_eq!(*acc.take().unwrap(), "b");
    assert_eq!(*acc.take().unwrap(), "a");
    assert!(acc.take().is_none());
    assert!(acc.is_empty());
}

#[test]
fn test_peek_is_idempotent() {
    let acc = Accumulator::new();
    acc.add(1);
    acc.add(2);

    let first = acc.peek().unwrap();
    let second = acc.peek().unwrap();
    assert_eq!(*first, 2);
    assert!(ItemRef::ptr_eq(&first, &second));
    assert_eq!(acc.iterable().len(), 2);
}

#[test]
fn test_add_if_empty() {
    let acc = Accumulator::new();
    assert!(acc.add_if_empty(10));
    assert!(!acc.add_if_empty(20));

    let items: Vec<i32> = acc.iterable().iter().copied().collect();
    assert_eq!(items, vec![10]);
}

#[test]
fn test_clear_discards_items() {
    let acc = Accumulator::new();
    acc.add_all(0..10);
    acc.clear();
    assert!(acc.is_empty());
    assert_eq!(acc.iterable().len(), 0);
}

#[test]
fn test_from_iter_keeps_input_order() {
    let acc: Accumulator<i32> = vec![1, 2, 3].into_iter().collect();
    let items: Vec<i32> = acc.iterable().iter().copied().collect();
    assert_eq!(items, vec![1, 2, 3]);

    acc.add(0);
    assert_eq!(*acc.peek().unwrap(), 0);
}

#[test]
fn test_extend_prepends_each() {
    let mut acc = Accumulator::new();
    acc.extend(["x", "y"]);
    assert_eq!(format!("{:?}", acc), r#"["y", "x"]"#);
}

#[test]
fn test_item_ref_into_inner() {
    let acc = Accumulator::new();
    acc.add(String::from("only"));

    let item = acc.take().unwrap();
    assert_eq!(item.into_inner(), Some(String::from("only")));
}

#[test]
fn test_item_ref_shared_with_snapshot() {
    let acc = Accumulator::new();
    acc.add(String::from("shared"));
    let snapshot = acc.iterable();

    let item = acc.take().unwrap();
    assert_eq!(item.into_inner(), None);
    assert_eq!(snapshot.peek().map(String::as_str), Some("shared"));
}

#[test]
fn test_taken_item_keeps_older_items_alive() {
    let older = Arc::new(());
    let acc = Accumulator::new();
    acc.add(Arc::clone(&older));
    acc.add(Arc::new(()));

    let newest = acc.take().unwrap();
    acc.clear();
    drop(acc);
    assert_eq!(Arc::strong_count(&older), 2);

    drop(newest);
    assert_eq!(Arc::strong_count(&older), 1);
}

// =============================================================================
// Snapshot Tests
// =============================================================================

#[test]
fn test_snapshot_ignores_later_adds() {
    let acc = Accumulator::new();
    acc.add(1);
    acc.add(2);

    let snapshot = acc.iterable();
    acc.add(3);
    acc.take();

    let first: Vec<i32> = snapshot.iter().copied().collect();
    let second: Vec<i32> = snapshot.iter().copied().collect();
    assert_eq!(first, vec![2, 1]);
    assert_eq!(first, second);
    assert_eq!(snapshot.peek(), Some(&2));
}

#[test]
fn test_drained_snapshot_is_independent() {
    let acc = Accumulator::new();
    acc.add_all([1, 2, 3]);

    let drained = acc.clear_and_iterable();
    acc.add(4);

    assert_eq!(drained.len(), 3);
    assert_eq!(drained.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    assert_eq!(acc.iterable().iter().copied().collect::<Vec<_>>(), vec![4]);
}

#[test]
fn test_into_iter_clones_shared_nodes() {
    let acc = Accumulator::new();
    acc.add_all([String::from("a"), String::from("b")]);

    let kept = acc.iterable();
    let drained: Vec<String> = acc.clear_and_iter().collect();

    assert_eq!(drained, vec!["b", "a"]);
    assert_eq!(kept.iter().collect::<Vec<_>>(), vec!["b", "a"]);
}

#[test]
fn test_deep_chain_drops_without_overflow() {
    let acc = Accumulator::new();
    for i in 0..1_000_000u32 {
        acc.add(i);
    }
    let snapshot = acc.clear_and_iterable();
    assert_eq!(snapshot.peek(), Some(&999_999));
    drop(snapshot);
    drop(acc);
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_adds_lose_nothing() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 10_000;

    let acc = Arc::new(Accumulator::new());
    let mut handles = vec![];

    for t in 0..THREADS {
        let acc = Arc::clone(&acc);
        handles.push(thread::spawn(move || {
            for i in 0..PER_THREAD {
                acc.add((t, i));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let drained: Vec<(usize, usize)> = acc.clear_and_iter().collect();
    assert_eq!(drained.len(), THREADS * PER_THREAD);

    let unique: HashSet<_> = drained.iter().copied().collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);

    // Each producer's items stay in reverse order relative to each other
    for t in 0..THREADS {
        let own: Vec<usize> = drained.iter().filter(|(p, _)| *p == t).map(|(_, i)| *i).collect();
        let expected: Vec<usize> = (0..PER_THREAD).rev().collect();
        assert_eq!(own, expected);
    }
}

#[test]
fn test_concurrent_add_if_empty_single_winner() {
    for _ in 0..200 {
        let acc = Arc::new(Accumulator::new());
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["A", "B"]
            .into_iter()
            .map(|marker| {
                let acc = Arc::clone(&acc);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    acc.add_if_empty(marker)
                })
            })
            .collect();

        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|won| **won).count(), 1);

        let items: Vec<&str> = acc.iterable().iter().copied().collect();
        let winner = if results[0] { "A" } else { "B" };
        assert_eq!(items, vec![winner]);
    }
}

#[test]
fn test_concurrent_take_and_add() {
    const ITEMS: usize = 20_000;

    let acc = Arc::new(Accumulator::new());
    let producer = {
        let acc = Arc::clone(&acc);
        thread::spawn(move || {
            for i in 0..ITEMS {
                acc.add(i);
            }
        })
    };
    let consumer = {
        let acc = Arc::clone(&acc);
        thread::spawn(move || {
            let mut taken = Vec::new();
            while taken.len() < ITEMS / 2 {
                if let Some(item) = acc.take() {
                    taken.push(*item);
                }
            }
            taken
        })
    };

    producer.join().unwrap();
    let mut taken = consumer.join().unwrap();
    taken.extend(acc.clear_and_iter());

    taken.sort_unstable();
    let expected: Vec<usize> = (0..ITEMS).collect();
    assert_eq!(taken, expected);
}
