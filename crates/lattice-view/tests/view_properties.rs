//! Property tests: after any sequence of operations the view equals
//! `sort(filter(source))`.

use std::sync::Arc;

use lattice_view::model::{ChangeSet, FilteredView};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(i32),
    AddRange(Vec<i32>),
    Remove(i32),
    RemoveAbove(i32),
    FilterMultiplesOf(i32),
    ClearFilter,
    SortAscending,
    SortDescending,
    Resort,
    ClearSort,
    Refresh(i32),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortMode {
    None,
    Ascending,
    Descending,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..40i32).prop_map(Op::Add),
        2 => proptest::collection::vec(0..40i32, 0..10).prop_map(Op::AddRange),
        3 => (0..40i32).prop_map(Op::Remove),
        1 => (0..40i32).prop_map(Op::RemoveAbove),
        1 => (2..5i32).prop_map(Op::FilterMultiplesOf),
        1 => Just(Op::ClearFilter),
        1 => Just(Op::SortAscending),
        1 => Just(Op::SortDescending),
        1 => Just(Op::Resort),
        1 => Just(Op::ClearSort),
        1 => (0..40i32).prop_map(Op::Refresh),
        1 => Just(Op::Clear),
    ]
}

fn expected(source: &[i32], filter: Option<i32>, sort: SortMode) -> Vec<i32> {
    let mut visible: Vec<i32> = source
        .iter()
        .copied()
        .filter(|x| filter.is_none_or(|m| x % m == 0))
        .collect();
    match sort {
        SortMode::None => {}
        SortMode::Ascending => visible.sort(),
        SortMode::Descending => visible.sort_by(|a, b| b.cmp(a)),
    }
    visible
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_view_matches_filtered_sorted_source(
        initial in proptest::collection::vec(0..40i32, 0..20),
        ops in proptest::collection::vec(op_strategy(), 1..40)
    ) {
        let view = FilteredView::builder().items(initial).build();
        let mut filter: Option<i32> = None;
        let mut sort = SortMode::None;

        for op in ops {
            match op {
                Op::Add(x) => view.add(x).unwrap(),
                Op::AddRange(xs) => view.add_range(xs).unwrap(),
                Op::Remove(x) => {
                    view.remove(&x).unwrap();
                }
                Op::RemoveAbove(limit) => {
                    view.remove_where(|x| *x > limit).unwrap();
                }
                Op::FilterMultiplesOf(m) => {
                    view.filter(move |x: &i32| x % m == 0).unwrap();
                    filter = Some(m);
                }
                Op::ClearFilter => {
                    view.clear_filter().unwrap();
                    filter = None;
                }
                Op::SortAscending => {
                    view.sort().unwrap();
                    sort = SortMode::Ascending;
                }
                Op::SortDescending => {
                    view.sort_by(|a: &i32, b: &i32| b.cmp(a)).unwrap();
                    sort = SortMode::Descending;
                }
                Op::Resort => view.resort().unwrap(),
                Op::ClearSort => {
                    view.clear_sort().unwrap();
                    sort = SortMode::None;
                }
                Op::Refresh(x) => {
                    view.refresh(&x).unwrap();
                }
                Op::Clear => view.clear().unwrap(),
            }

            let source = view.source_snapshot();
            prop_assert_eq!(view.items(), expected(&source, filter, sort));
            prop_assert_eq!(view.filtered_out_count(), source.len() - view.count());
            prop_assert_eq!(view.is_sorted(), sort != SortMode::None);
        }
    }

    #[test]
    fn test_minimal_moves_reach_sorted_order(
        items in proptest::collection::vec(0..20i32, 0..30)
    ) {
        let mut target = items.clone();
        target.sort();
        let plan = ChangeSet::minimal_moves(&items, &target, |a, b| a == b);

        let mut working = items.clone();
        for change in &plan {
            let from = change.previous_index().unwrap();
            let item = working.remove(from);
            working.insert(change.current_index(), item);
        }

        prop_assert_eq!(&working, &target);
        prop_assert!(plan.moves() <= items.len().saturating_sub(1));
    }

    #[test]
    fn test_sort_notifies_once_or_with_moves_only(
        items in proptest::collection::vec(0..50i32, 0..30)
    ) {
        let view = FilteredView::builder().items(items.clone()).build();
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = events.clone();
        view.view()
            .changed()
            .connect(move |change: &lattice_view::model::CollectionChange<i32>| {
                sink.lock().push(change.kind())
            });

        view.sort().unwrap();

        let mut sorted = items.clone();
        sorted.sort();
        prop_assert_eq!(view.items(), sorted);

        let kinds = events.lock().clone();
        let resets = kinds
            .iter()
            .filter(|k| **k == lattice_view::model::ChangeKind::Reset)
            .count();
        prop_assert!(resets == 0 || kinds.len() == 1);
        if resets == 0 {
            prop_assert!(kinds.len() <= items.len() / 3);
        }
    }
}

#[test]
fn test_expected_helper() {
    assert_eq!(
        expected(&[5, 3, 6, 9, 2], Some(3), SortMode::Ascending),
        vec![3, 6, 9]
    );
    assert_eq!(expected(&[5, 3, 6], None, SortMode::None), vec![5, 3, 6]);
}
