#![forbid(unsafe_code)]

//! Model-based test: random path edits against a plain `Vec<i32>`.
//!
//! ```text
//!   ops ──┬──► model: Vec<i32>
//!         │
//!         └──► Observable<NavigationPath> ──► NavigationStack ──► RecordingStack
//!                                                                    │
//!   after each settle: model == path == live ids == screen labels ◄──┘
//! ```
//!
//! Edits include user back gestures and screen dismissals, which flow from
//! the stack back into the path instead of the other way around. Those are
//! only made once the stack has caught up: a path edit made before the
//! stack syncs a gesture wins over the gesture.

use navkit_core::NavigationPath;
use navkit_harness::{Harness, int_ids};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Append(i32),
    RemoveLast(usize),
    Replace(Vec<i32>),
    BackSwipe,
    Dismiss(usize),
    /// Apply a path edit without letting the run loop turn afterwards.
    Quick(Box<Op>),
}

fn path_edit() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..6_i32).prop_map(Op::Append),
        2 => (1..3_usize).prop_map(Op::RemoveLast),
        1 => prop::collection::vec(0..6_i32, 0..6).prop_map(Op::Replace),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => path_edit(),
        2 => Just(Op::BackSwipe),
        1 => (1..6_usize).prop_map(Op::Dismiss),
        2 => path_edit().prop_map(|op| Op::Quick(Box::new(op))),
    ]
}

fn caught_up(h: &Harness, model: &[i32]) -> bool {
    !h.stack.is_reconcile_pending() && h.labels() == expected_labels(model)
}

/// Apply `op` to the real stack and the model.
fn apply(h: &Harness, model: &mut Vec<i32>, op: &Op) {
    match op {
        Op::Append(n) => {
            h.path.update(|p| p.append(*n));
            model.push(*n);
        }
        Op::RemoveLast(k) => {
            h.path.update(|p| p.remove_last(*k));
            model.truncate(model.len().saturating_sub(*k));
        }
        Op::Replace(values) => {
            h.path
                .set(NavigationPath::from_values(values.iter().copied()));
            model.clone_from(values);
        }
        Op::BackSwipe => {
            if caught_up(h, model) && h.back_swipe().is_some() {
                model.pop();
            }
        }
        Op::Dismiss(index) => {
            if *index <= model.len() && caught_up(h, model) {
                if let Some(context) = h.context(*index) {
                    context.dismiss();
                    model.truncate(index - 1);
                }
            }
        }
        Op::Quick(inner) => {
            apply(h, model, inner);
            return;
        }
    }
    h.settle();
}

fn expected_labels(model: &[i32]) -> Vec<String> {
    std::iter::once("root".to_string())
        .chain(model.iter().map(|n| format!("int {n}")))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn stack_tracks_model(ops in prop::collection::vec(op(), 1..40)) {
        let h = Harness::new(NavigationPath::new()).with_ints();
        h.settle();
        let mut model = Vec::new();

        for op in &ops {
            apply(&h, &mut model, op);
        }
        h.settle();

        prop_assert_eq!(h.path_ids(), int_ids(model.iter().copied()));
        prop_assert_eq!(h.stack.live_ids(), int_ids(model.iter().copied()));
        prop_assert_eq!(h.labels(), expected_labels(&model));
        prop_assert!(!h.stack.is_reconcile_pending());
    }

    #[test]
    fn surviving_screens_keep_identity(
        initial in prop::collection::vec(0..4_i32, 0..6),
        next in prop::collection::vec(0..4_i32, 0..6),
    ) {
        let h = Harness::new(NavigationPath::from_values(initial.iter().copied())).with_ints();
        h.settle();
        let before: Vec<(String, u64)> = h.labels().into_iter().zip(h.serials()).collect();

        h.path.set(NavigationPath::from_values(next.iter().copied()));
        h.settle();
        let after: Vec<(String, u64)> = h.labels().into_iter().zip(h.serials()).collect();

        prop_assert_eq!(h.labels(), expected_labels(&next));
        prop_assert_eq!(after[0].1, before[0].1);
        // Every old serial still on screen sits under the same label.
        for (label, serial) in &after {
            if let Some((old_label, _)) = before.iter().find(|(_, s)| s == serial) {
                prop_assert_eq!(old_label, label);
            }
        }
        // A value present in both paths is never rebuilt while an
        // unclaimed old screen for it exists.
        for value in 0..4_i32 {
            let label = format!("int {value}");
            let old = before.iter().filter(|(l, _)| *l == label).count();
            let new = after.iter().filter(|(l, _)| *l == label).count();
            let reused = after
                .iter()
                .filter(|(l, s)| *l == label && before.iter().any(|(_, b)| b == s))
                .count();
            prop_assert_eq!(reused, old.min(new));
        }
    }
}
