#![forbid(unsafe_code)]

//! Integration tests: what screens can do to their stack, delegate
//! callbacks, destination registration, typed paths, and shutdown.

use std::cell::RefCell;
use std::rc::Rc;

use navkit_core::{
    AnyValue, CodableRepresentation, Issue, IssueCapture, NavigationId, NavigationPath, type_tag,
    without_animation,
};
use navkit_harness::{Harness, RecordingStack, StackOp, TestScreen, int_ids};
use navkit_runtime::{Binding, Observable, RunLoop};
use navkit_stack::{NavigationStack, ScreenContext, ScreenId, StackDelegate};

fn settled(values: &[i32]) -> Harness {
    let h = Harness::new(NavigationPath::from_values(values.iter().copied())).with_ints();
    h.settle();
    h.take_ops();
    h
}

fn context(h: &Harness, index: usize) -> ScreenContext {
    h.context(index).expect("screen exists")
}

// ============================================================================
// Dismiss
// ============================================================================

#[test]
fn dismiss_removes_screen_and_everything_above() {
    let h = settled(&[1, 2, 3]);
    context(&h, 2).dismiss();
    assert_eq!(h.path_ids(), int_ids([1, 2, 3]), "dismiss runs on the next turn");

    h.settle();
    assert_eq!(h.path_ids(), int_ids([1]));
    assert_eq!(h.labels(), vec!["root", "int 1"]);
}

#[test]
fn dismiss_top_pops() {
    let h = settled(&[1, 2]);
    context(&h, 2).dismiss();
    h.settle();
    assert_eq!(h.take_ops(), vec![StackOp::Pop { animated: true }]);
    assert_eq!(h.path_ids(), int_ids([1]));
}

#[test]
fn dismiss_keeps_callers_animation_intent() {
    let h = settled(&[1, 2, 3]);
    without_animation(|| context(&h, 3).dismiss());
    h.settle();
    assert_eq!(h.take_ops(), vec![StackOp::Pop { animated: false }]);

    context(&h, 2).dismiss();
    h.settle();
    assert_eq!(h.take_ops(), vec![StackOp::Pop { animated: true }]);
}

#[test]
fn dismissing_root_is_redundant() {
    let h = settled(&[1]);
    let capture = IssueCapture::start();
    context(&h, 0).dismiss();
    h.settle();
    assert_eq!(capture.issues(), vec![Issue::RedundantDismissal]);
    assert_eq!(h.path_ids(), int_ids([1]));
}

#[test]
fn dismissing_departed_screen_is_redundant() {
    let h = settled(&[1, 2]);
    let departed = context(&h, 2);
    h.path.update(|p| p.remove_last(1));
    h.settle();

    let capture = IssueCapture::start();
    departed.dismiss();
    h.settle();
    assert_eq!(capture.issues(), vec![Issue::RedundantDismissal]);
    assert_eq!(h.path_ids(), int_ids([1]));
}

#[test]
fn detached_context_reports_every_action() {
    let capture = IssueCapture::start();
    let detached = ScreenContext::detached();
    detached.dismiss();
    detached.push_value(1);
    assert!(!detached.is_presented());
    assert_eq!(
        capture.issues(),
        vec![
            Issue::RedundantDismissal,
            Issue::OutsideNavigationContext { action: "push" },
        ]
    );
}

// ============================================================================
// Push and presentation
// ============================================================================

#[test]
fn context_push_appends_to_path() {
    let h = settled(&[1]);
    context(&h, 1).push_value(7);
    h.settle();
    assert_eq!(h.path_ids(), int_ids([1, 7]));
    assert_eq!(h.labels(), vec!["root", "int 1", "int 7"]);
}

#[test]
fn context_push_codable_is_persistable() {
    let h = Harness::new(NavigationPath::new());
    h.stack
        .codable_navigation_destination(|n: i32| TestScreen::new(format!("int {n}")));
    h.settle();

    context(&h, 0).push_codable(3);
    h.settle();
    let json = h.path.get().codable().and_then(|c| c.to_json().ok());
    assert_eq!(json.as_deref(), Some(r#"["i32","3"]"#));
}

#[test]
fn stack_push_value_appends() {
    let h = settled(&[]);
    h.stack.push_value(4);
    h.settle();
    assert_eq!(h.labels(), vec!["root", "int 4"]);
    assert_eq!(h.stack.path(), int_ids([4]));
}

#[test]
fn presentation_tracks_path_screens() {
    let h = settled(&[1, 2]);
    let root = context(&h, 0);
    let top = context(&h, 2);
    assert!(!root.is_presented());
    assert!(top.is_presented());
    assert_eq!(
        top.screen_id().and_then(|id| h.stack.navigation_id(id)),
        Some(NavigationId::eager(2))
    );

    h.path.update(|p| p.remove_last(1));
    h.settle();
    assert!(!top.is_presented());
}

#[test]
fn root_id_is_the_bottom_screen() {
    let h = settled(&[1]);
    assert_eq!(h.stack.root_id(), h.screen_ids().first().copied());
}

// ============================================================================
// Delegate
// ============================================================================

#[derive(Clone, Default)]
struct ShowLog(Rc<RefCell<Vec<(&'static str, ScreenId, bool)>>>);

impl StackDelegate for ShowLog {
    fn will_show(&self, screen: ScreenId, animated: bool) {
        self.0.borrow_mut().push(("will", screen, animated));
    }

    fn did_show(&self, screen: ScreenId, animated: bool) {
        self.0.borrow_mut().push(("did", screen, animated));
    }
}

#[test]
fn delegate_sees_show_events() {
    let h = settled(&[]);
    let log = ShowLog::default();
    h.stack.set_delegate(log.clone());

    h.path.update(|p| p.append(1));
    h.settle();
    let shown = h.screen_ids()[1];
    assert_eq!(
        *log.0.borrow(),
        vec![("will", shown, true), ("did", shown, true)]
    );

    h.stack.clear_delegate();
    h.path.update(|p| p.append(2));
    h.settle();
    assert_eq!(log.0.borrow().len(), 2);
}

#[test]
fn delegate_sees_user_pops() {
    let h = settled(&[1]);
    let log = ShowLog::default();
    h.stack.set_delegate(log.clone());

    h.back_swipe();
    h.settle();
    let root = h.screen_ids()[0];
    assert_eq!(*log.0.borrow(), vec![("will", root, true), ("did", root, true)]);
}

// ============================================================================
// Destination registration
// ============================================================================

#[test]
fn late_registration_resolves_without_animation() {
    let h = Harness::new(NavigationPath::new());
    h.settle();
    h.take_ops();

    h.path
        .set(NavigationPath::from_erased([AnyValue::new(9_i64)]));
    h.stack
        .navigation_destination(|n: i64| TestScreen::new(format!("long {n}")));
    h.settle();

    assert_eq!(h.take_ops(), vec![StackOp::Push { animated: false }]);
    assert_eq!(h.labels(), vec!["root", "long 9"]);
    assert_eq!(h.path_ids(), vec![NavigationId::eager(9_i64)]);
}

#[test]
fn late_codable_registration_decodes() {
    let h = Harness::new(NavigationPath::new());
    h.settle();

    let json = format!(r#"["{}","true"]"#, type_tag::<bool>());
    h.path.set(NavigationPath::from_codable(
        CodableRepresentation::from_json(&json).expect("parses"),
    ));
    h.stack
        .codable_navigation_destination(|b: bool| TestScreen::new(format!("flag {b}")));
    h.settle();

    assert_eq!(h.labels(), vec!["root", "flag true"]);
    assert_eq!(h.path_ids(), vec![NavigationId::eager(true)]);
}

#[test]
fn plain_registration_cannot_decode() {
    let json = format!(r#"["{}","2"]"#, type_tag::<i32>());
    let h = Harness::new(NavigationPath::from_codable(
        CodableRepresentation::from_json(&json).expect("parses"),
    ))
    .with_ints();
    let capture = IssueCapture::start();
    h.settle();

    assert_eq!(h.labels(), vec!["root"]);
    assert!(matches!(
        capture.issues().as_slice(),
        [Issue::DecodeFailed { index: 0, .. }]
    ));
}

#[test]
fn unregistered_lazy_element_is_reported() {
    let h = Harness::new(NavigationPath::from_erased([AnyValue::new(1_i64)])).with_ints();
    let capture = IssueCapture::start();
    h.settle();

    assert_eq!(h.labels(), vec!["root"]);
    assert_eq!(
        capture.issues(),
        vec![Issue::UnregisteredDestination {
            type_name: "i64".into()
        }]
    );
}

#[test]
fn last_registration_wins() {
    let h = settled(&[]);
    h.stack
        .navigation_destination(|n: i32| TestScreen::new(format!("second {n}")));
    h.stack.push_value(1);
    h.settle();
    assert_eq!(h.labels(), vec!["root", "second 1"]);
    assert_eq!(h.stack.registry().len(), 1);
}

// ============================================================================
// Typed paths
// ============================================================================

struct TypedHarness {
    run_loop: RunLoop,
    values: Observable<Vec<u32>>,
    stack: NavigationStack<RecordingStack<TestScreen>>,
}

impl TypedHarness {
    fn new(initial: Vec<u32>) -> Self {
        let run_loop = RunLoop::new();
        let values = Observable::new(initial);
        let stack = NavigationStack::with_typed_path(
            RecordingStack::new(),
            &Binding::new(&values),
            || TestScreen::new("root"),
            &run_loop,
        );
        stack.navigation_destination(|n: u32| TestScreen::new(format!("u32 {n}")));
        run_loop.run_until_idle();
        Self {
            run_loop,
            values,
            stack,
        }
    }

    fn labels(&self) -> Vec<String> {
        self.stack
            .executor()
            .inner()
            .screens()
            .map(|s| s.label.clone())
            .collect()
    }

    fn context(&self, index: usize) -> ScreenContext {
        self.stack
            .executor()
            .inner()
            .slots()
            .nth(index)
            .map(|s| s.context.clone())
            .expect("screen exists")
    }
}

#[test]
fn typed_path_drives_stack() {
    let t = TypedHarness::new(vec![1, 2]);
    assert_eq!(t.labels(), vec!["root", "u32 1", "u32 2"]);

    t.values.update(|v| v.push(3));
    t.run_loop.run_until_idle();
    assert_eq!(t.labels(), vec!["root", "u32 1", "u32 2", "u32 3"]);
}

#[test]
fn typed_path_follows_user_pops() {
    let t = TypedHarness::new(vec![1, 2]);
    t.stack.executor_mut().inner_mut().interactive_pop();
    t.run_loop.run_until_idle();
    assert_eq!(t.values.get(), vec![1]);
}

#[test]
fn typed_path_dismiss_truncates() {
    let t = TypedHarness::new(vec![5, 6, 7]);
    t.context(2).dismiss();
    t.run_loop.run_until_idle();
    assert_eq!(t.values.get(), vec![5]);
    assert_eq!(t.labels(), vec!["root", "u32 5"]);
}

#[test]
fn typed_path_rejects_other_types() {
    let t = TypedHarness::new(vec![1]);
    let capture = IssueCapture::start();
    t.context(1).push_value("two".to_string());
    t.run_loop.run_until_idle();

    assert_eq!(t.values.get(), vec![1]);
    assert_eq!(
        capture.issues(),
        vec![Issue::PathTypeMismatch {
            expected: "u32",
            found: "alloc::string::String".into()
        }]
    );
}

// ============================================================================
// Shutdown
// ============================================================================

#[test]
fn stopped_stack_ignores_path_changes() {
    let h = settled(&[1]);
    h.stack.stop();
    assert!(h.stack.is_stopped());

    h.path.update(|p| p.append(2));
    h.settle();
    assert!(h.take_ops().is_empty());
    assert_eq!(h.labels(), vec!["root", "int 1"]);
}

#[test]
fn stopped_stack_rejects_screen_actions() {
    let h = settled(&[1]);
    let top = context(&h, 1);
    h.stack.stop();

    let capture = IssueCapture::start();
    top.push_value(2);
    top.dismiss();
    h.settle();

    assert!(!top.is_presented());
    assert_eq!(
        capture.issues(),
        vec![
            Issue::OutsideNavigationContext { action: "push" },
            Issue::OutsideNavigationContext { action: "dismiss" },
        ]
    );
    assert_eq!(h.path_ids(), int_ids([1]));
}

#[test]
fn dropped_stack_detaches_contexts() {
    let h = settled(&[1]);
    let top = context(&h, 1);
    let Harness { stack, path, .. } = h;
    drop(stack);

    let capture = IssueCapture::start();
    top.push_value(2);
    assert_eq!(path.get().len(), 1);
    assert_eq!(capture.len(), 1);
    assert_eq!(path.subscriber_count(), 0);
}
