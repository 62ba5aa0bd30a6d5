//! Ownership-layering tests: widgets above actions, callbacks in between.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rstest::rstest;

use owntree::{same_entity, weak_callback, Action, WeakRef, Widget};

// ============================================================
// Callbacks
// ============================================================

#[rstest]
fn given_action_with_callback_when_invoked_then_callback_runs() {
    common::init_test_setup();
    let action = Action::create();
    action.set_name("counter");
    assert_eq!(action.name(), "counter");

    let hits = Arc::new(AtomicUsize::new(0));
    action.set_callback(Box::new({
        let hits = hits.clone();
        move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    }));

    action.invoke();
    action.invoke();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[rstest]
fn given_action_without_callback_when_invoked_then_nothing_happens() {
    common::init_test_setup();
    let action = Action::create();
    action.invoke();
}

#[rstest]
fn given_widget_with_action_when_triggering_then_callback_runs() {
    common::init_test_setup();
    let widget = Widget::create();
    let action = Action::create();

    let hits = Arc::new(AtomicUsize::new(0));
    action.set_callback(Box::new({
        let hits = hits.clone();
        move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    }));

    // Without an action the trigger is a no-op.
    widget.trigger_action();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(widget.action().resolve().is_none());

    widget.set_action(&action);
    assert!(same_entity(&widget.action(), &action));

    widget.trigger_action();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[rstest]
fn given_widget_with_action_then_widget_keeps_action_alive() {
    common::init_test_setup();
    let widget = Widget::create();
    let action = Action::create();
    let action_monitor = WeakRef::from(&action);

    widget.set_action(&action);
    assert_eq!(action_monitor.strong_count(), 2); // `action` + the widget

    drop(action);
    assert_eq!(action_monitor.strong_count(), 1); // the widget alone
    assert!(action_monitor.resolve().is_some());

    drop(widget);
    assert_eq!(action_monitor.strong_count(), 0);
}

// ============================================================
// Capture-Cycle Hazard
// ============================================================

/// The defect scenario: the callback captures a strong reference to the
/// widget that owns the action, closing the cycle
/// widget → action → callback → widget. Releasing the external references
/// then releases nothing.
#[rstest]
fn given_callback_capturing_strong_widget_when_externals_released_then_both_leak() {
    common::init_test_setup();
    let widget = Widget::create();
    let action = Action::create();
    let widget_monitor = WeakRef::from(&widget);
    let action_monitor = WeakRef::from(&action);

    let captured = widget.clone();
    action.set_callback(Box::new(move || {
        captured.set_name("from callback");
    }));
    widget.set_action(&action);

    widget.trigger_action();
    assert_eq!(widget.name(), "from callback");

    drop(widget);
    drop(action);

    // Nothing was destroyed: the callback still owns the widget, the
    // widget still owns the action.
    assert_eq!(widget_monitor.strong_count(), 1);
    assert_eq!(action_monitor.strong_count(), 1);
    assert!(widget_monitor.resolve().is_some());
    assert!(action_monitor.resolve().is_some());
}

/// The mitigation: the callback captures a weak reference and resolves it
/// at invocation time. Lifetimes stay one-directional and both entities
/// are destroyed with their last external reference.
#[rstest]
fn given_callback_capturing_weak_widget_when_externals_released_then_widget_is_destroyed() {
    common::init_test_setup();
    let widget = Widget::create();
    let action = Action::create();
    let widget_monitor = WeakRef::from(&widget);
    let action_monitor = WeakRef::from(&action);

    action.set_callback(weak_callback(&widget, |widget| {
        widget.set_name("from callback");
    }));
    widget.set_action(&action);

    widget.trigger_action();
    assert_eq!(widget.name(), "from callback");

    drop(widget);
    assert_eq!(widget_monitor.strong_count(), 0);
    assert!(widget_monitor.resolve().is_none());

    // The widget is gone; invoking the action is now a no-op.
    action.invoke();

    drop(action);
    assert_eq!(action_monitor.strong_count(), 0);
}
