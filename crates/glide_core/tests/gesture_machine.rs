//! Gesture flows on the table-driven state machine
//!
//! These tests verify that:
//! - Guards observe state shared with the gesture handler
//! - Entry callbacks can drive geometry kept outside the machine
//! - Events without a row never disturb the current state

use glide_core::{Rect, StateMachine, Transition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Refresh {
    Idle,
    Pulling,
    Loading,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Touch {
    Down,
    Up,
    Done,
}

#[test]
fn test_guarded_release_only_loads_past_threshold() {
    let armed = Arc::new(AtomicBool::new(false));
    let guard_armed = armed.clone();
    let guard_disarmed = armed.clone();

    let mut fsm = StateMachine::builder(Refresh::Idle)
        .on(Refresh::Idle, Touch::Down, Refresh::Pulling)
        .transition(
            Transition::new(Refresh::Pulling, Touch::Up, Refresh::Loading)
                .with_guard(move || guard_armed.load(Ordering::SeqCst)),
        )
        .transition(
            Transition::new(Refresh::Pulling, Touch::Up, Refresh::Idle)
                .with_guard(move || !guard_disarmed.load(Ordering::SeqCst)),
        )
        .on(Refresh::Loading, Touch::Done, Refresh::Idle)
        .build();

    fsm.send(Touch::Down);
    assert_eq!(fsm.send(Touch::Up), Refresh::Idle);

    fsm.send(Touch::Down);
    armed.store(true, Ordering::SeqCst);
    assert_eq!(fsm.send(Touch::Up), Refresh::Loading);
    assert_eq!(fsm.send(Touch::Done), Refresh::Idle);
}

#[test]
fn test_entry_callback_collapses_geometry() {
    let spinner = Arc::new(Mutex::new(Rect::new(0.0, 0.0, 40.0, 60.0)));
    let collapse = spinner.clone();

    let mut fsm = StateMachine::builder(Refresh::Loading)
        .on(Refresh::Loading, Touch::Done, Refresh::Idle)
        .on_enter(Refresh::Idle, move || {
            if let Ok(mut rect) = collapse.lock() {
                rect.size.height = 0.0;
            }
        })
        .build();

    fsm.send(Touch::Done);
    assert_eq!(spinner.lock().unwrap().height(), 0.0);
}

#[test]
fn test_unknown_events_keep_state_and_history() {
    let mut fsm: StateMachine<Refresh, Touch> = StateMachine::builder(Refresh::Idle)
        .on(Refresh::Idle, Touch::Down, Refresh::Pulling)
        .build();

    assert!(fsm.try_send(Touch::Done).is_none());
    assert!(fsm.try_send(Touch::Up).is_none());
    assert!(fsm.is_in(Refresh::Idle));
    assert!(fsm.history().is_empty());
    assert!(fsm.can_send(Touch::Down));
}
