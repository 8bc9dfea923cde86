//! State Machine Runtime
//!
//! Flat state machines for gesture and interaction flows, keyed by caller
//! enums. A machine is an explicit table of (state, event) -> state pairs:
//! - Guards (conditional transitions)
//! - Entry/exit actions
//! - Transition actions
//!
//! Events with no matching row are ignored and leave the state unchanged.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;

/// A guard function that determines if a transition should occur
pub type Guard = Box<dyn Fn() -> bool + Send>;

/// An action function executed during transitions
pub type Action = Box<dyn FnMut() + Send>;

/// A transition in the state machine
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
    pub guard: Option<Guard>,
    pub actions: SmallVec<[Action; 2]>,
}

impl<S, E> Transition<S, E> {
    /// Create a simple transition without guard or actions
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
            guard: None,
            actions: SmallVec::new(),
        }
    }

    /// Add a guard condition
    pub fn with_guard<F: Fn() -> bool + Send + 'static>(mut self, guard: F) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Add an action to execute during transition
    pub fn with_action<F: FnMut() + Send + 'static>(mut self, action: F) -> Self {
        self.actions.push(Box::new(action));
        self
    }
}

impl<S: PartialEq, E: PartialEq> Transition<S, E> {
    fn matches(&self, state: &S, event: &E) -> bool {
        self.from_state == *state
            && self.event == *event
            && self.guard.as_ref().map_or(true, |guard| guard())
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: Vec<Transition<S, E>>,
    entry_callbacks: FxHashMap<S, Vec<Action>>,
    exit_callbacks: FxHashMap<S, Vec<Action>>,
}

impl<S, E> StateMachineBuilder<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Debug,
{
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
            entry_callbacks: FxHashMap::default(),
            exit_callbacks: FxHashMap::default(),
        }
    }

    /// Add a transition
    pub fn transition(mut self, transition: Transition<S, E>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add a simple transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Add an entry action for a state
    pub fn on_enter<F: FnMut() + Send + 'static>(mut self, state: S, action: F) -> Self {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Add an exit action for a state
    pub fn on_exit<F: FnMut() + Send + 'static>(mut self, state: S, action: F) -> Self {
        self.exit_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
            entry_callbacks: self.entry_callbacks,
            exit_callbacks: self.exit_callbacks,
            history: Vec::new(),
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: Vec<Transition<S, E>>,
    entry_callbacks: FxHashMap<S, Vec<Action>>,
    exit_callbacks: FxHashMap<S, Vec<Action>>,
    /// History of state transitions (for debugging)
    history: Vec<(S, E, S)>,
}

impl<S, E> StateMachine<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Debug,
{
    /// Create a new state machine with an initial state and transitions
    pub fn new(initial_state: S, transitions: Vec<Transition<S, E>>) -> Self {
        Self {
            current_state: initial_state,
            transitions,
            entry_callbacks: FxHashMap::default(),
            exit_callbacks: FxHashMap::default(),
            history: Vec::new(),
        }
    }

    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Get transition history
    pub fn history(&self) -> &[(S, E, S)] {
        &self.history
    }

    /// Clear transition history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Check if an event can trigger a transition from current state
    pub fn can_send(&self, event: E) -> bool {
        let current = self.current_state;
        self.transitions.iter().any(|t| t.matches(&current, &event))
    }

    /// Send an event, returning the resulting state.
    ///
    /// The state is unchanged when no transition matches.
    pub fn send(&mut self, event: E) -> S {
        self.try_send(event).unwrap_or(self.current_state)
    }

    /// Send an event, returning the new state only if a transition fired
    pub fn try_send(&mut self, event: E) -> Option<S> {
        let current = self.current_state;

        let Some(idx) = self
            .transitions
            .iter()
            .position(|t| t.matches(&current, &event))
        else {
            tracing::trace!(state = ?current, ?event, "event ignored");
            return None;
        };

        // Get the target state before executing callbacks
        let to_state = self.transitions[idx].to_state;

        if let Some(callbacks) = self.exit_callbacks.get_mut(&current) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        for action in self.transitions[idx].actions.iter_mut() {
            action();
        }

        self.current_state = to_state;
        self.history.push((current, event, to_state));
        tracing::debug!(from = ?current, ?event, to = ?to_state, "state transition");

        if let Some(callbacks) = self.entry_callbacks.get_mut(&to_state) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        Some(to_state)
    }

    /// Register an entry callback for a state
    pub fn on_enter<F: FnMut() + Send + 'static>(&mut self, state: S, callback: F) {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }

    /// Register an exit callback for a state
    pub fn on_exit<F: FnMut() + Send + 'static>(&mut self, state: S, callback: F) {
        self.exit_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Pull {
        Idle,
        Below,
        Above,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Gesture {
        Begin,
        CrossUp,
        CrossDown,
        End,
    }

    fn pull_machine() -> StateMachine<Pull, Gesture> {
        StateMachine::new(
            Pull::Idle,
            vec![
                Transition::new(Pull::Idle, Gesture::Begin, Pull::Below),
                Transition::new(Pull::Below, Gesture::CrossUp, Pull::Above),
                Transition::new(Pull::Above, Gesture::CrossDown, Pull::Below),
                Transition::new(Pull::Below, Gesture::End, Pull::Idle),
                Transition::new(Pull::Above, Gesture::End, Pull::Idle),
            ],
        )
    }

    #[test]
    fn test_simple_transitions() {
        let mut fsm = pull_machine();
        assert_eq!(fsm.current_state(), Pull::Idle);

        fsm.send(Gesture::Begin);
        assert_eq!(fsm.current_state(), Pull::Below);

        fsm.send(Gesture::CrossUp);
        assert_eq!(fsm.current_state(), Pull::Above);

        fsm.send(Gesture::CrossDown);
        assert_eq!(fsm.current_state(), Pull::Below);

        fsm.send(Gesture::End);
        assert!(fsm.is_in(Pull::Idle));
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fsm = pull_machine();

        // CrossUp is not valid while idle
        assert_eq!(fsm.try_send(Gesture::CrossUp), None);
        assert_eq!(fsm.send(Gesture::CrossUp), Pull::Idle);
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn test_guard_conditions() {
        let enabled = Arc::new(Mutex::new(true));
        let enabled_clone = enabled.clone();

        let mut fsm = StateMachine::builder(Pull::Idle)
            .transition(
                Transition::new(Pull::Idle, Gesture::Begin, Pull::Below)
                    .with_guard(move || *enabled_clone.lock().unwrap()),
            )
            .on(Pull::Below, Gesture::End, Pull::Idle)
            .build();

        fsm.send(Gesture::Begin);
        assert_eq!(fsm.current_state(), Pull::Below);
        fsm.send(Gesture::End);

        *enabled.lock().unwrap() = false;

        // Guard fails - no transition
        assert!(!fsm.can_send(Gesture::Begin));
        fsm.send(Gesture::Begin);
        assert_eq!(fsm.current_state(), Pull::Idle);
    }

    #[test]
    fn test_entry_exit_callbacks() {
        let entry_count = Arc::new(Mutex::new(0));
        let exit_count = Arc::new(Mutex::new(0));

        let entry_clone = entry_count.clone();
        let exit_clone = exit_count.clone();

        let mut fsm = StateMachine::builder(Pull::Idle)
            .on(Pull::Idle, Gesture::Begin, Pull::Below)
            .on(Pull::Below, Gesture::End, Pull::Idle)
            .on_enter(Pull::Below, move || {
                *entry_clone.lock().unwrap() += 1;
            })
            .on_exit(Pull::Below, move || {
                *exit_clone.lock().unwrap() += 1;
            })
            .build();

        fsm.send(Gesture::Begin);
        assert_eq!(*entry_count.lock().unwrap(), 1);
        assert_eq!(*exit_count.lock().unwrap(), 0);

        fsm.send(Gesture::End);
        assert_eq!(*exit_count.lock().unwrap(), 1);

        fsm.send(Gesture::Begin);
        assert_eq!(*entry_count.lock().unwrap(), 2);
    }

    #[test]
    fn test_transition_actions_run_before_entry() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let action_log = log.clone();
        let entry_log = log.clone();

        let mut fsm = StateMachine::builder(Pull::Idle)
            .transition(
                Transition::new(Pull::Idle, Gesture::Begin, Pull::Below).with_action(move || {
                    action_log.lock().unwrap().push("action");
                }),
            )
            .on_enter(Pull::Below, move || {
                entry_log.lock().unwrap().push("enter");
            })
            .build();

        fsm.send(Gesture::Begin);
        assert_eq!(*log.lock().unwrap(), vec!["action", "enter"]);
    }

    #[test]
    fn test_history() {
        let mut fsm = pull_machine();

        fsm.send(Gesture::Begin);
        fsm.send(Gesture::CrossUp);

        let history = fsm.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], (Pull::Idle, Gesture::Begin, Pull::Below));
        assert_eq!(history[1], (Pull::Below, Gesture::CrossUp, Pull::Above));

        fsm.clear_history();
        assert!(fsm.history().is_empty());
    }
}
