//! Sinks that write into shared presentation state

use glide_animation::{Frame, SinkError};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Build a sink that applies `write` to the presentation state behind
/// `state`.
///
/// The sink holds a weak reference. Once the controller owning the state is
/// gone it reports [`SinkError::Detached`] instead of keeping it alive.
pub fn presentation_sink<T, F>(
    state: &Rc<RefCell<T>>,
    what: &'static str,
    mut write: F,
) -> impl FnMut(&Frame<'_>) -> Result<(), SinkError> + 'static
where
    T: 'static,
    F: FnMut(&mut T, &Frame<'_>) + 'static,
{
    let weak: Weak<RefCell<T>> = Rc::downgrade(state);
    move |frame: &Frame<'_>| -> Result<(), SinkError> {
        let state = weak.upgrade().ok_or(SinkError::Detached(what))?;
        let mut state = state.borrow_mut();
        write(&mut *state, frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glide_animation::{AnimationDriver, InterpolationTask, ManualFrameSource};

    #[test]
    fn test_detached_state_reports_error() {
        let clock = ManualFrameSource::new();
        let mut driver = AnimationDriver::new(clock.clone());
        let state = Rc::new(RefCell::new(0.0_f32));

        driver
            .start(
                InterpolationTask::scalar(0.0, 1.0, 1.0),
                presentation_sink(&state, "value", |value, frame| *value = frame.value(0)),
            )
            .unwrap();

        clock.advance(0.5);
        driver.tick();
        assert_eq!(*state.borrow(), 0.5);

        // The failing sink is isolated; the task still runs to completion
        drop(state);
        clock.advance(0.5);
        driver.tick();
        assert!(driver.is_empty());
    }
}
