//! Frame sources
//!
//! A [`FrameSource`] is the display-refresh collaborator injected into an
//! [`AnimationDriver`](crate::AnimationDriver). It supplies the clock and is
//! told when the driver needs per-frame callbacks (armed) and when it no
//! longer does (disarmed).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// Clock and callback control for one driver
pub trait FrameSource {
    /// Current time in seconds. Must not go backwards.
    fn now(&self) -> f64;

    /// Start delivering `tick()` calls every frame
    fn arm(&mut self);

    /// Stop delivering `tick()` calls
    fn disarm(&mut self);
}

/// Monotonic wall clock. The host loop polls [`is_armed`](Self::is_armed)
/// to decide whether to keep requesting frames.
#[derive(Debug)]
pub struct SystemFrameSource {
    epoch: Instant,
    armed: bool,
}

impl SystemFrameSource {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            armed: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl Default for SystemFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SystemFrameSource {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn arm(&mut self) {
        self.armed = true;
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

#[derive(Debug, Default)]
struct ManualState {
    now: f64,
    armed: bool,
    arm_count: u32,
    disarm_count: u32,
}

/// Hand-cranked clock for tests and scripted replays.
///
/// Clones share state: keep one clone to advance time and inspect arming
/// while the driver owns the other.
#[derive(Clone, Debug, Default)]
pub struct ManualFrameSource {
    state: Rc<RefCell<ManualState>>,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `dt` seconds
    pub fn advance(&self, dt: f64) {
        self.state.borrow_mut().now += dt;
    }

    /// Jump the clock to an absolute time; earlier times are ignored
    pub fn set_time(&self, t: f64) {
        let mut state = self.state.borrow_mut();
        state.now = state.now.max(t);
    }

    pub fn time(&self) -> f64 {
        self.state.borrow().now
    }

    pub fn is_armed(&self) -> bool {
        self.state.borrow().armed
    }

    pub fn arm_count(&self) -> u32 {
        self.state.borrow().arm_count
    }

    pub fn disarm_count(&self) -> u32 {
        self.state.borrow().disarm_count
    }
}

impl FrameSource for ManualFrameSource {
    fn now(&self) -> f64 {
        self.state.borrow().now
    }

    fn arm(&mut self) {
        let mut state = self.state.borrow_mut();
        state.armed = true;
        state.arm_count += 1;
    }

    fn disarm(&mut self) {
        let mut state = self.state.borrow_mut();
        state.armed = false;
        state.disarm_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clones_share_state() {
        let clock = ManualFrameSource::new();
        let mut source = clock.clone();

        clock.advance(0.5);
        assert_eq!(source.now(), 0.5);

        source.arm();
        assert!(clock.is_armed());
        assert_eq!(clock.arm_count(), 1);

        source.disarm();
        assert!(!clock.is_armed());
        assert_eq!(clock.disarm_count(), 1);
    }

    #[test]
    fn test_manual_clock_never_rewinds() {
        let clock = ManualFrameSource::new();
        clock.set_time(2.0);
        clock.set_time(1.0);
        assert_eq!(clock.time(), 2.0);
    }

    #[test]
    fn test_system_source_is_monotonic() {
        let mut source = SystemFrameSource::new();
        let a = source.now();
        let b = source.now();
        assert!(b >= a);

        assert!(!source.is_armed());
        source.arm();
        assert!(source.is_armed());
    }
}
