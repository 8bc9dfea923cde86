//! Glide Animation System
//!
//! Frame-driven interpolation for screen controllers.
//!
//! # Features
//!
//! - **Animation Driver**: one per screen; advances tasks once per display frame
//!   and arms/disarms its injected [`FrameSource`] as tasks come and go
//! - **Multi-Channel Tasks**: several quantities on one clock, never drifting
//! - **Slots**: a new task on an element preempts the old one, no blending
//! - **Easing**: polynomial families, cubic bezier, the list-view system curve,
//!   and a normalized spring with overshoot
//! - **Presets**: fades, flips, slides, frames and color crossfades
//!
//! # Example
//!
//! ```rust
//! use glide_animation::{AnimationDriver, InterpolationTask, ManualFrameSource};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let clock = ManualFrameSource::new();
//! let mut driver = AnimationDriver::new(clock.clone());
//!
//! let opacity = Rc::new(Cell::new(0.0));
//! let sink = opacity.clone();
//! driver
//!     .start(InterpolationTask::scalar(0.0, 1.0, 0.2), move |frame| {
//!         sink.set(frame.value(0));
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! clock.advance(0.2);
//! driver.tick();
//! assert_eq!(opacity.get(), 1.0);
//! assert!(!driver.is_armed());
//! ```

pub mod driver;
pub mod easing;
pub mod error;
pub mod frame;
pub mod presets;
pub mod task;

pub use driver::{AnimationDriver, DriverHandle};
pub use easing::Easing;
pub use error::{DriverError, SinkError};
pub use frame::{FrameSource, ManualFrameSource, SystemFrameSource};
pub use presets::TaskPreset;
pub use task::{Channel, Frame, InterpolationTask, SlotId, TaskId};
