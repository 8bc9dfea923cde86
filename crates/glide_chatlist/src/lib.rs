//! Glide Chat List
//!
//! Animated controllers for the chat list screens, each running its own
//! [`AnimationDriver`](glide_animation::AnimationDriver):
//!
//! - [`UnlockArchive`]: the pull-to-unlock archive affordance
//! - [`OverlayTitleTransition`]: the list title riding into an opened chat
//! - [`ThemeCrossfade`]: the QR share sheet theme switch
//!
//! Controllers keep their presentation state behind `Rc<RefCell<_>>` so
//! animation sinks can write it; callers read it back as plain values.
//!
//! # Example
//!
//! ```rust
//! use glide_animation::ManualFrameSource;
//! use glide_chatlist::{MotionConfig, UnlockArchive, UnlockState};
//!
//! let clock = ManualFrameSource::new();
//! let config = MotionConfig::default();
//! let mut archive = UnlockArchive::new(390.0, config.unlock, clock.clone()).unwrap();
//!
//! archive.drag_began();
//! archive.drag_update(120.0).unwrap();
//! assert_eq!(archive.state(), UnlockState::DraggingAbove);
//!
//! assert_eq!(archive.release().unwrap(), UnlockState::Settling);
//! while archive.is_animating() {
//!     clock.advance(1.0 / 60.0);
//!     archive.tick();
//! }
//! assert_eq!(archive.state(), UnlockState::Idle);
//! ```

pub mod config;
pub mod overlay_transition;
pub mod qr_theme;
pub mod sink;
pub mod snapshot;
pub mod unlock_archive;

pub use config::{
    ConfigError, CrossfadeMotion, MotionConfig, OverlayMotion, ReplayConfig, UnlockMotion,
};
pub use overlay_transition::{OverlayPresentation, OverlayTitleTransition};
pub use qr_theme::{ThemeCrossfade, ThemePresentation};
pub use snapshot::{RecordingHost, SnapshotHost, SnapshotId, SnapshotRecord};
pub use unlock_archive::{
    unlock_machine, Label, UnlockArchive, UnlockEvent, UnlockPresentation, UnlockState,
};
