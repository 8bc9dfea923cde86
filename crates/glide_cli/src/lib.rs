//! Glide CLI support
//!
//! Replays chat list animations against a manual clock and reports the
//! presentation state of every frame.

pub mod config;
pub mod replay;

pub use config::{default_config_toml, load_config};
pub use replay::{replay_crossfade, replay_unlock, CrossfadeFrame, UnlockFrame};
