//! Glide Core
//!
//! Foundational primitives shared by the Glide animation and controller crates:
//!
//! - **Geometry**: points, sizes, rects and colors written into presentation state
//! - **State Machines**: explicit (state, event) transition tables for gesture flows
//!
//! # Example
//!
//! ```rust
//! use glide_core::fsm::StateMachine;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Door { Closed, Open }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Push { Open, Close }
//!
//! let mut fsm = StateMachine::builder(Door::Closed)
//!     .on(Door::Closed, Push::Open, Door::Open)
//!     .on(Door::Open, Push::Close, Door::Closed)
//!     .build();
//!
//! assert_eq!(fsm.send(Push::Open), Door::Open);
//! ```

pub mod fsm;
pub mod geometry;

pub use fsm::{StateMachine, StateMachineBuilder, Transition};
pub use geometry::{Color, Point, Rect, Size};
