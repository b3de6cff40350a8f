//! Action engine for the sdhi control surface.
//!
//! An [`Action`] describes one outbound MIDI effect whose fields are bound
//! to control values. The [`ActionEngine`] keeps, per action, the values
//! last computed and last sent, and on every cycle dispatches the actions
//! whose values changed, as far as the transport has room for them.
//!
//! The [`tasks`] module composes the engine with the encoder and transport
//! crates into the main and real-time loops.
//!
//! # Features
//!
//! - **`defmt`**: structured logging via [`defmt`], forwarded to the
//!   sibling crates.
//! - **`task`**: the endless [`tasks::main_task`] and
//!   [`tasks::realtime_task`] loops.

#![no_std]

pub mod tasks;

mod action;
mod engine;
mod error;
mod sink;

pub use action::{Action, ActionKind, MAX_ACTION_MESSAGES, XG_MANUFACTURER_ID};
pub use engine::{ActionEngine, CycleReport, EngineConfig};
pub use error::ActionError;
pub use sink::MessageSink;
pub use tasks::DisplaySurface;
