//! Control values with panel-based organization.
//!
//! This module provides the [`ControlModel`] data structure that owns every
//! user-adjustable value of the instrument. It is the state the main loop
//! mutates with encoder deltas and that the action engine and the display
//! read from.
//!
//! # Architecture
//!
//! Controls are shown on **panels** of up to 8 slots each, matching the
//! 8 value encoders. A ninth encoder selects the panel. A control may appear
//! on several panels or on none.
//!
//! ```text
//! Panel 0 (Sound):  [---] [---] [Variation] [Attack] [Decay] [Type] [Release] [Volume]
//! Panel 1 (Filter): [LPF Cutoff] [LPF Resonance] [HPF Cutoff] [Reverb] [Chorus] [---] ...
//!                                                   encoder 9: panel selector
//! ```
//!
//! # Value kinds
//!
//! - **Integer**: linear, clamped to its bounds.
//! - **Real**: stored as a whole number of steps, displayed scaled.
//! - **Enumeration**: a static option list. Encoder ticks are gathered
//!   with hysteresis so that one option moves per [`ENUM_STEP_TICKS`]
//!   ticks in the same direction.
//!
//! # Parameters
//!
//! Actions do not read controls directly. They hold [`Parameter`]s, which
//! [`ControlModel::bind()`] turns into [`Operand`]s once at setup so that
//! an unknown control id is reported before the instrument starts.
//!
//! # `no_std` Compatibility
//!
//! This module uses no heap allocation. The control table is a fixed-size
//! array and panels are `'static` configuration. The optional `defmt`
//! feature enables structured logging for embedded targets.

mod control;
mod error;
mod model;
mod panel;
mod parameter;

pub use control::{Control, ControlId, DisplayValue, EnumOption, ValueKind, ENUM_STEP_TICKS};
pub use error::ControlError;
pub use model::ControlModel;
pub use panel::{Panel, AXIS_COUNT, PANEL_SELECTOR_AXIS, SLOTS_PER_PANEL};
pub use parameter::{ControlIndex, Operand, Parameter};
