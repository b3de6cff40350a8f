//! Control-value model of the sdhi MIDI control surface.
//!
//! See [`control_values`] for the panel layout, value kinds and parameter
//! binding.

#![no_std]

pub mod control_values;
