//! Rotary encoder input for the sdhi control surface.
//!
//! Encoders are wired to 16-bit I2C GPIO expanders and decoded in software.
//! The crate is split into two halves that run in different execution
//! contexts:
//!
//! - **[`EncoderPoller`]**: owned by the real-time loop. Samples the
//!   register bus through a [`QuadratureSampler`] (usually an
//!   [`ExpanderBus`]) and turns rising edges of channel A into signed steps.
//! - **[`EncoderDeltas`]**: the shared accumulator array, drained by the
//!   main loop. Guarded by a critical-section mutex that is never held
//!   across bus I/O.
//!
//! # Quick start
//!
//! ```no_run
//! use encoder_bus::{EncoderDeltas, EncoderPins, EncoderPoller, ExpanderBus, DEFAULT_ADDRESS};
//!
//! static DELTAS: EncoderDeltas<1> = EncoderDeltas::new();
//!
//! # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
//! let wiring = [EncoderPins { expander: 0, a_bit: 11, b_bit: 12 }];
//! let bus = ExpanderBus::new(i2c, [DEFAULT_ADDRESS], wiring).unwrap();
//! let mut poller = EncoderPoller::new(bus, &DELTAS);
//!
//! // Real-time context
//! let _ = poller.poll().await;
//!
//! // Main context
//! if let Some(deltas) = DELTAS.drain() {
//!     // apply deltas[0]
//! }
//! # }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: Enable [`defmt::Format`] implementations on public types
//!   for embedded logging.

#![no_std]

pub use bus::{EncoderPins, ExpanderBus, QuadraturePins, QuadratureSampler};
pub use deltas::{EncoderDeltas, EncoderPoller};
pub use error::EncoderError;
pub use registers::DEFAULT_ADDRESS;

mod bus;
mod deltas;
mod error;
mod registers;
