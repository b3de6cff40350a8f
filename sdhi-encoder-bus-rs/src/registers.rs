//! Register constants for 16-bit I2C GPIO expanders (PCA9555 family).
//!
//! The expander exposes two 8-bit input ports at consecutive register
//! addresses. A two-byte read starting at [`INPUT_PORT_0`] returns port 0
//! followed by port 1, which the bus assembles into one little-endian
//! 16-bit word: bits 0–7 are port 0, bits 8–15 are port 1.

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

/// Input port 0 register. Auto-increments into input port 1 on a 2-byte read.
pub const INPUT_PORT_0: u8 = 0x00;

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Default I2C address of an expander with all address pins tied low.
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Number of input pins on one expander.
pub const PORT_WIDTH: u8 = 16;
