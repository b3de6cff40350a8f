//! Error types for the encoder bus.

use core::fmt;

/// Errors that can occur when sampling encoders over the expander bus.
#[derive(Debug, PartialEq, Eq)]
pub enum EncoderError<E> {
    /// Underlying I2C bus error.
    I2c(E),

    /// An encoder is wired to an expander or pin that does not exist.
    InvalidWiring,
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for EncoderError<E> {
    fn from(error: E) -> Self {
        EncoderError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for EncoderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncoderError::I2c(e) => write!(f, "I2C error: {:?}", e),
            EncoderError::InvalidWiring => write!(f, "Encoder wired to a missing expander or pin"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for EncoderError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            EncoderError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            EncoderError::InvalidWiring => defmt::write!(f, "Invalid encoder wiring"),
        }
    }
}
