//! Register-bus sampling of encoder pin states.
//!
//! [`QuadratureSampler`] is the contract the poller consumes: one call
//! returns the current A/B pin levels of every encoder. [`ExpanderBus`] is
//! the concrete implementation for encoders wired to one or more 16-bit
//! I2C GPIO expanders.

use embedded_hal_async::i2c::I2c;

use crate::error::EncoderError;
use crate::registers::{INPUT_PORT_0, PORT_WIDTH};

/// Instantaneous A/B pin levels of one quadrature encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadraturePins {
    /// Channel A level. Its rising edge clocks a count.
    pub a: bool,
    /// Channel B level at the moment A rises. High means counter-clockwise.
    pub b: bool,
}

/// A source of pin samples for `N` encoders.
///
/// Sampling is best-effort: a failed or late sample only loses transitions,
/// it never corrupts the decoder state.
#[allow(async_fn_in_trait)]
pub trait QuadratureSampler<const N: usize> {
    /// Error reported by the underlying bus.
    type Error;

    /// Read the current pin levels of all encoders.
    async fn sample(&mut self) -> Result<[QuadraturePins; N], Self::Error>;
}

/// Where one encoder's A and B pins are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderPins {
    /// Index into the bus's expander address table.
    pub expander: usize,
    /// Bit of the expander's 16-bit input word carrying channel A.
    pub a_bit: u8,
    /// Bit of the expander's 16-bit input word carrying channel B.
    pub b_bit: u8,
}

/// Encoders wired to `E` GPIO expanders on a shared I2C bus.
///
/// Every [`sample`](QuadratureSampler::sample) performs exactly one
/// `write_read` transaction per expander, then extracts each encoder's pins
/// from the cached words.
///
/// # Example
///
/// ```no_run
/// use encoder_bus::{EncoderPins, ExpanderBus, DEFAULT_ADDRESS};
///
/// # fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let wiring = [EncoderPins { expander: 0, a_bit: 11, b_bit: 12 }];
/// let bus = ExpanderBus::new(i2c, [DEFAULT_ADDRESS], wiring).unwrap();
/// # }
/// ```
pub struct ExpanderBus<I2C, const E: usize, const N: usize> {
    i2c: I2C,
    addresses: [u8; E],
    wiring: [EncoderPins; N],
}

impl<I2C, const E: usize, const N: usize> ExpanderBus<I2C, E, N>
where
    I2C: I2c,
{
    /// Create a bus over the expanders at `addresses`.
    ///
    /// No I2C traffic is generated.
    ///
    /// # Errors
    /// * [`EncoderError::InvalidWiring`] if any encoder names an expander
    ///   index `>= E` or a bit `>= 16`.
    pub fn new(
        i2c: I2C,
        addresses: [u8; E],
        wiring: [EncoderPins; N],
    ) -> Result<Self, EncoderError<I2C::Error>> {
        let valid = wiring
            .iter()
            .all(|pins| pins.expander < E && pins.a_bit < PORT_WIDTH && pins.b_bit < PORT_WIDTH);
        if !valid {
            return Err(EncoderError::InvalidWiring);
        }

        Ok(Self {
            i2c,
            addresses,
            wiring,
        })
    }

    /// Read both input ports of one expander as a 16-bit word.
    async fn read_ports(&mut self, address: u8) -> Result<u16, EncoderError<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(address, &[INPUT_PORT_0], &mut buf).await?;
        Ok(u16::from_le_bytes(buf))
    }
}

impl<I2C, const E: usize, const N: usize> QuadratureSampler<N> for ExpanderBus<I2C, E, N>
where
    I2C: I2c,
{
    type Error = EncoderError<I2C::Error>;

    async fn sample(&mut self) -> Result<[QuadraturePins; N], Self::Error> {
        let mut words = [0u16; E];
        for (i, word) in words.iter_mut().enumerate() {
            let address = self.addresses[i];
            *word = self.read_ports(address).await?;
        }

        Ok(core::array::from_fn(|i| {
            let pins = self.wiring[i];
            let word = words[pins.expander];
            QuadraturePins {
                a: (word >> pins.a_bit) & 1 != 0,
                b: (word >> pins.b_bit) & 1 != 0,
            }
        }))
    }
}
