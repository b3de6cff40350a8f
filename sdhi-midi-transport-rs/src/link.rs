/// Non-blocking access to a byte-oriented serial port.
///
/// [`TransportDriver`](crate::TransportDriver) calls these from a polling
/// loop and never waits: `read_byte` is only called after
/// `byte_available` returned `true`, and `write_byte` only after
/// `writable` did.
pub trait SerialLink {
    /// A received byte is waiting.
    fn byte_available(&mut self) -> bool;

    /// Take the next received byte.
    fn read_byte(&mut self) -> u8;

    /// The transmitter can accept a byte.
    fn writable(&mut self) -> bool;

    /// Hand one byte to the transmitter.
    fn write_byte(&mut self, byte: u8);
}
