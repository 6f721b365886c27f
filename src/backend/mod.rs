/// Backend abstraction module - byte stream implementations
///
/// The protocol engine only needs to push single bytes, ask whether the reader
/// has sent something, and pull the next byte. This trait captures exactly that
/// so the same driver runs over embedded-io streams or a host serial port.

use crate::error::Error;

pub mod eio;
#[cfg(feature = "serialport")]
pub mod serial;

pub use eio::EioTransport;
#[cfg(feature = "serialport")]
pub use serial::{CtsPin, SerialTransport};

/// Byte stream to the reader
pub trait Transport {
    /// Send one byte, no acknowledgment expected
    fn send_byte(&mut self, byte: u8) -> Result<(), Error>;

    /// At least one received byte is waiting
    fn bytes_available(&mut self) -> Result<bool, Error>;

    /// Take the next received byte
    ///
    /// Only meaningful after `bytes_available` returned true.
    fn receive_byte(&mut self) -> Result<u8, Error>;

    /// Send a whole frame byte by byte
    fn send_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &byte in bytes {
            self.send_byte(byte)?;
        }
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        T::send_byte(self, byte)
    }

    fn bytes_available(&mut self) -> Result<bool, Error> {
        T::bytes_available(self)
    }

    fn receive_byte(&mut self) -> Result<u8, Error> {
        T::receive_byte(self)
    }
}
