//! embedded-io backend
//!
//! Wraps any stream implementing `embedded_io::{Read, Write, ReadReady}`,
//! e.g. a HAL UART configured for 9600 8N1.

use embedded_io::{Read, ReadReady, Write};

use super::Transport;
use crate::error::Error;

/// embedded-io stream backend
pub struct EioTransport<T> {
    io: T,
}

impl<T> EioTransport<T>
where
    T: Read + Write + ReadReady,
{
    pub fn new(io: T) -> Self {
        Self { io }
    }

    /// Give the wrapped stream back
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T> Transport for EioTransport<T>
where
    T: Read + Write + ReadReady,
{
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.io.write_all(&[byte]).map_err(|_| Error::Transport)?;
        self.io.flush().map_err(|_| Error::Transport)
    }

    fn bytes_available(&mut self) -> Result<bool, Error> {
        self.io.read_ready().map_err(|_| Error::Transport)
    }

    fn receive_byte(&mut self) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        match self.io.read(&mut buf) {
            Ok(1) => Ok(buf[0]),
            _ => Err(Error::Transport),
        }
    }
}
