/// Host serial port backend using the serialport crate
///
/// The reader's CTS output doubles as its ready signal, so the same port
/// (through a cloned handle) also provides the ready pin.

use std::io::{Read, Write};
use std::time::Duration;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};
use serialport::SerialPort;

use super::Transport;
use crate::error::Error;

/// Default line rate of the reader
pub const BAUD: u32 = 9600;

/// Serial port backend
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Open a port at the given baud rate, 8N1
    pub fn open(path: &str, baud: u32) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(100))
            .open()?;
        Ok(Self::new(port))
    }

    /// Ready pin reading the CTS line of this port
    pub fn cts_pin(&self) -> Result<CtsPin, serialport::Error> {
        Ok(CtsPin {
            port: self.port.try_clone()?,
        })
    }
}

impl Transport for SerialTransport {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.port.write_all(&[byte]).map_err(|_| Error::Transport)?;
        self.port.flush().map_err(|_| Error::Transport)
    }

    fn bytes_available(&mut self) -> Result<bool, Error> {
        let pending = self.port.bytes_to_read().map_err(|_| Error::Transport)?;
        Ok(pending > 0)
    }

    fn receive_byte(&mut self) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.port.read_exact(&mut buf).map_err(|_| Error::Transport)?;
        Ok(buf[0])
    }
}

/// CTS modem line presented as the reader's ready pin
///
/// An asserted CTS reads as low, i.e. the reader is listening.
pub struct CtsPin {
    port: Box<dyn SerialPort>,
}

impl ErrorType for CtsPin {
    type Error = ErrorKind;
}

impl InputPin for CtsPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let cts = self.port.read_clear_to_send().map_err(|_| ErrorKind::Other)?;
        Ok(!cts)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_high()?)
    }
}
