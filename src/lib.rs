//! Driver for IB Technology RWD Hitag2 serial RFID readers
//!
//! The reader only works with tags in password mode; there is no crypto
//! support. Commands are single frames over a 9600 baud UART, paced by the
//! reader's CTS line.

pub mod backend;
#[cfg(feature = "std")]
pub mod delay;
pub mod error;
pub mod poll;
pub mod protocol;
pub mod reader;

pub use embedded_hal::delay as eh_delay;
pub use embedded_hal::digital as eh_digital;

pub use backend::{EioTransport, Transport};
#[cfg(feature = "serialport")]
pub use backend::{CtsPin, SerialTransport};
#[cfg(feature = "std")]
pub use delay::StdDelay;
pub use error::Error;
pub use protocol::{Ack, AckStatus, Command, Frame};
pub use reader::{Config, Rwdh2};
