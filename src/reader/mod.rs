//! RWD Hitag2 reader handle
//!
//! Owns the command exchange with the reader: wait for the ready line, send a
//! frame, wait for the acknowledgment byte and check it against the command's
//! mask. Memory access and the public tag/reader operations are built on top
//! in `memory` and `facade`.
//!
//! The handle is generic over its collaborators. Pass `&mut transport` (and a
//! `&mut` pin) to keep ownership on the caller side; the borrow then has to
//! outlive the handle.

use embedded_hal::{delay::DelayNs, digital::InputPin};
use log::{debug, trace};

use crate::backend::Transport;
use crate::error::Error;
use crate::poll::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS, Poller};
use crate::protocol::{Ack, Frame, OKAY};

mod facade;
mod memory;

#[cfg(test)]
pub(crate) mod mock;

/// Timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How long to wait for the ready line before a command, 0 = forever
    pub listen_timeout_ms: u32,
    /// How long to wait for the first response byte, 0 = forever
    pub response_timeout_ms: u32,
    pub poll_interval_ms: u32,
    /// Pause before every byte read; the module answers slower than we ask
    pub settle_delay_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_timeout_ms: DEFAULT_TIMEOUT_MS,
            response_timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_delay_us: 1_000,
        }
    }
}

impl Config {
    pub fn with_listen_timeout_ms(mut self, ms: u32) -> Self {
        self.listen_timeout_ms = ms;
        self
    }

    pub fn with_response_timeout_ms(mut self, ms: u32) -> Self {
        self.response_timeout_ms = ms;
        self
    }

    /// Set both timeouts
    pub fn with_timeout_ms(self, ms: u32) -> Self {
        self.with_listen_timeout_ms(ms).with_response_timeout_ms(ms)
    }

    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_settle_delay_us(mut self, us: u32) -> Self {
        self.settle_delay_us = us;
        self
    }
}

/// RWD Hitag2 reader
///
/// * `T` – byte stream to the reader
/// * `P` – ready line (the reader's CTS output), high while busy
/// * `D` – delay provider used for polling and byte pacing
///
/// Not safe to share between threads without external locking: every
/// command updates the last acknowledgment.
pub struct Rwdh2<T, P, D> {
    transport: T,
    ready: P,
    delay: D,
    config: Config,
    last_ack: u8,
}

impl<T, P, D> Rwdh2<T, P, D>
where
    T: Transport,
    P: InputPin,
    D: DelayNs,
{
    /// Create a reader with default timing
    pub fn new(transport: T, ready: P, delay: D) -> Self {
        Self::with_config(transport, ready, delay, Config::default())
    }

    pub fn with_config(transport: T, ready: P, delay: D, config: Config) -> Self {
        Self {
            transport,
            ready,
            delay,
            config,
            last_ack: OKAY,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The byte returned when the last command was executed
    pub fn last_ack(&self) -> u8 {
        self.last_ack
    }

    /// Hand back the collaborators
    pub fn release(self) -> (T, P, D) {
        (self.transport, self.ready, self.delay)
    }

    /// Wait for the ready line with the configured timeout
    pub fn listening(&mut self) -> Result<bool, Error> {
        self.listening_within(self.config.listen_timeout_ms)
    }

    /// Wait up to `timeout_ms` (0 = forever) for the ready line to drop
    pub fn listening_within(&mut self, timeout_ms: u32) -> Result<bool, Error> {
        let poller = Poller::new(timeout_ms, self.config.poll_interval_ms);
        let ready = &mut self.ready;
        poller.wait_for(&mut self.delay, "listening", || {
            ready.is_low().map_err(|_| Error::ReadyPin)
        })
    }

    /// Wait for received data with the configured timeout
    pub fn available(&mut self) -> Result<bool, Error> {
        self.available_within(self.config.response_timeout_ms)
    }

    /// Wait up to `timeout_ms` (0 = forever) for at least one received byte
    pub fn available_within(&mut self, timeout_ms: u32) -> Result<bool, Error> {
        let poller = Poller::new(timeout_ms, self.config.poll_interval_ms);
        let transport = &mut self.transport;
        poller.wait_for(&mut self.delay, "available", || transport.bytes_available())
    }

    pub(crate) fn wait_listening(&mut self) -> Result<(), Error> {
        if self.listening()? {
            Ok(())
        } else {
            Err(Error::NotListening {
                timeout_ms: self.config.listen_timeout_ms,
            })
        }
    }

    pub(crate) fn wait_available(&mut self) -> Result<(), Error> {
        if self.available()? {
            Ok(())
        } else {
            Err(Error::NoResponse {
                timeout_ms: self.config.response_timeout_ms,
            })
        }
    }

    /// Send a single byte without waiting for anything
    pub fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.transport.send_byte(byte)
    }

    /// Send a frame and check the acknowledgment against the command's mask
    ///
    /// The raw acknowledgment is kept as `last_ack` whether or not it passes.
    pub fn send_command(&mut self, frame: &Frame) -> Result<Ack, Error> {
        let mask = frame.command().ack_mask().ok_or(Error::InvalidFrame)?;

        self.wait_listening()?;

        trace!("tx {}", hex::encode(frame.as_bytes()));
        self.transport.send_all(frame.as_bytes())?;

        self.wait_available()?;
        let raw = self.read_byte()?;
        self.last_ack = raw;
        trace!("ack {raw:#04X}");

        let ack = Ack::new(raw, mask);
        if !ack.is_okay() {
            debug!("{:?} rejected with {raw:#04X} (mask {mask:#04X})", frame.command());
        }
        ack.check()
    }

    /// Read one byte after the settle delay
    fn read_byte(&mut self) -> Result<u8, Error> {
        self.delay.delay_us(self.config.settle_delay_us);
        self.transport.receive_byte()
    }

    /// Read exactly `buffer.len()` bytes once data starts arriving
    pub(crate) fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), Error> {
        self.wait_available()?;
        for byte in buffer.iter_mut() {
            *byte = self.read_byte()?;
        }
        trace!("rx {}", hex::encode(&buffer[..]));
        Ok(())
    }

    /// Drain whatever the reader has sent, returning the byte count
    ///
    /// Overflow is read and dropped so the next acknowledgment is not a
    /// leftover text byte.
    pub(crate) fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize, Error> {
        self.wait_available()?;
        let mut n = 0;
        while self.transport.bytes_available()? {
            if n == buffer.len() {
                let mut dropped = 0usize;
                while self.transport.bytes_available()? {
                    self.read_byte()?;
                    dropped += 1;
                }
                debug!("identifier overflow, dropped {dropped} bytes");
                return Err(Error::BufferTooSmall);
            }
            buffer[n] = self.read_byte()?;
            n += 1;
        }
        trace!("rx {}", hex::encode(&buffer[..n]));
        Ok(n)
    }
}
