/// Command frames and acknowledgments

use super::commands::{AckStatus, Command, OKAY};
use crate::error::Error;

/// Longest frame on the wire: opcode plus five parameters
pub const MAX_FRAME_SIZE: usize = 6;

/// One command as sent to the reader: opcode followed by its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    command: Command,
    bytes: [u8; MAX_FRAME_SIZE],
    len: usize,
}

impl Frame {
    /// Build a frame, checking the parameter count against the command table
    pub fn new(command: Command, params: &[u8]) -> Result<Self, Error> {
        if params.len() != command.param_count() {
            return Err(Error::InvalidFrame);
        }
        Ok(Self::fixed(command, params))
    }

    /// Read a tag page
    pub fn read_page(page: u8) -> Self {
        Self::fixed(Command::ReadPage, &[page])
    }

    /// Write 4 bytes to a tag page
    pub fn write_page(page: u8, data: &[u8; 4]) -> Self {
        Self::fixed(Command::WritePage, &[page, data[0], data[1], data[2], data[3]])
    }

    /// Program one byte of reader EEPROM
    pub fn program_eeprom(address: u8, value: u8) -> Self {
        Self::fixed(Command::ProgramEeprom, &[address, value])
    }

    pub fn status() -> Self {
        Self::fixed(Command::Status, &[])
    }

    pub fn uid() -> Self {
        Self::fixed(Command::Uid, &[])
    }

    pub fn message() -> Self {
        Self::fixed(Command::Message, &[])
    }

    // Parameter counts of the named constructors match the command table.
    fn fixed(command: Command, params: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_FRAME_SIZE];
        bytes[0] = command.opcode();
        bytes[1..=params.len()].copy_from_slice(params);
        Self {
            command,
            bytes,
            len: params.len() + 1,
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// Bytes to put on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Acknowledgment byte returned after a framed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    raw: u8,
    mask: u8,
}

impl Ack {
    pub fn new(raw: u8, mask: u8) -> Self {
        Self { raw, mask }
    }

    /// The byte exactly as received
    pub fn raw(&self) -> u8 {
        self.raw
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Masked bits match the canonical okay byte
    pub fn is_okay(&self) -> bool {
        (self.raw & self.mask) == (OKAY & self.mask)
    }

    /// Decode the status bits
    pub fn status(&self) -> AckStatus {
        AckStatus::from_bits_truncate(self.raw)
    }

    /// Turn a rejected acknowledgment into an error
    pub fn check(self) -> Result<Self, Error> {
        if self.is_okay() {
            Ok(self)
        } else {
            Err(Error::Rejected {
                ack: self.raw,
                mask: self.mask,
            })
        }
    }
}
