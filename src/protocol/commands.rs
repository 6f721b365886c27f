/// Command set and acknowledgment definitions for the RWD Hitag2 serial protocol

use core::fmt;

/// Canonical acknowledgment byte; masked responses are compared against it
pub const OKAY: u8 = 0b1101_0110;

/// Acknowledgment masks, one per command family
pub mod mask {
    pub const READ: u8 = 0b0011_1110;
    pub const WRITE: u8 = 0b0011_1110;
    pub const STATUS: u8 = 0b0010_1000;
    pub const UID: u8 = 0b0011_1110;
    pub const PROGRAM_EEPROM: u8 = 0b0000_0001;
}

/// Serial command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Read a 32-bit tag page
    ReadPage = 0x52,
    /// Write a 32-bit tag page
    WritePage = 0x57,
    /// Query reader status
    Status = 0x53,
    /// Query the UID of the tag in the field
    Uid = 0x55,
    /// Query the reader identifier string
    Message = 0x7A,
    /// Program one byte of reader EEPROM
    ProgramEeprom = 0x50,
}

impl Command {
    /// Get the opcode byte
    pub fn opcode(self) -> u8 {
        self as u8
    }

    /// Number of parameter bytes following the opcode
    pub const fn param_count(self) -> usize {
        match self {
            Self::ReadPage => 1,
            Self::WritePage => 5,
            Self::Status | Self::Uid | Self::Message => 0,
            Self::ProgramEeprom => 2,
        }
    }

    /// Acknowledgment mask, `None` for the raw text query
    pub const fn ack_mask(self) -> Option<u8> {
        match self {
            Self::ReadPage => Some(mask::READ),
            Self::WritePage => Some(mask::WRITE),
            Self::Status => Some(mask::STATUS),
            Self::Uid => Some(mask::UID),
            Self::Message => None,
            Self::ProgramEeprom => Some(mask::PROGRAM_EEPROM),
        }
    }

    /// Number of payload bytes the reader sends after a successful acknowledgment
    pub const fn response_len(self) -> usize {
        match self {
            Self::ReadPage | Self::Uid => 4,
            _ => 0,
        }
    }

    /// Create from raw opcode
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0x52 => Some(Self::ReadPage),
            0x57 => Some(Self::WritePage),
            0x53 => Some(Self::Status),
            0x55 => Some(Self::Uid),
            0x7A => Some(Self::Message),
            0x50 => Some(Self::ProgramEeprom),
            _ => None,
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

/// Status bits carried in every acknowledgment byte
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AckStatus(u8);

bitflags::bitflags! {
    impl AckStatus: u8 {
        const ANTENNA_FAULT = 1 << 5;
        const RELAY_ENABLED = 1 << 4;
        const SERIAL_ERROR  = 1 << 3;
        const RX_OKAY       = 1 << 2;
        const TAG_OKAY      = 1 << 1;
        const EEPROM_ERROR  = 1 << 0;
    }
}

impl fmt::Display for AckStatus {
    /// Flag names joined with `|`, e.g. `RELAY_ENABLED | RX_OKAY | TAG_OKAY`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        bitflags::parser::to_writer(self, f)
    }
}

impl fmt::Debug for AckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AckStatus").field(&format_args!("{self}")).finish()
    }
}

impl AckStatus {
    /// Any fault bit set
    pub fn has_fault(&self) -> bool {
        self.intersects(Self::ANTENNA_FAULT | Self::SERIAL_ERROR | Self::EEPROM_ERROR)
    }
}

/// Reader EEPROM and tag memory layout
pub mod layout {
    /// Tag page count; each page holds 4 bytes
    pub const TAG_PAGES: u8 = 8;
    pub const PAGE_SIZE: usize = 4;

    /// Tag page holding the 32-bit reader password
    pub const TAG_READER_PASSWORD_PAGE: u8 = 1;
    /// Tag configuration page: config byte followed by the 24-bit tag password
    pub const TAG_CONFIG_PAGE: u8 = 3;
    /// Configuration byte written ahead of the tag password
    pub const TAG_CONFIG_BYTE: u8 = 0x06;

    /// User data spans tag pages 4..=7
    pub const USER_DATA_FIRST_PAGE: u8 = 4;
    pub const USER_DATA_PAGES: u8 = 4;
    pub const USER_DATA_SIZE: usize = USER_DATA_PAGES as usize * PAGE_SIZE;

    pub const EEPROM_READER_PASSWORD: u8 = 4;
    pub const EEPROM_TAG_PASSWORD: u8 = 9;
    /// First authorisation slot; filled with 0xFF it doubles as the UID-enable flag
    pub const EEPROM_AUTH_BASE: u8 = 0x0C;
    pub const AUTH_SLOTS: u8 = 60;
    pub const UID_SIZE: usize = 4;

    /// EEPROM address of an authorisation slot
    pub const fn auth_slot_address(slot: u8) -> u8 {
        EEPROM_AUTH_BASE.wrapping_add(slot.wrapping_mul(UID_SIZE as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_table() {
        assert_eq!(Command::ReadPage.opcode(), 0x52);
        assert_eq!(Command::WritePage.param_count(), 5);
        assert_eq!(Command::Status.ack_mask(), Some(0x28));
        assert_eq!(Command::ProgramEeprom.ack_mask(), Some(0x01));
        assert_eq!(Command::Message.ack_mask(), None);
        assert_eq!(Command::Uid.response_len(), 4);
    }

    #[test]
    fn test_from_opcode() {
        assert_eq!(Command::from_opcode(0x50), Some(Command::ProgramEeprom));
        assert_eq!(Command::from_opcode(0x7A), Some(Command::Message));
        assert_eq!(Command::from_opcode(0xFF), None);
    }

    #[test]
    fn test_ack_status_bits() {
        let status = AckStatus::from_bits_truncate(OKAY);
        assert!(status.contains(AckStatus::RELAY_ENABLED));
        assert!(status.contains(AckStatus::RX_OKAY | AckStatus::TAG_OKAY));
        assert!(!status.has_fault());
        assert!(AckStatus::from_bits_truncate(0x20).has_fault());
    }

    #[test]
    fn test_ack_status_names() {
        let status = AckStatus::from_bits_truncate(OKAY);
        assert_eq!(status.to_string(), "RELAY_ENABLED | RX_OKAY | TAG_OKAY");
        assert_eq!(format!("{status:?}"), "AckStatus(RELAY_ENABLED | RX_OKAY | TAG_OKAY)");
        assert_eq!(AckStatus::from_bits_truncate(0x21).to_string(), "ANTENNA_FAULT | EEPROM_ERROR");
        assert_eq!(AckStatus::empty().to_string(), "(none)");
    }

    #[test]
    fn test_auth_slot_addresses() {
        assert_eq!(layout::auth_slot_address(0), 12);
        assert_eq!(layout::auth_slot_address(1), 16);
        assert_eq!(layout::auth_slot_address(59), 248);
    }
}
