//! Tag and reader operations
//!
//! Everything here is composed from the page and EEPROM primitives. Multi-step
//! operations stop at the first failed step and leave whatever was already
//! written in place; the reader offers no rollback.

use embedded_hal::{delay::DelayNs, digital::InputPin};
use log::{debug, info};

use super::Rwdh2;
use crate::backend::Transport;
use crate::error::Error;
use crate::protocol::layout::{
    AUTH_SLOTS, EEPROM_AUTH_BASE, EEPROM_READER_PASSWORD, EEPROM_TAG_PASSWORD, PAGE_SIZE,
    TAG_CONFIG_BYTE, TAG_CONFIG_PAGE, TAG_READER_PASSWORD_PAGE, UID_SIZE, USER_DATA_FIRST_PAGE,
    USER_DATA_SIZE, auth_slot_address,
};
use crate::protocol::{Ack, Frame};

/// Longest identifier string `identifier` will collect
const IDENTIFIER_MAX: usize = 64;

impl<T, P, D> Rwdh2<T, P, D>
where
    T: Transport,
    P: InputPin,
    D: DelayNs,
{
    /// Bring the reader up
    ///
    /// The ready pin is expected to be configured as an input already. With
    /// `enable_uid`, the authorisation list is blanked so `get_uid` works for
    /// any tag.
    pub fn begin(&mut self, enable_uid: bool) -> Result<(), Error> {
        debug!("begin (enable_uid: {enable_uid})");
        if enable_uid {
            self.enable_uid_query()?;
        }
        Ok(())
    }

    /// Store a tag UID in authorisation slot 0-59
    pub fn authorize_tag(&mut self, uid: &[u8; UID_SIZE], slot: u8) -> Result<(), Error> {
        self.write_eeprom(auth_slot_address(slot), uid)
    }

    /// Clear one authorisation slot
    pub fn deauthorize_tag(&mut self, slot: u8) -> Result<(), Error> {
        self.write_eeprom(auth_slot_address(slot), &[0u8; UID_SIZE])
    }

    /// Clear all 60 authorisation slots
    ///
    /// Slow: 240 EEPROM byte writes at 9600 baud. Stops at the first slot that
    /// fails, leaving earlier slots cleared and later ones untouched.
    pub fn deauthorize_all_tags(&mut self) -> Result<(), Error> {
        self.deauthorize_all_tags_with_progress(|_| {})
    }

    /// Like `deauthorize_all_tags`, calling `on_slot` after each cleared slot
    pub fn deauthorize_all_tags_with_progress<F>(&mut self, mut on_slot: F) -> Result<(), Error>
    where
        F: FnMut(u8),
    {
        for slot in 0..AUTH_SLOTS {
            self.deauthorize_tag(slot)?;
            on_slot(slot);
        }
        info!("cleared {AUTH_SLOTS} authorisation slots");
        Ok(())
    }

    /// Store a new 4-byte reader password in the reader's EEPROM
    pub fn set_reader_password(&mut self, password: &[u8; 4]) -> Result<(), Error> {
        self.write_eeprom(EEPROM_READER_PASSWORD, password)
    }

    /// Write a new 4-byte reader password to the tag
    ///
    /// There is no way to recover a tag once the reader no longer knows its
    /// password.
    pub fn write_tag_reader_password(&mut self, password: &[u8; 4]) -> Result<Ack, Error> {
        self.write_tag_page(TAG_READER_PASSWORD_PAGE, password)
    }

    /// Write a new 3-byte tag password to tag page 3
    ///
    /// Page 3 is the configuration page: the frame carries the configuration
    /// byte 0x06 followed by the password. Page 1 holds the reader password,
    /// see `write_tag_reader_password`.
    pub fn set_tag_password(&mut self, password: &[u8; 3]) -> Result<Ack, Error> {
        let data = [TAG_CONFIG_BYTE, password[0], password[1], password[2]];
        self.write_tag_page(TAG_CONFIG_PAGE, &data)
    }

    /// Store a new 3-byte tag password in the reader's EEPROM
    pub fn set_tag_password_in_eeprom(&mut self, password: &[u8; 3]) -> Result<(), Error> {
        self.write_eeprom(EEPROM_TAG_PASSWORD, password)
    }

    /// Write 16 bytes of user data to tag pages 4-7
    ///
    /// On error the pages before the failing one hold the new data.
    pub fn write_user_data(&mut self, data: &[u8; USER_DATA_SIZE]) -> Result<(), Error> {
        for (page, chunk) in (USER_DATA_FIRST_PAGE..).zip(data.chunks_exact(PAGE_SIZE)) {
            let mut page_data = [0u8; PAGE_SIZE];
            page_data.copy_from_slice(chunk);
            self.write_tag_page(page, &page_data)?;
        }
        Ok(())
    }

    /// Read 16 bytes of user data from tag pages 4-7
    ///
    /// On error the content of `data` is unspecified.
    pub fn read_user_data(&mut self, data: &mut [u8; USER_DATA_SIZE]) -> Result<(), Error> {
        for (page, chunk) in (USER_DATA_FIRST_PAGE..).zip(data.chunks_exact_mut(PAGE_SIZE)) {
            chunk.copy_from_slice(&self.read_tag_page(page)?);
        }
        Ok(())
    }

    /// Fill the first authorisation slot with 0xFF
    ///
    /// An all-ones slot marks the list as unprogrammed, which lets `get_uid`
    /// report any tag in the field.
    pub fn enable_uid_query(&mut self) -> Result<(), Error> {
        self.write_eeprom(EEPROM_AUTH_BASE, &[0xFF; UID_SIZE])
    }

    /// Query reader status; decode the bits with `Ack::status`
    pub fn get_status(&mut self) -> Result<Ack, Error> {
        self.send_command(&Frame::status())
    }

    /// UID of the tag in the field
    pub fn get_uid(&mut self) -> Result<[u8; UID_SIZE], Error> {
        self.send_command(&Frame::uid())?;
        let mut uid = [0u8; UID_SIZE];
        self.read_exact(&mut uid)?;
        Ok(uid)
    }

    /// Read the reader's identifier string into `buffer`
    ///
    /// e.g. "a IDE RWD H2 (SECx V1.xx) DD/MM/YY". This query has no
    /// acknowledgment byte: whatever the reader sends is returned verbatim and
    /// `last_ack` is left alone. Returns the number of bytes read.
    pub fn get_identifier(&mut self, buffer: &mut [u8]) -> Result<usize, Error> {
        self.wait_listening()?;
        self.send_byte(Frame::message().command().opcode())?;
        self.read_available(buffer)
    }

    /// The identifier string, lossily decoded
    pub fn identifier(&mut self) -> Result<String, Error> {
        let mut buffer = [0u8; IDENTIFIER_MAX];
        let n = self.get_identifier(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer[..n]).trim_end().to_string())
    }
}
