//! Tag page and reader EEPROM access
//!
//! Pages and addresses are plain bytes and are not range checked: tag pages
//! run 0-7 and EEPROM addresses 0-255, anything else is up to the reader.
//! Address arithmetic wraps at 255 like the reader's own 8-bit counter.

use embedded_hal::{delay::DelayNs, digital::InputPin};
use log::debug;

use super::Rwdh2;
use crate::backend::Transport;
use crate::error::Error;
use crate::protocol::{Ack, Frame, layout::PAGE_SIZE};

impl<T, P, D> Rwdh2<T, P, D>
where
    T: Transport,
    P: InputPin,
    D: DelayNs,
{
    /// Write a 32-bit page of tag memory
    ///
    /// Be careful with pages 0-3, they hold the serial number, passwords and
    /// configuration. A bad write can lock the tag for good.
    pub fn write_tag_page(&mut self, page: u8, data: &[u8; PAGE_SIZE]) -> Result<Ack, Error> {
        self.send_command(&Frame::write_page(page, data))
    }

    /// Read a 32-bit page of tag memory
    pub fn read_tag_page(&mut self, page: u8) -> Result<[u8; PAGE_SIZE], Error> {
        self.send_command(&Frame::read_page(page))?;
        let mut data = [0u8; PAGE_SIZE];
        self.read_exact(&mut data)?;
        Ok(data)
    }

    /// Program one byte of reader EEPROM
    pub fn write_eeprom_byte(&mut self, address: u8, value: u8) -> Result<Ack, Error> {
        self.send_command(&Frame::program_eeprom(address, value))
    }

    /// Program consecutive EEPROM bytes starting at `start_address`
    ///
    /// Stops at the first byte the reader rejects. The bytes before it stay
    /// written, so on error the range holds a mix of old and new content.
    pub fn write_eeprom(&mut self, start_address: u8, data: &[u8]) -> Result<(), Error> {
        self.wait_listening()?;
        for (i, &value) in data.iter().enumerate() {
            let address = start_address.wrapping_add(i as u8);
            if let Err(e) = self.write_eeprom_byte(address, value) {
                debug!("EEPROM write stopped at {address:#04X}: {e}");
                return Err(e);
            }
        }
        Ok(())
    }
}
