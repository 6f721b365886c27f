//! Simulated RWD Hitag2 reader with EEPROM and one tag in the field

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};
use rwdh2::{Command, Error, Transport};

pub const OKAY: u8 = 0xD6;
/// OKAY with the EEPROM error bit set
pub const EEPROM_FAIL: u8 = 0xD7;
/// OKAY with the tag-okay bit cleared
pub const TAG_FAIL: u8 = 0xD4;

pub struct SimReader {
    pub eeprom: [u8; 256],
    pub tag: [[u8; 4]; 8],
    pub uid: [u8; 4],
    pub identifier: Vec<u8>,
    pub frames: Vec<Vec<u8>>,
    /// Reject the nth acknowledged frame (0-based)
    pub fail_at: Option<(usize, u8)>,
    pub silent: bool,
    acked: usize,
    rx: VecDeque<u8>,
    pending: Vec<u8>,
}

impl SimReader {
    pub fn new() -> Self {
        Self {
            eeprom: [0u8; 256],
            tag: [[0u8; 4]; 8],
            uid: [0x1A, 0x2B, 0x3C, 0x4D],
            identifier: b"a IDE RWD H2 (SEC1 V1.05) 01/02/09".to_vec(),
            frames: Vec::new(),
            fail_at: None,
            silent: false,
            acked: 0,
            rx: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    fn execute(&mut self, frame: Vec<u8>) {
        self.frames.push(frame.clone());
        let command = Command::from_opcode(frame[0]);

        if command == Some(Command::Message) {
            let identifier = self.identifier.clone();
            self.rx.extend(identifier);
            return;
        }
        if self.silent {
            return;
        }

        let n = self.acked;
        self.acked += 1;
        if let Some((at, ack)) = self.fail_at {
            if at == n {
                self.rx.push_back(ack);
                return;
            }
        }
        self.rx.push_back(OKAY);

        match command {
            Some(Command::ProgramEeprom) => self.eeprom[frame[1] as usize] = frame[2],
            Some(Command::WritePage) => self.tag[frame[1] as usize].copy_from_slice(&frame[2..6]),
            Some(Command::ReadPage) => {
                let page = self.tag[frame[1] as usize];
                self.rx.extend(page);
            }
            Some(Command::Uid) => {
                let uid = self.uid;
                self.rx.extend(uid);
            }
            _ => {}
        }
    }
}

impl Transport for SimReader {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.pending.push(byte);
        let expected = Command::from_opcode(self.pending[0]).map_or(1, |c| 1 + c.param_count());
        if self.pending.len() == expected {
            let frame = std::mem::take(&mut self.pending);
            self.execute(frame);
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<bool, Error> {
        Ok(!self.rx.is_empty())
    }

    fn receive_byte(&mut self) -> Result<u8, Error> {
        self.rx.pop_front().ok_or(Error::Transport)
    }
}

/// Ready line shared with the test so it can be flipped mid-run
#[derive(Clone, Default)]
pub struct ReadyLine {
    busy: Rc<Cell<bool>>,
}

impl ReadyLine {
    pub fn listening() -> Self {
        Self::default()
    }

    pub fn never_ready() -> Self {
        let line = Self::default();
        line.busy.set(true);
        line
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
    }
}

impl ErrorType for ReadyLine {
    type Error = ErrorKind;
}

impl InputPin for ReadyLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.busy.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.busy.get())
    }
}

/// Delay that only adds up
#[derive(Default)]
pub struct CountingDelay {
    pub ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += u64::from(ns);
    }
}
