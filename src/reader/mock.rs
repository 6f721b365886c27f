use std::collections::VecDeque;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

use super::Rwdh2;
use crate::backend::Transport;
use crate::error::Error;
use crate::poll::tests::FakeDelay;
use crate::protocol::Command;

pub(crate) fn reader(transport: MockTransport, pin: MockPin) -> Rwdh2<MockTransport, MockPin, FakeDelay> {
    Rwdh2::new(transport, pin, FakeDelay::default())
}

/// Answers every complete frame with an acknowledgment and, for commands that
/// return data, `payload`
pub(crate) struct MockTransport {
    pub(crate) sent: Vec<u8>,
    pub(crate) frames: Vec<Vec<u8>>,
    /// Per-frame acknowledgments, consumed before falling back to `ack`
    pub(crate) acks: VecDeque<u8>,
    pub(crate) ack: Option<u8>,
    pub(crate) payload: Vec<u8>,
    rx: VecDeque<u8>,
    pending: Vec<u8>,
}

impl MockTransport {
    pub(crate) fn acking(ack: u8) -> Self {
        Self {
            sent: Vec::new(),
            frames: Vec::new(),
            acks: VecDeque::new(),
            ack: Some(ack),
            payload: Vec::new(),
            rx: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    pub(crate) fn silent() -> Self {
        Self {
            ack: None,
            ..Self::acking(0)
        }
    }

    /// Acknowledge frames with `acks` in order, then with `fallback`
    pub(crate) fn scripted(acks: &[u8], fallback: u8) -> Self {
        Self {
            acks: acks.iter().copied().collect(),
            ..Self::acking(fallback)
        }
    }

    fn frame_complete(&mut self) {
        let frame = std::mem::take(&mut self.pending);
        let command = Command::from_opcode(frame[0]);
        self.frames.push(frame);

        if command == Some(Command::Message) {
            self.rx.extend(self.payload.iter().copied());
            return;
        }
        let Some(ack) = self.acks.pop_front().or(self.ack) else {
            return;
        };
        self.rx.push_back(ack);
        if command.is_some_and(|c| c.response_len() > 0) {
            self.rx.extend(self.payload.iter().copied());
        }
    }
}

impl Transport for MockTransport {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.sent.push(byte);
        self.pending.push(byte);
        let expected = Command::from_opcode(self.pending[0]).map_or(1, |c| 1 + c.param_count());
        if self.pending.len() == expected {
            self.frame_complete();
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

/// Ready line that stays busy for a number of polls
pub(crate) struct MockPin {
    busy_polls: Option<u32>,
    pub(crate) polls: u32,
}

impl MockPin {
    pub(crate) fn ready() -> Self {
        Self::busy_for(0)
    }

    pub(crate) fn busy() -> Self {
        Self {
            busy_polls: None,
            polls: 0,
        }
    }

    pub(crate) fn busy_for(polls: u32) -> Self {
        Self {
            busy_polls: Some(polls),
            polls: 0,
        }
    }

    fn level_high(&mut self) -> bool {
        self.polls += 1;
        match self.busy_polls.as_mut() {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }
}

impl ErrorType for MockPin {
    type Error = ErrorKind;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level_high())
    }
}
