use thiserror::Error as DeriveError;

#[derive(DeriveError, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Reader not listening after {timeout_ms} ms")]
    NotListening { timeout_ms: u32 },

    #[error("No response from reader after {timeout_ms} ms")]
    NoResponse { timeout_ms: u32 },

    #[error("Acknowledgment rejected: got {ack:#04X}, mask {mask:#04X}")]
    Rejected { ack: u8, mask: u8 },

    #[error("Serial transport error")]
    Transport,

    #[error("Ready signal could not be read")]
    ReadyPin,

    #[error("Frame does not match command parameter count")]
    InvalidFrame,

    #[error("Buffer too small")]
    BufferTooSmall,
}

impl Error {
    /// True when the failure came from a poller deadline rather than the device's answer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NotListening { .. } | Self::NoResponse { .. })
    }

    /// Raw acknowledgment byte, if the device answered.
    pub fn ack(&self) -> Option<u8> {
        match self {
            Self::Rejected { ack, .. } => Some(*ack),
            _ => None,
        }
    }
}
