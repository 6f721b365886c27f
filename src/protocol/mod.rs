/// Protocol module - transport-independent RWD Hitag2 command protocol
///
/// This module defines the command table, frames and acknowledgment handling
/// without depending on any particular serial backend.

pub mod commands;
pub mod frame;

pub use commands::{AckStatus, Command, OKAY, layout, mask};
pub use frame::{Ack, Frame, MAX_FRAME_SIZE};
