//! The errors a register exchange can end in

use crate::transport;
use picoice_wire::{
    FrameError,
    Opcode,
    PackingError,
};
use thiserror::Error;

/// Why a register read or write failed. None of these are retried by the client, the caller
/// decides what to do next.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The underlying send or receive failed (unplugged device, port error)
    #[error("Transport error")]
    TransportIo(#[from] transport::Error),
    /// The device didn't send a whole response before the read timed out
    #[error("Short response: expected {expected} bytes, got {got}")]
    ShortResponse { expected: usize, got: usize },
    /// The response didn't echo the request opcode, so the stream is probably out of sync
    #[error("Response header {got:#04x} doesn't match request opcode {expected:#04x}")]
    HeaderMismatch { expected: u8, got: u8 },
    /// The device echoed the write but reported a nonzero status
    #[error("Device rejected the write with status {0:#04x}")]
    DeviceRejected(u8),
    #[error("Frame encoding failed")]
    Encoding(#[source] PackingError),
}

impl From<FrameError> for ProtocolError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Short { expected, got } => Self::ShortResponse { expected, got },
            FrameError::HeaderMismatch { expected, got } => Self::HeaderMismatch { expected, got },
            FrameError::Rejected(status) => Self::DeviceRejected(status),
            // Only `Request::parse` (device side) produces this, never response decoding.
            FrameError::UnknownOpcode(got) => Self::HeaderMismatch {
                expected: Opcode::Read.byte(),
                got,
            },
            FrameError::Packing(e) => Self::Encoding(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_errors_map() {
        assert!(matches!(
            ProtocolError::from(FrameError::Short {
                expected: 3,
                got: 1
            }),
            ProtocolError::ShortResponse {
                expected: 3,
                got: 1
            }
        ));
        assert!(matches!(
            ProtocolError::from(FrameError::Rejected(7)),
            ProtocolError::DeviceRejected(7)
        ));
    }

    #[test]
    fn test_unknown_opcode_names_a_real_opcode() {
        let err = ProtocolError::from(FrameError::UnknownOpcode(0x12));
        assert!(matches!(
            err,
            ProtocolError::HeaderMismatch {
                expected: 0x55,
                got: 0x12
            }
        ));
        let msg = err.to_string();
        assert!(!msg.contains("0x00"), "{msg}");
        assert!(msg.contains("0x55"), "{msg}");
    }
}
