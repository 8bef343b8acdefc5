use packed_struct::PackingError;

/// Errors that can be produced while encoding or decoding protocol frames
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("Expected a {expected} byte frame, but only got {got} bytes")]
    Short { expected: usize, got: usize },
    #[error("The response header was {got:#04x}, but the request opcode was {expected:#04x}")]
    HeaderMismatch { expected: u8, got: u8 },
    #[error("The device rejected the write with status {0:#04x}")]
    Rejected(u8),
    #[error("We didn't get a valid op code: {0:#04x}")]
    UnknownOpcode(u8),
    #[error("Frame packing failed")]
    Packing(#[from] PackingError),
}
