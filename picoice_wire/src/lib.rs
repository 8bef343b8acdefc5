//! The wire format of the pico-ice register access protocol.
//!
//! Every exchange is a fixed-size request answered by a fixed-size response. There is no length
//! prefix, checksum, or request identifier on the wire, so the only ways to notice a bad
//! response are counting its bytes and checking that it echoes the request opcode.
//!
//! | Exchange | Request             | Response      |
//! |----------|---------------------|---------------|
//! | Write    | `AA addr hi lo`     | `AA status`   |
//! | Read     | `55 addr`           | `55 hi lo` or `55 v` depending on [`Variant`] |
//!
//! This crate does no IO. The host side encodes requests and validates responses, and the
//! device side ([`Request::parse`] and the `encode_*_response` functions) is here so simulators
//! speak exactly the same format.

mod error;
pub mod frame;

pub use error::FrameError;
pub use frame::{
    decode_read_response,
    decode_write_response,
    encode_read,
    encode_read_response,
    encode_write,
    encode_write_response,
    Opcode,
    Request,
    Variant,
    READ_FRAME_LEN,
    STATUS_OK,
    WRITE_FRAME_LEN,
    WRITE_RESPONSE_LEN,
};
pub use packed_struct::PackingError;
