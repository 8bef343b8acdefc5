//! Frame layouts, and the encoding and validation of every message in the protocol

use crate::FrameError;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use packed_struct::{
    prelude::*,
    PackedStructSlice,
};

/// Number of bytes in a write request
pub const WRITE_FRAME_LEN: usize = 4;
/// Number of bytes in a read request
pub const READ_FRAME_LEN: usize = 2;
/// Number of bytes in a write response
pub const WRITE_RESPONSE_LEN: usize = 2;
/// The write status the device reports on success
pub const STATUS_OK: u8 = 0x00;

/// The leading byte of every request, echoed back as the leading byte of its response
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Write = 0xAA,
    Read = 0x55,
}

impl Opcode {
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

/// Device firmware revisions disagree on how wide a read result is. The width has to be known
/// before a read starts, so it's picked up front instead of guessed from the response.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Variant {
    /// Reads return a 16-bit value (`55 hi lo`)
    #[default]
    Wide,
    /// Reads return an 8-bit value (`55 v`)
    Narrow,
}

impl Variant {
    /// The exact number of bytes in a read response for this variant
    #[must_use]
    pub const fn read_response_len(self) -> usize {
        match self {
            Variant::Wide => 3,
            Variant::Narrow => 2,
        }
    }
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Eq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
struct WriteFrame {
    #[packed_field(bits = "0..=7")]
    opcode: u8,
    #[packed_field(bits = "8..=15")]
    address: u8,
    #[packed_field(bits = "16..=31", endian = "msb")]
    value: u16,
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Eq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "2")]
struct ReadFrame {
    #[packed_field(bits = "0..=7")]
    opcode: u8,
    #[packed_field(bits = "8..=15")]
    address: u8,
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Eq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "2")]
struct WriteResponse {
    #[packed_field(bits = "0..=7")]
    opcode: u8,
    #[packed_field(bits = "8..=15")]
    status: u8,
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Eq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "3")]
struct WideReadResponse {
    #[packed_field(bits = "0..=7")]
    opcode: u8,
    #[packed_field(bits = "8..=23", endian = "msb")]
    value: u16,
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Eq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "2")]
struct NarrowReadResponse {
    #[packed_field(bits = "0..=7")]
    opcode: u8,
    #[packed_field(bits = "8..=15")]
    value: u8,
}

/// Encode a request to write `value` into the register at `address`
/// # Errors
/// Returns an error if packing fails
pub fn encode_write(address: u8, value: u16) -> Result<[u8; WRITE_FRAME_LEN], FrameError> {
    Ok(WriteFrame {
        opcode: Opcode::Write.byte(),
        address,
        value,
    }
    .pack()?)
}

/// Encode a request to read the register at `address`
/// # Errors
/// Returns an error if packing fails
pub fn encode_read(address: u8) -> Result<[u8; READ_FRAME_LEN], FrameError> {
    Ok(ReadFrame {
        opcode: Opcode::Read.byte(),
        address,
    }
    .pack()?)
}

/// The byte count is checked first so a truncated (or empty) response never gets indexed
fn check_len(bytes: &[u8], expected: usize) -> Result<(), FrameError> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(FrameError::Short {
            expected,
            got: bytes.len(),
        })
    }
}

fn check_header(got: u8, opcode: Opcode) -> Result<(), FrameError> {
    if got == opcode.byte() {
        Ok(())
    } else {
        Err(FrameError::HeaderMismatch {
            expected: opcode.byte(),
            got,
        })
    }
}

/// Validate the response to a write request
/// # Errors
/// Returns an error if the response is the wrong length, doesn't echo the write opcode, or
/// carries a nonzero status
pub fn decode_write_response(bytes: &[u8]) -> Result<(), FrameError> {
    check_len(bytes, WRITE_RESPONSE_LEN)?;
    let resp = WriteResponse::unpack_from_slice(bytes)?;
    check_header(resp.opcode, Opcode::Write)?;
    if resp.status != STATUS_OK {
        return Err(FrameError::Rejected(resp.status));
    }
    Ok(())
}

/// Validate the response to a read request and pull out the register value
/// # Errors
/// Returns an error if the response is the wrong length for `variant` or doesn't echo the read
/// opcode
pub fn decode_read_response(bytes: &[u8], variant: Variant) -> Result<u16, FrameError> {
    check_len(bytes, variant.read_response_len())?;
    let (opcode, value) = match variant {
        Variant::Wide => {
            let resp = WideReadResponse::unpack_from_slice(bytes)?;
            (resp.opcode, resp.value)
        }
        Variant::Narrow => {
            let resp = NarrowReadResponse::unpack_from_slice(bytes)?;
            (resp.opcode, u16::from(resp.value))
        }
    };
    check_header(opcode, Opcode::Read)?;
    Ok(value)
}

/// A request as the device sees it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Request {
    Write { address: u8, value: u16 },
    Read { address: u8 },
}

impl Request {
    /// Decode one request from the front of `bytes`, returning it along with the number of bytes
    /// it took up
    /// # Errors
    /// Returns an error if the leading byte isn't an opcode or the frame is cut off
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), FrameError> {
        let Some(&first) = bytes.first() else {
            return Err(FrameError::Short {
                expected: READ_FRAME_LEN,
                got: 0,
            });
        };
        match Opcode::from_u8(first) {
            Some(Opcode::Write) => {
                let frame = bytes.get(..WRITE_FRAME_LEN).ok_or(FrameError::Short {
                    expected: WRITE_FRAME_LEN,
                    got: bytes.len(),
                })?;
                let frame = WriteFrame::unpack_from_slice(frame)?;
                Ok((
                    Request::Write {
                        address: frame.address,
                        value: frame.value,
                    },
                    WRITE_FRAME_LEN,
                ))
            }
            Some(Opcode::Read) => {
                let frame = bytes.get(..READ_FRAME_LEN).ok_or(FrameError::Short {
                    expected: READ_FRAME_LEN,
                    got: bytes.len(),
                })?;
                let frame = ReadFrame::unpack_from_slice(frame)?;
                Ok((
                    Request::Read {
                        address: frame.address,
                    },
                    READ_FRAME_LEN,
                ))
            }
            None => Err(FrameError::UnknownOpcode(first)),
        }
    }
}

/// Encode the device's answer to a write request
/// # Errors
/// Returns an error if packing fails
pub fn encode_write_response(status: u8) -> Result<[u8; WRITE_RESPONSE_LEN], FrameError> {
    Ok(WriteResponse {
        opcode: Opcode::Write.byte(),
        status,
    }
    .pack()?)
}

/// Encode the device's answer to a read request. Narrow devices only report the low byte.
/// # Errors
/// Returns an error if packing fails
pub fn encode_read_response(value: u16, variant: Variant) -> Result<Vec<u8>, FrameError> {
    let opcode = Opcode::Read.byte();
    Ok(match variant {
        Variant::Wide => WideReadResponse { opcode, value }.pack()?.to_vec(),
        Variant::Narrow => NarrowReadResponse {
            opcode,
            value: value.to_be_bytes()[1],
        }
        .pack()?
        .to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paste::paste;

    #[test]
    fn test_write_layout() -> anyhow::Result<()> {
        let bytes = encode_write(0x06, 0b0000_0000_0011_1111)?;
        assert_eq!(bytes, [0xAA, 0x06, 0x00, 0x3F]);
        let bytes = encode_write(0xFF, 0xBEEF)?;
        assert_eq!(bytes, [0xAA, 0xFF, 0xBE, 0xEF]);
        Ok(())
    }

    #[test]
    fn test_opcode_bytes() {
        assert_eq!(Opcode::Write.byte(), 0xAA);
        assert_eq!(Opcode::Read.byte(), 0x55);
        assert_eq!(Opcode::from_u8(0xAA), Some(Opcode::Write));
        assert_eq!(Opcode::from_u8(0x55), Some(Opcode::Read));
        assert_eq!(Opcode::from_u8(0x00), None);
    }

    #[test]
    fn test_read_layout() {
        assert_eq!(encode_read(0x02).unwrap(), [0x55, 0x02]);
    }

    #[test]
    fn test_write_parses_back() {
        // Every address, with values that exercise both bytes
        for address in 0..=u8::MAX {
            for value in [0u16, 1, 0x00FF, 0x0100, 0x7FFF, 0x8000, 0xA55A, u16::MAX] {
                let bytes = encode_write(address, value).unwrap();
                let (req, used) = Request::parse(&bytes).unwrap();
                assert_eq!(req, Request::Write { address, value });
                assert_eq!(used, WRITE_FRAME_LEN);
            }
        }
    }

    #[test]
    fn test_read_parses_back() {
        for address in 0..=u8::MAX {
            let bytes = encode_read(address).unwrap();
            let (req, used) = Request::parse(&bytes).unwrap();
            assert_eq!(req, Request::Read { address });
            assert_eq!(used, READ_FRAME_LEN);
        }
    }

    #[test]
    fn test_parse_leaves_trailing_bytes() {
        let (req, used) = Request::parse(&[0x55, 0x10, 0xAA, 0x00]).unwrap();
        assert_eq!(req, Request::Read { address: 0x10 });
        assert_eq!(used, 2);
    }

    #[test]
    fn test_parse_bad_opcode() {
        assert!(matches!(
            Request::parse(&[0x12, 0x00]),
            Err(FrameError::UnknownOpcode(0x12))
        ));
    }

    #[test]
    fn test_parse_truncated() {
        assert!(matches!(
            Request::parse(&[0xAA, 0x01, 0x02]),
            Err(FrameError::Short {
                expected: 4,
                got: 3
            })
        ));
        assert!(matches!(
            Request::parse(&[]),
            Err(FrameError::Short { got: 0, .. })
        ));
    }

    #[test]
    fn test_write_ok() {
        decode_write_response(&[0xAA, 0x00]).unwrap();
        decode_write_response(&encode_write_response(STATUS_OK).unwrap()).unwrap();
    }

    #[test]
    fn test_write_rejected() {
        assert!(matches!(
            decode_write_response(&[0xAA, 0x07]),
            Err(FrameError::Rejected(7))
        ));
    }

    #[test]
    fn test_write_bad_header() {
        assert!(matches!(
            decode_write_response(&[0x00, 0x00]),
            Err(FrameError::HeaderMismatch {
                expected: 0xAA,
                got: 0x00
            })
        ));
    }

    #[test]
    fn test_length_checked_before_header() {
        assert!(matches!(
            decode_write_response(&[]),
            Err(FrameError::Short {
                expected: 2,
                got: 0
            })
        ));
        assert!(matches!(
            decode_read_response(&[0x00], Variant::Wide),
            Err(FrameError::Short {
                expected: 3,
                got: 1
            })
        ));
    }

    #[test]
    fn test_read_bad_header() {
        assert!(matches!(
            decode_read_response(&[0xAA, 0x00, 0x01], Variant::Wide),
            Err(FrameError::HeaderMismatch {
                expected: 0x55,
                got: 0xAA
            })
        ));
    }

    #[test]
    fn test_narrow_device_drops_high_byte() {
        let bytes = encode_read_response(0x1234, Variant::Narrow).unwrap();
        assert_eq!(bytes, [0x55, 0x34]);
    }

    macro_rules! test_read_value {
        ($variant:ident, $bytes:expr, $v:literal) => {
            paste! {
                #[test]
                fn [<test_read_ $variant:lower _ $v>]() {
                    let value = decode_read_response(&$bytes, Variant::$variant).unwrap();
                    assert_eq!(value, $v);
                }
            }
        };
    }

    test_read_value!(Wide, [0x55, 0x00, 0x01], 1);
    test_read_value!(Wide, [0x55, 0x01, 0x00], 256);
    test_read_value!(Wide, [0x55, 0xFF, 0xFF], 65535);
    test_read_value!(Narrow, [0x55, 0x7F], 127);
    test_read_value!(Narrow, [0x55, 0xFF], 255);
}
