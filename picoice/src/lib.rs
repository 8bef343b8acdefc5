//! A host-side client for the register access protocol of the pico-ice FPGA board.
//!
//! ```
//! # use picoice::transport::mock::Mock;
//! use picoice::prelude::*;
//!
//! # let transport = Mock::new(Variant::Wide);
//! // let transport = Serial::open(&SerialConfig::default())?;
//! let mut client = RegisterClient::new(transport, Variant::Wide);
//! client.write_register(0x06, 0x003F)?;
//! assert_eq!(client.read_register(0x06)?, 0x003F);
//! # Ok::<(), ProtocolError>(())
//! ```

pub mod client;
pub mod core;
pub mod error;
pub mod prelude;
pub mod transport;
