//! The register client: one blocking request/response exchange per call

use crate::{
    core::{
        RegisterAddress,
        RegisterValue,
    },
    error::ProtocolError,
    transport::Transport,
};
use picoice_wire::{
    decode_read_response,
    decode_write_response,
    encode_read,
    encode_write,
    Variant,
    WRITE_RESPONSE_LEN,
};
use tracing::{
    debug,
    info,
    trace,
    warn,
};

/// Reads and writes pico-ice registers over a transport it owns.
///
/// The protocol has no request identifiers, so exchanges can't overlap. Every method takes
/// `&mut self` and finishes its whole exchange before returning. To share a client between
/// threads, put it behind a [`std::sync::Mutex`].
///
/// Dropping the client drops (and so closes) the transport.
#[derive(Debug)]
pub struct RegisterClient<T> {
    transport: T,
    variant: Variant,
}

impl<T> RegisterClient<T>
where
    T: Transport,
{
    /// Wrap an already open `transport` talking to firmware of the given `variant`
    pub fn new(transport: T, variant: Variant) -> Self {
        Self { transport, variant }
    }

    /// The firmware variant this client decodes reads for
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Give back the transport without closing it
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Write `value` to the register at `address`
    /// # Errors
    /// Returns an error on transport failures, on a short or mismatched response, or if the
    /// device reports a nonzero status
    pub fn write_register(
        &mut self,
        address: RegisterAddress,
        value: RegisterValue,
    ) -> Result<(), ProtocolError> {
        let request = encode_write(address, value)?;
        let response = self.exchange(&request, WRITE_RESPONSE_LEN)?;
        match decode_write_response(&response) {
            Ok(()) => {
                debug!(address, value, "Register write acknowledged");
                Ok(())
            }
            Err(e) => {
                warn!(address, value, error = %e, "Register write failed");
                Err(e.into())
            }
        }
    }

    /// Read the current value of the register at `address`. Narrow firmware only reports 8 bits,
    /// which come back zero-extended.
    /// # Errors
    /// Returns an error on transport failures or on a short or mismatched response
    pub fn read_register(
        &mut self,
        address: RegisterAddress,
    ) -> Result<RegisterValue, ProtocolError> {
        let request = encode_read(address)?;
        let response = self.exchange(&request, self.variant.read_response_len())?;
        match decode_read_response(&response, self.variant) {
            Ok(value) => {
                debug!(address, value, "Register read");
                Ok(value)
            }
            Err(e) => {
                warn!(address, error = %e, "Register read failed");
                Err(e.into())
            }
        }
    }

    /// Throw away whatever is sitting in the receive buffer. After a
    /// [`ProtocolError::HeaderMismatch`] there may be leftover bytes from an earlier exchange,
    /// and this gets the next exchange back in step. The client never does this on its own.
    /// # Errors
    /// Returns an error if the transport can't clear its input
    pub fn resync(&mut self) -> Result<(), ProtocolError> {
        info!("Clearing receive buffer to resynchronize");
        self.transport.clear_input()?;
        Ok(())
    }

    fn exchange(&mut self, request: &[u8], response_len: usize) -> Result<Vec<u8>, ProtocolError> {
        trace!(bytes = ?request, "Sending frame");
        let response = self
            .transport
            .send(request)
            .and_then(|()| self.transport.recv(response_len));
        match response {
            Ok(response) => {
                trace!(bytes = ?response, "Received frame");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Transport failed during exchange");
                Err(e.into())
            }
        }
    }
}
