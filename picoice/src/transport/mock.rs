//! Mock transport implementations used in testing the interface

use super::{
    Error,
    Transport,
    TransportResult,
};
use picoice_wire::{
    encode_read_response,
    encode_write_response,
    FrameError,
    Request,
    Variant,
    STATUS_OK,
};
use std::{
    collections::{
        HashMap,
        VecDeque,
    },
    io,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
    },
};
use tracing::trace;

/// Misbehavior the mock device can be told to show on its next reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Answer the next write with this status (and don't store the value)
    Status(u8),
    /// Replace the leading byte of the next reply
    Header(u8),
    /// Only send the first `n` bytes of the next reply
    Truncate(usize),
    /// Don't answer the next request at all
    Silent,
    /// Leave these bytes waiting in front of the next reply
    Stale(Vec<u8>),
    /// Fail the next send as if the cable was pulled
    Disconnected,
}

/// A simulated pico-ice that decodes requests and answers them from a register file, useful for
/// testing
#[derive(Debug)]
pub struct Mock {
    registers: HashMap<u8, u16>,
    variant: Variant,
    pending: VecDeque<u8>,
    received: Vec<Vec<u8>>,
    faults: VecDeque<Fault>,
    closes: Arc<AtomicUsize>,
}

fn frame_err(e: FrameError) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidData, e))
}

impl Mock {
    /// Construct a new mock device of firmware `variant` with every register reading zero
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self::with_registers(variant, HashMap::new())
    }

    /// Construct a new mock device with preloaded `registers`
    #[must_use]
    pub fn with_registers(variant: Variant, registers: HashMap<u8, u16>) -> Self {
        Self {
            registers,
            variant,
            pending: VecDeque::new(),
            received: vec![],
            faults: VecDeque::new(),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a fault. Faults are used up one reply (or send) at a time, in order.
    pub fn inject(&mut self, fault: Fault) {
        self.faults.push_back(fault);
    }

    /// Every frame the device has been sent, in order
    #[must_use]
    pub fn received(&self) -> &[Vec<u8>] {
        &self.received
    }

    /// The current contents of a register, if it was ever written or preloaded
    #[must_use]
    pub fn register(&self, address: u8) -> Option<u16> {
        self.registers.get(&address).copied()
    }

    pub fn set_register(&mut self, address: u8, value: u16) {
        self.registers.insert(address, value);
    }

    /// A counter that goes up each time a mock is dropped (closed)
    #[must_use]
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    fn reply(&mut self, request: Request, fault: Option<&Fault>) -> TransportResult<Vec<u8>> {
        Ok(match request {
            Request::Write { address, value } => {
                let status = match fault {
                    Some(Fault::Status(s)) => *s,
                    _ => STATUS_OK,
                };
                if status == STATUS_OK {
                    self.registers.insert(address, value);
                }
                encode_write_response(status).map_err(frame_err)?.to_vec()
            }
            Request::Read { address } => {
                let value = self.registers.get(&address).copied().unwrap_or_default();
                encode_read_response(value, self.variant).map_err(frame_err)?
            }
        })
    }
}

impl Transport for Mock {
    fn send(&mut self, bytes: &[u8]) -> TransportResult<()> {
        if self.faults.front() == Some(&Fault::Disconnected) {
            self.faults.pop_front();
            return Err(Error::Disconnected);
        }
        self.received.push(bytes.to_vec());
        let mut rest = bytes;
        while !rest.is_empty() {
            let (request, used) = match Request::parse(rest) {
                Ok(v) => v,
                Err(e) => {
                    // Real firmware just drops bytes it can't make sense of
                    trace!(?e, "Mock device ignoring garbage");
                    break;
                }
            };
            rest = &rest[used..];
            let fault = self.faults.pop_front();
            let mut reply = self.reply(request, fault.as_ref())?;
            match fault {
                Some(Fault::Header(b)) => {
                    if let Some(first) = reply.first_mut() {
                        *first = b;
                    }
                }
                Some(Fault::Truncate(n)) => reply.truncate(n),
                Some(Fault::Silent) => reply.clear(),
                Some(Fault::Stale(bytes)) => self.pending.extend(bytes),
                _ => {}
            }
            self.pending.extend(reply);
        }
        Ok(())
    }

    fn recv(&mut self, max: usize) -> TransportResult<Vec<u8>> {
        let n = max.min(self.pending.len());
        Ok(self.pending.drain(..n).collect())
    }

    fn clear_input(&mut self) -> TransportResult<()> {
        self.pending.clear();
        Ok(())
    }
}

impl Drop for Mock {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
