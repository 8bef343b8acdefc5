//! Defines the byte-stream interface every picoice transport must implement

pub mod mock;
pub mod serial;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Internal system IO error")]
    Io(#[from] std::io::Error),
    #[error("Error from the serial port")]
    Serial(#[from] serialport::Error),
    #[error("The device is disconnected")]
    Disconnected,
}

pub type TransportResult<T> = Result<T, Error>;

/// The trait that is implemented for the byte streams a pico-ice can be reached over.
/// The methods of this trait *assume* the stream is already open. Closing happens on drop, so a
/// transport is released exactly once however its owner goes away.
pub trait Transport {
    /// Send all of `bytes` as one frame. A partially sent frame is an error.
    fn send(&mut self, bytes: &[u8]) -> TransportResult<()>;

    /// Receive up to `max` bytes, blocking until they arrive or the transport's read timeout
    /// runs out. Returning fewer than `max` bytes means the timeout was hit.
    fn recv(&mut self, max: usize) -> TransportResult<Vec<u8>>;

    /// Throw away anything waiting to be read
    fn clear_input(&mut self) -> TransportResult<()>;
}

impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    fn send(&mut self, bytes: &[u8]) -> TransportResult<()> {
        (**self).send(bytes)
    }

    fn recv(&mut self, max: usize) -> TransportResult<Vec<u8>> {
        (**self).recv(max)
    }

    fn clear_input(&mut self) -> TransportResult<()> {
        (**self).clear_input()
    }
}
