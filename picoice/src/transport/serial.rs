//! The picoice transport over a USB serial port
use super::{
    Transport,
    TransportResult,
};
use serialport::{
    ClearBuffer,
    SerialPort,
};
use std::{
    fmt,
    io::{
        ErrorKind,
        Read,
        Write,
    },
    time::{
        Duration,
        Instant,
    },
};
use tracing::debug;

/// Where the pico-ice usually enumerates on macOS
pub const DEFAULT_PORT: &str = "/dev/tty.usbmodem103";
pub const DEFAULT_BAUD: u32 = 230_400;
pub const DEFAULT_TIMEOUT: f32 = 0.5;

/// Settings used to open a [`Serial`] transport
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    /// Path or name of the port (e.g. `/dev/ttyACM0`, `COM3`)
    pub port: String,
    pub baud_rate: u32,
    /// How long a receive may wait in total before giving up with a short read
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_owned(),
            baud_rate: DEFAULT_BAUD,
            timeout: Duration::from_secs_f32(DEFAULT_TIMEOUT),
        }
    }
}

impl SerialConfig {
    /// The default settings, on a different port
    #[must_use]
    pub fn with_port(port: &str) -> Self {
        Self {
            port: port.to_owned(),
            ..Default::default()
        }
    }
}

/// A serial connection (newtype for a [`SerialPort`]). The port is closed when this is dropped.
pub struct Serial {
    port: Box<dyn SerialPort>,
    timeout: Duration,
    name: String,
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serial")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Serial {
    /// Open the serial port described by `config`
    /// # Errors
    /// Will return an error if the port can't be opened
    pub fn open(config: &SerialConfig) -> TransportResult<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(config.timeout)
            .open()?;
        debug!(port = %config.port, baud = config.baud_rate, "Opened serial port");
        Ok(Self {
            port,
            timeout: config.timeout,
            name: config.port.clone(),
        })
    }
}

/// A byte source whose blocking reads can be bounded
trait TimedRead: Read {
    fn set_read_timeout(&mut self, timeout: Duration) -> TransportResult<()>;
}

impl TimedRead for Box<dyn SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> TransportResult<()> {
        self.set_timeout(timeout)?;
        Ok(())
    }
}

/// Read until `max` bytes arrive or `timeout` runs out, whichever is first. The port's own
/// timeout applies per read call, so it's shrunk before every read to what's left of the deadline.
fn read_frame<P>(port: &mut P, max: usize, timeout: Duration) -> TransportResult<Vec<u8>>
where
    P: TimedRead + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let mut buf = vec![0u8; max];
    let mut filled = 0;
    while filled < max {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        port.set_read_timeout(remaining)?;
        match port.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => match e.kind() {
                // Compat for both windows and *nix
                ErrorKind::WouldBlock | ErrorKind::TimedOut => break,
                ErrorKind::Interrupted => {}
                _ => return Err(e.into()),
            },
        }
    }
    buf.truncate(filled);
    Ok(buf)
}

impl Transport for Serial {
    fn send(&mut self, bytes: &[u8]) -> TransportResult<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn recv(&mut self, max: usize) -> TransportResult<Vec<u8>> {
        read_frame(&mut self.port, max, self.timeout)
    }

    fn clear_input(&mut self) -> TransportResult<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

impl Drop for Serial {
    fn drop(&mut self) {
        debug!(port = %self.name, "Closing serial port");
    }
}
