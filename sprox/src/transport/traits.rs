// sprox-rs/sprox/src/transport/traits.rs

use crate::Result;

/// Transport trait abstracts I/O away from protocol logic. A transport is a
/// byte-duplex channel to one reader: serial port, USB pipe or RS-485 bus
/// drop. Framing above this level is the protocol module's business; a
/// transport moves whole byte strings and nothing else.
pub trait Transport {
    /// Send raw bytes to the reader
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive raw bytes from the reader with a timeout in milliseconds
    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>>;

    /// Perform a transport-level reset
    fn reset(&mut self) -> Result<()>;

    /// Human-readable channel description for diagnostics ("usb", a serial
    /// device path, ...). Default is an opaque placeholder so existing
    /// transports keep working.
    fn describe(&self) -> String {
        "unknown".to_string()
    }
}
