//! Timeout helpers used across the crate.
//!
//! Card-side timeouts are expressed in ETU (elementary time units, ~9.44 us
//! at the 106 kbps base rate); transport timeouts are milliseconds. These
//! helpers centralize both and the conversion between them.

use std::time::Duration;

/// Default read timeout in milliseconds used by transports when a caller
/// doesn't provide an explicit timeout.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Nanoseconds per ETU at 106 kbps (128 / 13.56 MHz).
const ETU_NANOS: u64 = 9440;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convenience: default read timeout as Duration.
pub fn default_read_timeout() -> Duration {
    ms(DEFAULT_READ_TIMEOUT_MS)
}

/// Convert a card timeout in ETU to the milliseconds the transport should
/// wait for the reader's answer, rounded up and with headroom for the
/// reader's own turnaround.
pub fn etu_to_ms(etu: u16) -> u64 {
    let card_ms = (u64::from(etu) * ETU_NANOS).div_ceil(1_000_000);
    card_ms + DEFAULT_READ_TIMEOUT_MS
}
