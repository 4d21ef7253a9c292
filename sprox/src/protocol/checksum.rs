// sprox-rs/sprox/src/protocol/checksum.rs

/// Compute the frame LRC: XOR over every byte between the STX and the LRC
/// itself. A frame with a valid LRC XORs its body to the LRC value.
pub fn lrc(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |acc, &b| acc ^ b)
}
