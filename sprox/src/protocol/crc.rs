// sprox-rs/sprox/src/protocol/crc.rs

//! Card-side CRCs. These cover the frames the host builds itself on the
//! raw-exchange paths; when `append_crc` is requested the reader computes
//! and strips them on our behalf instead.

/// Shared update step for the reflected 0x8408 polynomial.
fn crc16_update(crc: u16, byte: u8) -> u16 {
    let mut ch = byte ^ (crc as u8);
    ch ^= ch << 4;
    (crc >> 8) ^ ((ch as u16) << 8) ^ ((ch as u16) << 3) ^ ((ch as u16) >> 4)
}

/// CRC_A per ISO/IEC 14443-3: polynomial 0x8408, seed 0x6363, no final
/// complement. Appended to the frame least-significant byte first.
pub fn crc_a(data: &[u8]) -> u16 {
    data.iter().fold(0x6363u16, |crc, &b| crc16_update(crc, b))
}

/// CRC_B per ISO/IEC 13239 (as referenced by ISO/IEC 14443-3): polynomial
/// 0x8408, seed 0xFFFF, complemented result. Appended LSB first.
pub fn crc_b(data: &[u8]) -> u16 {
    !data.iter().fold(0xFFFFu16, |crc, &b| crc16_update(crc, b))
}

/// ISO/IEC 15693-3 uses the same X.25 CRC as type B.
pub fn crc_iso15693(data: &[u8]) -> u16 {
    crc_b(data)
}

/// Append a CRC to a frame in transmission order (LSB first).
pub fn append(frame: &mut Vec<u8>, crc: u16) {
    frame.extend_from_slice(&crc.to_le_bytes());
}
