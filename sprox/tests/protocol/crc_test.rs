use sprox::protocol::{crc_a, crc_b, crc_iso15693};

#[test]
fn crc_a_reference_vectors() {
    // seed value survives the empty frame
    assert_eq!(crc_a(&[]), 0x6363);
    // ISO/IEC 14443-3 annex example
    assert_eq!(crc_a(&[0x00, 0x00]), 0x1EA0);
}

#[test]
fn crc_b_reference_vectors() {
    assert_eq!(crc_b(&[]), 0x0000);
    // X.25 check value
    assert_eq!(crc_b(b"123456789"), 0x906E);
}

#[test]
fn iso15693_crc_is_type_b_crc() {
    for data in [&b"sprox"[..], &[0x01, 0x02, 0x03][..], &[][..]] {
        assert_eq!(crc_iso15693(data), crc_b(data));
    }
}

#[test]
fn crc_a_differs_from_crc_b() {
    let data = [0x26u8];
    assert_ne!(crc_a(&data), crc_b(&data));
}
