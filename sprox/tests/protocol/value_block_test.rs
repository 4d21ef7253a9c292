use proptest::prelude::*;
use sprox::mifare::ValueBlock;
use sprox::{BlockData, Error};

proptest! {
    #[test]
    fn value_blocks_roundtrip(value in any::<i32>(), address in any::<u8>()) {
        let encoded = ValueBlock::new(value, address).encode();
        let decoded = ValueBlock::decode(&encoded).unwrap();
        prop_assert_eq!(decoded.value, value);
        prop_assert_eq!(decoded.address, address);
    }

    #[test]
    fn single_byte_corruption_is_detected(value in any::<i32>(), address in any::<u8>(),
                                          index in 0usize..16, flip in 1u8..=255) {
        let mut bytes = *ValueBlock::new(value, address).encode().as_bytes();
        bytes[index] ^= flip;
        let corrupt = BlockData::from_bytes(bytes);
        prop_assert!(matches!(ValueBlock::decode(&corrupt), Err(Error::ValueFormat)));
    }
}

#[test]
fn known_encoding() {
    // value 1 at address 4: the classic example layout
    let block = ValueBlock::new(1, 4).encode();
    assert_eq!(
        block.as_bytes(),
        &[
            0x01, 0x00, 0x00, 0x00, 0xFE, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x00, 0x00, 0x04, 0xFB,
            0x04, 0xFB
        ]
    );
}
