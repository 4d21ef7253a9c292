use proptest::prelude::*;
use sprox::protocol::{Frame, lrc};
use sprox::{Error, constants};

#[test]
fn request_frame_wraps_payload() {
    let frame = Frame::encode_request(constants::CSB_A_EXCHANGE, &[0x01, 0x02, 0x03]).unwrap();
    assert_eq!(frame[0], constants::FRAME_STX);
    assert_eq!(frame[1], constants::CSB_A_EXCHANGE);
    assert_eq!(u16::from_be_bytes([frame[2], frame[3]]), 3);
    assert_eq!(frame.last().copied().unwrap(), lrc(&frame[1..frame.len() - 1]));
}

#[test]
fn capacity_is_enforced_before_transmission() {
    let payload = vec![0u8; constants::FRAME_CONTENT_SIZE + 1];
    assert!(matches!(
        Frame::encode_request(0x24, &payload),
        Err(Error::CommandOverflow { .. })
    ));
    // at the limit it still goes through
    let payload = vec![0u8; constants::FRAME_CONTENT_SIZE];
    assert!(Frame::encode_request(0x24, &payload).is_ok());
}

proptest! {
    #[test]
    fn response_frames_roundtrip(status in any::<u8>(), opcode in any::<u8>(),
                                 payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let raw = Frame::encode_response(status, opcode, &payload).unwrap();
        let decoded = Frame::decode_response(&raw).unwrap();
        prop_assert_eq!(decoded.status, status);
        prop_assert_eq!(decoded.opcode, opcode);
        prop_assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn truncated_frames_never_panic(payload in prop::collection::vec(any::<u8>(), 0..64),
                                    cut in 0usize..8) {
        let mut raw = Frame::encode_response(0, 0x20, &payload).unwrap();
        let new_len = raw.len().saturating_sub(cut);
        raw.truncate(new_len);
        // may fail, must not panic
        let _ = Frame::decode_response(&raw);
    }
}
