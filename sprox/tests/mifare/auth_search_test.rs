#[path = "../common/fixtures.rs"]
mod fixtures;

use fixtures::{a_select_payload, ok_frame, reselect_frames, sent_params, shared_session, status_frame};
use sprox::constants;
use sprox::mifare::MifareKey;

/// Firmware with the RAM key store only, so a search never leaves it.
const RAM_ONLY_FW: u32 = 0x0001_2000;

#[test]
fn read_search_walks_ram_slots_a_then_b_per_slot() {
    // The card's real key sits in RAM slot 2, type B. A read with no
    // explicit key must try slot 0 A, slot 0 B, slot 1 A, slot 1 B,
    // slot 2 A and then succeed on slot 2 B, never touching EEPROM.
    let mut frames = vec![ok_frame(
        constants::CSB_SELECT_ANY,
        &a_select_payload([0x04, 0x00], 0x08, &[1, 2, 3, 4]),
    )];
    for _ in 0..5 {
        frames.extend(reselect_frames());
        frames.push(status_frame(0x04, constants::MIF_AUTH));
    }
    frames.extend(reselect_frames());
    frames.push(ok_frame(constants::MIF_AUTH, &[]));
    frames.push(ok_frame(constants::MIF_READ, &[0x77; 16]));

    let (mut s, mock) = shared_session(RAM_ONLY_FW, frames);
    s.a_select_any().unwrap();

    let data = s.mif_read_block(None, 4, None).unwrap();
    assert_eq!(data.as_bytes(), &[0x77; 16]);

    let attempts = sent_params(&mock, constants::MIF_AUTH);
    assert_eq!(attempts.len(), 6);
    // params: key type code, store code, slot, block
    let expected = [
        (0x60u8, 0u8),
        (0x61, 0),
        (0x60, 1),
        (0x61, 1),
        (0x60, 2),
        (0x61, 2),
    ];
    for (attempt, (kt, slot)) in attempts.iter().zip(expected) {
        assert_eq!(attempt[0], kt);
        assert_eq!(attempt[1], 0x01, "search left the ram store");
        assert_eq!(attempt[2], slot);
        assert_eq!(attempt[3], 4);
    }
}

#[test]
fn write_search_tries_b_before_a() {
    let mut frames = vec![ok_frame(
        constants::CSB_SELECT_ANY,
        &a_select_payload([0x04, 0x00], 0x08, &[1, 2, 3, 4]),
    )];
    frames.extend(reselect_frames());
    frames.push(ok_frame(constants::MIF_AUTH, &[]));
    frames.push(ok_frame(constants::MIF_WRITE, &[]));

    let (mut s, mock) = shared_session(RAM_ONLY_FW, frames);
    s.a_select_any().unwrap();

    let block = sprox::BlockData::from_bytes([0xA5; 16]);
    s.mif_write_block(None, 5, &block, None).unwrap();

    let attempts = sent_params(&mock, constants::MIF_AUTH);
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0][0], 0x61, "write must lead with key B");
}

#[test]
fn every_attempt_reselects_the_card_first() {
    let mut frames = vec![ok_frame(
        constants::CSB_SELECT_ANY,
        &a_select_payload([0x04, 0x00], 0x08, &[1, 2, 3, 4]),
    )];
    for _ in 0..2 {
        frames.extend(reselect_frames());
        frames.push(status_frame(0x04, constants::MIF_AUTH));
    }
    frames.extend(reselect_frames());
    frames.push(ok_frame(constants::MIF_AUTH, &[]));
    frames.push(ok_frame(constants::MIF_READ, &[0x01; 16]));

    let (mut s, mock) = shared_session(RAM_ONLY_FW, frames);
    s.a_select_any().unwrap();
    s.mif_read_block(None, 0, None).unwrap();

    // one wake-up per authentication attempt
    let wakeups = sent_params(&mock, constants::CSB_A_REQUEST);
    assert_eq!(wakeups.len(), 3);
}

#[test]
fn explicit_key_skips_the_stored_search() {
    let mut frames = vec![ok_frame(
        constants::CSB_SELECT_ANY,
        &a_select_payload([0x04, 0x00], 0x08, &[1, 2, 3, 4]),
    )];
    frames.extend(reselect_frames());
    frames.push(ok_frame(constants::MIF_AUTH, &[]));
    frames.push(ok_frame(constants::MIF_READ, &[0x55; 16]));

    let (mut s, mock) = shared_session(RAM_ONLY_FW, frames);
    s.a_select_any().unwrap();

    let key = MifareKey::from([0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F]);
    s.mif_read_block(None, 1, Some(&key)).unwrap();

    let attempts = sent_params(&mock, constants::MIF_AUTH);
    assert_eq!(attempts.len(), 1);
    // explicit value key: no store slot, key bytes inline
    assert_eq!(attempts[0][1], 0x00);
    assert_eq!(&attempts[0][4..], &[0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F]);
}
