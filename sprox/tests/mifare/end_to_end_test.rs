#[path = "../common/fixtures.rs"]
mod fixtures;

use fixtures::{a_select_payload, ok_frame, reselect_frames, session};
use sprox::constants;
use sprox::mifare::{MifareKey, TRANSPORT_KEY};

const FW: u32 = 0x0001_4102;

/// The canonical first contact with a Mifare Classic 1K: select, read the
/// manufacturer block with the transport key, halt, reselect.
#[test]
fn classic_1k_manufacturer_block_scenario() {
    let uid = [0x04u8, 0x8A, 0x1B, 0x2C];
    let bcc = uid[0] ^ uid[1] ^ uid[2] ^ uid[3];
    let mut block0 = Vec::with_capacity(16);
    block0.extend_from_slice(&uid);
    block0.push(bcc);
    block0.extend_from_slice(&[0x88, 0x04, 0x00, 0xC8, 0x32, 0x00, 0x20, 0x00, 0x00, 0x00, 0x14]);

    let mut frames = vec![ok_frame(
        constants::CSB_SELECT_ANY,
        &a_select_payload([0x04, 0x00], 0x08, &uid),
    )];
    frames.extend(reselect_frames());
    frames.push(ok_frame(constants::MIF_AUTH, &[]));
    frames.push(ok_frame(constants::MIF_READ, &block0));
    frames.push(ok_frame(constants::CSB_A_HALT, &[]));
    frames.extend(reselect_frames());

    let mut s = session(FW, frames);

    // a Mifare Classic 1K announces itself with SAK 0x08
    let (got_uid, _atq, sak) = s.a_select_any().unwrap();
    assert!(sak.is_mifare_classic());
    assert!(!sak.supports_iso14443_4());
    assert_eq!(got_uid.as_bytes(), &uid);

    // sector 0 opens with the factory transport key
    let key = MifareKey::from(TRANSPORT_KEY);
    let data = s.mif_read_block(None, 0, Some(&key)).unwrap();
    let bytes = data.as_bytes();
    assert_eq!(&bytes[0..4], &uid, "block 0 leads with the uid");
    assert_eq!(bytes[4], bcc, "then the bcc");

    // halt, then the same uid reselects
    s.a_halt().unwrap();
    s.a_select_again(None).unwrap();
    assert_eq!(s.selected_a_uid().unwrap().as_bytes(), &uid);
}

/// A DESFire-style card: layer 3 select, then the T=CL activation chain.
#[test]
fn iso14443_4_activation_scenario() {
    let uid = [0x04u8, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
    let raw_ats = [0x06u8, 0x77, 0x40, 0x00, 0x02, 0x00];

    let frames = vec![
        ok_frame(
            constants::CSB_SELECT_ANY,
            &a_select_payload([0x44, 0x03], 0x20, &uid),
        ),
        ok_frame(constants::TCL_GET_ATS, &raw_ats),
        ok_frame(constants::TCL_PPS, &[]),
        ok_frame(constants::TCL_EXCHANGE, &[0x91, 0x00]),
        ok_frame(constants::TCL_DESELECT, &[]),
        ok_frame(constants::CSB_A_HALT, &[]),
    ];
    let mut s = session(FW, frames);

    let (_uid, _atq, sak) = s.a_select_any().unwrap();
    assert!(sak.supports_iso14443_4());

    let ats = s.tcl_get_ats(0).unwrap();
    assert!(ats.supports_cid());
    assert_eq!(ats.ta1, Some(0x40));

    // TA1 0x81: DS 848 supported, DR only at the base rate
    s.tcl_pps(0, 3, 0).unwrap();

    let resp = s.tcl_exchange(0, &[0x90, 0x60, 0x00, 0x00, 0x00], 64).unwrap();
    assert_eq!(resp, vec![0x91, 0x00]);

    // deselect must precede the halt while T=CL is active
    s.tcl_deselect(0).unwrap();
    s.a_halt().unwrap();
}
