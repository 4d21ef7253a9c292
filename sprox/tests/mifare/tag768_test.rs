#[path = "../common/fixtures.rs"]
mod fixtures;

use fixtures::{a_select_payload, ok_frame, reselect_frames, session, status_frame};
use sprox::constants;

/// Firmware with the RAM key store only: a failed sector costs 8
/// authentication attempts, not 40.
const RAM_ONLY_FW: u32 = 0x0001_2000;

#[test]
fn bulk_read_skips_locked_sectors_and_reports_them() {
    let mut frames = vec![ok_frame(
        constants::CSB_SELECT_ANY,
        &a_select_payload([0x04, 0x00], 0x08, &[1, 2, 3, 4]),
    )];

    for sector in 0..16u8 {
        if sector == 1 {
            // the cached authentication from sector 0 is tried first and
            // rejected, then the whole RAM search comes up empty
            frames.push(status_frame(0x04, constants::MIF_READ));
            for _ in 0..8 {
                frames.extend(reselect_frames());
                frames.push(status_frame(0x04, constants::MIF_AUTH));
            }
            continue;
        }
        let fill = 0x10 + sector;
        if sector == 0 || sector == 2 {
            // cache cold: full reselect + authenticate on the first block
            frames.extend(reselect_frames());
            frames.push(ok_frame(constants::MIF_AUTH, &[]));
        }
        frames.push(ok_frame(constants::MIF_READ, &[fill; 16]));
        frames.push(ok_frame(constants::MIF_READ, &[fill; 16]));
        frames.push(ok_frame(constants::MIF_READ, &[fill; 16]));
    }

    let mut s = session(RAM_ONLY_FW, frames);
    s.a_select_any().unwrap();

    let (mask, data) = s.mif_read_tag768(None, None).unwrap();
    assert_eq!(mask, 0xFFFD, "sector 1 must be reported unreadable");
    assert_eq!(data.len(), 768);
    assert_eq!(&data[0..48], &[0x10; 48][..]);
    assert_eq!(&data[48..96], &[0u8; 48][..], "skipped sector stays zeroed");
    assert_eq!(&data[96..144], &[0x12; 48][..]);
}

#[test]
fn bulk_read_aborts_on_hard_errors() {
    let mut frames = vec![ok_frame(
        constants::CSB_SELECT_ANY,
        &a_select_payload([0x04, 0x00], 0x08, &[1, 2, 3, 4]),
    )];
    frames.extend(reselect_frames());
    frames.push(ok_frame(constants::MIF_AUTH, &[]));
    frames.push(status_frame(0x02, constants::MIF_READ)); // crc fault

    let mut s = session(RAM_ONLY_FW, frames);
    s.a_select_any().unwrap();

    assert!(matches!(
        s.mif_read_tag768(None, None),
        Err(sprox::Error::Crc)
    ));
}

#[test]
fn bulk_write_never_touches_the_manufacturer_block() {
    let mut frames = vec![ok_frame(
        constants::CSB_SELECT_ANY,
        &a_select_payload([0x04, 0x00], 0x08, &[1, 2, 3, 4]),
    )];

    // sector 0: only blocks 1 and 2 are written
    frames.extend(reselect_frames());
    frames.push(ok_frame(constants::MIF_AUTH, &[]));
    frames.push(ok_frame(constants::MIF_WRITE, &[]));
    frames.push(ok_frame(constants::MIF_WRITE, &[]));
    // sectors 1..16: three writes each, cache warm
    for _ in 1..16u8 {
        frames.push(ok_frame(constants::MIF_WRITE, &[]));
        frames.push(ok_frame(constants::MIF_WRITE, &[]));
        frames.push(ok_frame(constants::MIF_WRITE, &[]));
    }

    let (mut s, mock) = fixtures::shared_session(RAM_ONLY_FW, frames);
    s.a_select_any().unwrap();

    let image = vec![0xCC; 768];
    let mask = s.mif_write_tag768(None, &image, None).unwrap();
    assert_eq!(mask, 0xFFFF);

    let writes = fixtures::sent_params(&mock, constants::MIF_WRITE);
    assert_eq!(writes.len(), 47, "15 sectors x 3 blocks + 2 in sector 0");
    assert!(
        writes.iter().all(|w| w[0] != 0),
        "block 0 must never be written"
    );
}
