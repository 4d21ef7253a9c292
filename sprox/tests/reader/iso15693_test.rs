#[path = "../common/fixtures.rs"]
mod fixtures;

use fixtures::{ok_frame, sent_params, session, shared_session, tag15693_ok};
use sprox::{Uid15693, constants};

const FW: u32 = 0x0001_4102;
const UID: [u8; 8] = [0xE0, 0x04, 0x01, 0x00, 0x12, 0x34, 0x56, 0x78];

#[test]
fn standard_and_extended_read_agree_for_low_addresses() {
    let block = [0xDEu8, 0xAD, 0xBE, 0xEF];
    let (mut s, mock) = shared_session(
        FW,
        vec![tag15693_ok(&block), tag15693_ok(&block)],
    );

    let std = s.iso15693_read_single_block(None, 0x10).unwrap();
    let ext = s.iso15693_extended_read_single_block(None, 0x10).unwrap();
    assert_eq!(std, ext);

    // same numeric address, different command byte and address width
    let frames = sent_params(&mock, constants::V3_EXCHANGE);
    assert_eq!(frames.len(), 2);
    // [crc flag, request flags, command, address...]
    assert_eq!(frames[0][2], constants::V3_CMD_READ_SINGLE);
    assert_eq!(&frames[0][3..], &[0x10]);
    assert_eq!(frames[1][2], constants::V3_CMD_EXT_READ_SINGLE);
    assert_eq!(&frames[1][3..], &[0x10, 0x00]);
}

#[test]
fn addressed_commands_reverse_the_uid_on_the_wire() {
    let uid = Uid15693::from_bytes(UID);
    let (mut s, mock) = shared_session(
        FW,
        vec![
            tag15693_ok(&[]),                 // the implicit select
            tag15693_ok(&[0x01, 0x02, 0x03, 0x04]), // the read
        ],
    );

    s.iso15693_read_single_block(Some(&uid), 0).unwrap();

    let frames = sent_params(&mock, constants::V3_EXCHANGE);
    assert_eq!(frames.len(), 2);
    // select frame: [crc flag, flags, select cmd, reversed uid]
    assert_eq!(frames[0][2], constants::V3_CMD_SELECT);
    let wire_uid: Vec<u8> = UID.iter().rev().copied().collect();
    assert_eq!(&frames[0][3..11], &wire_uid[..]);
    // the read is addressed too
    assert_eq!(frames[1][2], constants::V3_CMD_READ_SINGLE);
    assert_eq!(&frames[1][3..11], &wire_uid[..]);
}

#[test]
fn icode_sli_system_information_scenario() {
    // select-any then system info on an ICODE SLI: 28 blocks of 4 bytes
    let mut sysinfo = vec![0x04]; // only the memory-size bit set
    sysinfo.extend(UID.iter().rev());
    sysinfo.push(27); // highest block number
    sysinfo.push(0x03); // block size - 1

    let mut s = session(
        FW,
        vec![
            ok_frame(constants::V3_SELECT_ANY, &UID),
            tag15693_ok(&sysinfo),
        ],
    );

    let uid = s.iso15693_select_any(0).unwrap();
    assert_eq!(uid.as_bytes(), &UID);

    let info = s.iso15693_get_system_information(None).unwrap();
    assert_eq!(info.uid, uid);
    assert_eq!(info.block_count, Some(27));
    assert_eq!(info.block_size, Some(4));
    assert_eq!(info.dsfid, None);
    assert_eq!(info.ic_reference, None);
}

#[test]
fn multi_block_write_splits_into_wire_command() {
    let (mut s, mock) = shared_session(FW, vec![tag15693_ok(&[])]);

    s.iso15693_write_multiple_blocks(None, 4, 2, &[0x11; 8]).unwrap();

    let frames = sent_params(&mock, constants::V3_EXCHANGE);
    assert_eq!(frames[0][2], constants::V3_CMD_WRITE_MULTIPLE);
    // first block, count-1, then the data
    assert_eq!(frames[0][3], 4);
    assert_eq!(frames[0][4], 1);
    assert_eq!(&frames[0][5..], &[0x11; 8]);
}
