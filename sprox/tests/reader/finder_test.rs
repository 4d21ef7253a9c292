#[path = "../common/fixtures.rs"]
mod fixtures;

use fixtures::{a_select_payload, ok_frame, session, shared_session, status_frame};
use sprox::finder::{Protocol, Protocols, TagInfo};
use sprox::{Error, constants};

const FW: u32 = 0x0001_4102;

#[test]
fn arbitration_priority_is_a_b_bprime_15693_icode1() {
    let (mut s, mock) = shared_session(
        FW,
        vec![
            status_frame(0x01, constants::CSB_SELECT_ANY),
            status_frame(0x01, constants::CSB_B_SELECT_ANY),
            status_frame(0x01, constants::BI_APGEN),
            status_frame(0x01, constants::V3_SELECT_ANY),
            ok_frame(
                constants::I1_SELECT_ANY,
                &[0xE0, 0x07, 0, 0, 1, 2, 3, 4],
            ),
        ],
    );

    let tag = s.find(Protocols::ANY).unwrap();
    assert_eq!(tag.protocol, Protocol::Icode1);

    let opcodes: Vec<u8> = mock
        .borrow()
        .sent
        .iter()
        .skip(1) // firmware query
        .map(|f| f[1])
        .collect();
    assert_eq!(
        opcodes,
        vec![
            constants::CSB_SELECT_ANY,
            constants::CSB_B_SELECT_ANY,
            constants::BI_APGEN,
            constants::V3_SELECT_ANY,
            constants::I1_SELECT_ANY,
        ]
    );
}

#[test]
fn mask_limits_the_families_tried() {
    let (mut s, mock) = shared_session(
        FW,
        vec![
            status_frame(0x01, constants::CSB_B_SELECT_ANY),
            status_frame(0x01, constants::V3_SELECT_ANY),
        ],
    );

    let res = s.find(Protocols::TYPE_B | Protocols::ISO15693);
    assert!(matches!(res, Err(Error::NoTag)));

    let opcodes: Vec<u8> = mock.borrow().sent.iter().skip(1).map(|f| f[1]).collect();
    assert_eq!(
        opcodes,
        vec![constants::CSB_B_SELECT_ANY, constants::V3_SELECT_ANY]
    );
}

#[test]
fn found_type_a_tag_carries_atq_and_sak() {
    let mut s = session(
        FW,
        vec![ok_frame(
            constants::CSB_SELECT_ANY,
            &a_select_payload([0x04, 0x00], 0x20, &[1, 2, 3, 4]),
        )],
    );

    let tag = s.find(Protocols::TYPE_A).unwrap();
    match tag.info {
        TagInfo::TypeA { atq, sak } => {
            assert_eq!(atq.as_bytes(), &[0x04, 0x00]);
            assert!(sak.supports_iso14443_4());
        }
        other => panic!("expected type A info, got {:?}", other),
    }
}

#[test]
fn find_wait_returns_quit_when_cancelled() {
    let mut s = session(FW, vec![]);
    let canceller = s.find_canceller();
    canceller.cancel();
    assert!(matches!(
        s.find_wait(Protocols::TYPE_A | Protocols::TYPE_B, 1, 500),
        Err(Error::Quit)
    ));
}

#[test]
fn find_wait_polls_until_the_card_arrives() {
    let mut s = session(
        FW,
        vec![
            status_frame(0x01, constants::CSB_SELECT_ANY),
            status_frame(0x01, constants::CSB_SELECT_ANY),
            ok_frame(
                constants::CSB_SELECT_ANY,
                &a_select_payload([0x04, 0x00], 0x08, &[5, 6, 7, 8]),
            ),
        ],
    );

    let tag = s.find_wait(Protocols::TYPE_A, 1, 2_000).unwrap();
    assert_eq!(tag.uid, vec![5, 6, 7, 8]);
}
