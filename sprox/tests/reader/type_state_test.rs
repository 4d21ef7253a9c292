#[path = "../common/fixtures.rs"]
mod fixtures;

use sprox::reader::{Capabilities, Reader};
use sprox::transport::mock::MockTransport;
use sprox::{Version, constants};

#[test]
fn open_consumes_the_uninitialized_reader() {
    let mut mock = MockTransport::new();
    mock.push_response(fixtures::firmware_frame(0x0001_4102));

    let reader = Reader::new_with_transport(Box::new(mock));
    let session = reader.open().unwrap();

    assert_eq!(session.version(), Version::from_u32(0x0001_4102));
    assert!(session.capabilities().has(Capabilities::EMBEDDED_SELECT));
    assert!(session.capabilities().has(Capabilities::SLOT_ANTICOLL));
}

#[test]
fn open_sends_exactly_one_firmware_query() {
    let (mut session, mock) = fixtures::shared_session(0x0001_3500, vec![]);
    let queries = fixtures::sent_params(&mock, constants::FCT_GET_FIRMWARE);
    assert_eq!(queries.len(), 1);
    assert!(queries[0].is_empty());

    // an unanswered function call reports a timeout
    assert!(matches!(
        session.function(constants::CSB_A_HALT, &[], 0, 100),
        Err(sprox::Error::Timeout)
    ));
}

#[test]
fn capability_resolution_tracks_version() {
    let old = fixtures::session(0x0001_1000, vec![]);
    assert!(!old.capabilities().has(Capabilities::EMBEDDED_SELECT));

    let mid = fixtures::session(0x0001_3500, vec![]);
    assert!(mid.capabilities().has(Capabilities::B_SELECT));
    assert!(!mid.capabilities().has(Capabilities::SLOT_ANTICOLL));
}
