// Manual tests against a real SpringCard reader on USB. Run with
// `cargo test --features usb -- --ignored` with a reader attached.

use serial_test::serial;
use sprox::finder::Protocols;
use sprox::reader::Reader;
use sprox::transport::usb::UsbTransport;

fn open_session() -> Option<sprox::reader::ReaderSession> {
    let transport = UsbTransport::open().ok()?;
    Reader::new_with_transport(Box::new(transport)).open().ok()
}

#[test]
#[serial]
#[ignore = "requires hardware (SpringCard reader)"]
fn open_and_report_firmware() {
    let Some(session) = open_session() else {
        return;
    };
    assert!(session.version().as_u32() > 0);
    println!(
        "firmware {} capabilities {:?}",
        session.version(),
        session.capabilities()
    );
}

#[test]
#[serial]
#[ignore = "requires hardware (SpringCard reader) and a card on the antenna"]
fn find_any_card() {
    let Some(mut session) = open_session() else {
        return;
    };
    let tag = session.find_wait(Protocols::ANY, 200, 10_000).unwrap();
    println!("{:?} uid {}", tag.protocol, sprox::utils::bytes_to_hex(&tag.uid));
}
